//! # pbk-config
//!
//! Layered configuration loading for PBK model tooling using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`PBK_*` prefix, `__` as separator)
//! 2. Project-level `pbk.toml`
//! 3. User-level `~/.config/pbk/config.toml`
//! 4. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `PBK_PATHS__MODEL_DIR` -> `paths.model_dir`,
//! `PBK_SCENARIO__FREQUENCY` -> `scenario.frequency`, etc.
//!
//! # Usage
//!
//! ```no_run
//! use std::path::Path;
//! use pbk_config::PbkConfig;
//!
//! let config = PbkConfig::load_with_dotenv(Path::new(".")).expect("config");
//! println!("models in {}", config.paths.model_dir(Path::new(".")).display());
//! ```

mod error;
mod paths;
mod pipeline;
mod scenario;

pub use error::ConfigError;
pub use paths::PathsConfig;
pub use pipeline::PipelineConfig;
pub use scenario::ScenarioConfig;

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

/// File name of the project-level configuration.
pub const PROJECT_CONFIG_FILE: &str = "pbk.toml";

/// Extension of the compiled exchange document, reserved for pipeline output.
pub const DOCUMENT_EXTENSION: &str = "sbml";

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct PbkConfig {
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub scenario: ScenarioConfig,
}

impl PbkConfig {
    /// Load configuration for the project rooted at `root`.
    ///
    /// Does NOT call `dotenvy` -- use [`PbkConfig::load_with_dotenv`] for `.env` support.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Figment` when a source cannot be parsed or
    /// `ConfigError::InvalidValue` when [`PbkConfig::validate`] rejects the result.
    pub fn load_from(root: &Path) -> Result<Self, ConfigError> {
        let config: Self = Self::figment_for(root).extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Load `root/.env` (falling back to the current directory) and then the
    /// layered configuration.
    ///
    /// # Errors
    ///
    /// Same as [`PbkConfig::load_from`].
    pub fn load_with_dotenv(root: &Path) -> Result<Self, ConfigError> {
        let env_path = root.join(".env");
        if env_path.exists() {
            let _ = dotenvy::from_path(&env_path);
        } else {
            let _ = dotenvy::dotenv();
        }
        Self::load_from(root)
    }

    /// Build the figment provider chain for a project root.
    ///
    /// Public so tests can layer additional providers on top.
    #[must_use]
    pub fn figment_for(root: &Path) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            figment = figment.merge(Toml::file(global_path));
        }

        let local_path = root.join(PROJECT_CONFIG_FILE);
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        figment.merge(Env::prefixed("PBK_").split("__"))
    }

    /// Reject values no run could work with.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let extension = self.pipeline.source_extension.trim_start_matches('.');
        if extension.is_empty() {
            return Err(invalid("pipeline.source_extension", "must not be empty"));
        }
        if extension.eq_ignore_ascii_case(DOCUMENT_EXTENSION) {
            return Err(invalid(
                "pipeline.source_extension",
                "collides with the exchange document extension",
            ));
        }
        if self.scenario.frequency == 0 {
            return Err(invalid("scenario.frequency", "must be at least 1"));
        }
        if self.scenario.washout_divisor == 0 {
            return Err(invalid("scenario.washout_divisor", "must be at least 1"));
        }
        if !self.scenario.daily_intake.is_finite() || self.scenario.daily_intake < 0.0 {
            return Err(invalid(
                "scenario.daily_intake",
                "must be a finite, non-negative number",
            ));
        }
        Ok(())
    }

    /// Path to the user-global config file.
    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("pbk").join("config.toml"))
    }
}

fn invalid(field: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = PbkConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.pipeline.source_glob(), "*.ant");
        assert_eq!(config.scenario.frequency, 24);
        assert_eq!(config.scenario.input_species, "AGut");
        assert_eq!(config.paths.citation_file, "CITATION.cff");
    }

    #[test]
    fn zero_frequency_is_rejected() {
        let mut config = PbkConfig::default();
        config.scenario.frequency = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { field, .. }) if field == "scenario.frequency"
        ));
    }

    #[test]
    fn document_extension_cannot_name_sources() {
        let mut config = PbkConfig::default();
        config.pipeline.source_extension = ".SBML".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { field, .. }) if field == "pipeline.source_extension"
        ));
    }

    #[test]
    fn empty_extension_is_rejected() {
        let mut config = PbkConfig::default();
        config.pipeline.source_extension = ".".to_string();
        assert!(config.validate().is_err());
    }
}
