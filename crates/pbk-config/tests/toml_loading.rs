//! Integration tests for TOML configuration loading.
//!
//! Uses figment::Jail for sandboxed working directories and env vars.

use std::path::Path;

use figment::Jail;
use pbk_config::{ConfigError, PbkConfig};
use pretty_assertions::assert_eq;

#[test]
fn loads_project_file_from_root() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "pbk.toml",
            r#"
[paths]
model_dir = "models"
citation_file = "meta/CITATION.cff"

[pipeline]
source_extension = "txt"

[scenario]
frequency = 48
input_species = "QGut"
daily_intake = 0.5
"#,
        )?;

        let config = PbkConfig::load_from(Path::new(".")).expect("config loads");
        assert_eq!(config.paths.model_dir, "models");
        assert_eq!(config.paths.citation_file, "meta/CITATION.cff");
        assert_eq!(config.paths.parametrisation_dir, "parametrisations");
        assert_eq!(config.pipeline.source_glob(), "*.txt");
        assert_eq!(config.scenario.frequency, 48);
        assert_eq!(config.scenario.input_species, "QGut");
        assert_eq!(config.scenario.covariate, "BW");
        assert!((config.scenario.daily_intake - 0.5).abs() < f64::EPSILON);
        Ok(())
    });
}

#[test]
fn missing_project_file_yields_defaults() {
    Jail::expect_with(|_jail| {
        let config = PbkConfig::load_from(Path::new(".")).expect("config loads");
        assert_eq!(config, PbkConfig::default());
        Ok(())
    });
}

#[test]
fn invalid_values_in_file_are_rejected() {
    Jail::expect_with(|jail| {
        jail.create_file("pbk.toml", "[scenario]\nwashout_divisor = 0\n")?;

        let result = PbkConfig::load_from(Path::new("."));
        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue { field, .. }) if field == "scenario.washout_divisor"
        ));
        Ok(())
    });
}

#[test]
fn malformed_toml_is_a_figment_error() {
    Jail::expect_with(|jail| {
        jail.create_file("pbk.toml", "[scenario\nfrequency = 1\n")?;

        let result = PbkConfig::load_from(Path::new("."));
        assert!(matches!(result, Err(ConfigError::Figment(_))));
        Ok(())
    });
}
