mod project_root;

use std::path::PathBuf;

use pbk_config::PbkConfig;

pub use project_root::find_project_root;

/// Project root and resolved configuration, shared by every handler.
pub struct AppContext {
    pub project_root: PathBuf,
    pub config: PbkConfig,
}

impl AppContext {
    #[must_use]
    pub const fn new(project_root: PathBuf, config: PbkConfig) -> Self {
        Self {
            project_root,
            config,
        }
    }

    #[must_use]
    pub fn model_dir(&self) -> PathBuf {
        self.config.paths.model_dir(&self.project_root)
    }

    #[must_use]
    pub fn citation_file(&self) -> PathBuf {
        self.config.paths.citation_file(&self.project_root)
    }

    #[must_use]
    pub fn parametrisation_dir(&self) -> PathBuf {
        self.config.paths.parametrisation_dir(&self.project_root)
    }

    #[must_use]
    pub fn output_dir(&self) -> PathBuf {
        self.config.paths.output_dir(&self.project_root)
    }
}
