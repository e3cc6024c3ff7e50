//! Locations of the model artifacts, citation record, parametrisations and
//! scenario outputs, relative to the project root unless absolute.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

fn default_model_dir() -> String {
    "model".to_string()
}

fn default_citation_file() -> String {
    "CITATION.cff".to_string()
}

fn default_parametrisation_dir() -> String {
    "parametrisations".to_string()
}

fn default_output_dir() -> String {
    "tests/__testoutputs__".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PathsConfig {
    /// Directory scanned for source models.
    #[serde(default = "default_model_dir")]
    pub model_dir: String,

    /// Human-maintained citation record attached to every annotated model.
    #[serde(default = "default_citation_file")]
    pub citation_file: String,

    /// Directory holding parametrisation CSV files.
    #[serde(default = "default_parametrisation_dir")]
    pub parametrisation_dir: String,

    /// Directory receiving scenario CSV and chart outputs.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            model_dir: default_model_dir(),
            citation_file: default_citation_file(),
            parametrisation_dir: default_parametrisation_dir(),
            output_dir: default_output_dir(),
        }
    }
}

impl PathsConfig {
    #[must_use]
    pub fn model_dir(&self, root: &Path) -> PathBuf {
        resolve(root, &self.model_dir)
    }

    #[must_use]
    pub fn citation_file(&self, root: &Path) -> PathBuf {
        resolve(root, &self.citation_file)
    }

    #[must_use]
    pub fn parametrisation_dir(&self, root: &Path) -> PathBuf {
        resolve(root, &self.parametrisation_dir)
    }

    #[must_use]
    pub fn output_dir(&self, root: &Path) -> PathBuf {
        resolve(root, &self.output_dir)
    }
}

fn resolve(root: &Path, value: &str) -> PathBuf {
    let path = Path::new(value);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}
