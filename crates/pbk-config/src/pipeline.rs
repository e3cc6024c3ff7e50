//! Model lifecycle pipeline configuration.

use serde::{Deserialize, Serialize};

fn default_source_extension() -> String {
    "ant".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PipelineConfig {
    /// File extension (without the dot) identifying source models.
    #[serde(default = "default_source_extension")]
    pub source_extension: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            source_extension: default_source_extension(),
        }
    }
}

impl PipelineConfig {
    /// Glob matching source model file names, e.g. `*.ant`.
    #[must_use]
    pub fn source_glob(&self) -> String {
        format!("*.{}", self.source_extension.trim_start_matches('.'))
    }
}
