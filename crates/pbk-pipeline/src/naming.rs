//! Artifact Namer: the file family belonging to one model, derived from a
//! single base path by suffix substitution.

use std::path::{Path, PathBuf};

use serde::Serialize;

const DOCUMENT_SUFFIX: &str = "sbml";
const TABLE_SUFFIX: &str = "annotations.csv";
const ANNOTATION_LOG_SUFFIX: &str = "annotations.log";
const VALIDATION_LOG_SUFFIX: &str = "validation.log";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactNames {
    /// Base model identifier (file stem).
    pub model: String,
    pub document: PathBuf,
    pub annotation_table: PathBuf,
    pub annotation_log: PathBuf,
    pub validation_log: PathBuf,
}

impl ArtifactNames {
    /// Replace the last extension of `base` with each artifact suffix.
    ///
    /// `model/pbk.ant` → `model/pbk.sbml`, `model/pbk.annotations.csv`, ...
    #[must_use]
    pub fn from_base(base: &Path) -> Self {
        let model = base
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            model,
            document: base.with_extension(DOCUMENT_SUFFIX),
            annotation_table: base.with_extension(TABLE_SUFFIX),
            annotation_log: base.with_extension(ANNOTATION_LOG_SUFFIX),
            validation_log: base.with_extension(VALIDATION_LOG_SUFFIX),
        }
    }

    /// All four artifact paths in pipeline order.
    #[must_use]
    pub fn all(&self) -> [&Path; 4] {
        [
            &self.document,
            &self.annotation_table,
            &self.annotation_log,
            &self.validation_log,
        ]
    }
}
