use std::path::PathBuf;

use pbk_core::CoreError;
use thiserror::Error;

/// A malformed reaction-network description. Aborts that model's run only.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("line {line}: {message}")]
    Syntax { line: usize, message: String },

    #[error("line {line}: duplicate identifier '{id}'")]
    Duplicate { line: usize, id: String },

    #[error("line {line}: undeclared {kind} '{id}'")]
    Undeclared {
        line: usize,
        kind: &'static str,
        id: String,
    },

    #[error("failed to read source {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Missing or malformed annotation inputs. Logged to the annotation log and
/// contained; validation still runs.
#[derive(Debug, Error)]
pub enum AnnotationError {
    #[error("citation metadata not readable at {path}: {source}")]
    CitationUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("citation metadata is incomplete: missing {0}")]
    IncompleteCitation(String),

    #[error("annotation table {path} is malformed: {source}")]
    Table {
        path: PathBuf,
        #[source]
        source: CoreError,
    },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Core(#[from] CoreError),
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid source pattern: {0}")]
    Glob(#[from] globset::Error),

    #[error("model directory not found: {0}")]
    ModelDirMissing(PathBuf),

    #[error("source {0} is also one of its own artifacts")]
    SourceIsArtifact(PathBuf),

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Core(#[from] CoreError),
}
