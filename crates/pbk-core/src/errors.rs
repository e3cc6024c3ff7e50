//! Cross-cutting error types for PBK tooling.
//!
//! Stage- and harness-specific errors (`SourceError`, `AnnotationError`,
//! `HarnessError`) live in their own crates and wrap `CoreError` where a
//! document, table or expression could not be read.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    /// An expression could not be tokenized or parsed.
    #[error("Invalid expression '{input}': {message}")]
    Expression { input: String, message: String },

    /// An identifier in an expression has no value in the evaluation scope.
    #[error("Unknown symbol '{0}' in expression")]
    UnknownSymbol(String),

    /// A CSV document is malformed.
    #[error("CSV error at line {line}: {message}")]
    Csv { line: usize, message: String },

    /// A CSV document lacks a required column.
    #[error("Missing required column '{0}'")]
    MissingColumn(String),

    /// Citation metadata could not be decoded.
    #[error("Invalid citation metadata: {0}")]
    Citation(#[from] serde_yaml::Error),

    /// An exchange document could not be encoded or decoded.
    #[error("Invalid exchange document: {0}")]
    Document(#[from] serde_json::Error),

    /// Entity lookup returned no result.
    #[error("Entity not found: {entity_type} {id}")]
    NotFound { entity_type: String, id: String },
}
