use std::path::PathBuf;

use pbk_core::CoreError;
use thiserror::Error;

/// A mismatch between the intended experiment and what the model can do.
/// Always raised, never skipped.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error(
        "parameter '{parameter}' of instance '{instance}' is not an assignable parameter of the model"
    )]
    UnknownParameter { instance: String, parameter: String },

    #[error("instance '{instance}' not found in {}", file.display())]
    MissingInstance { instance: String, file: PathBuf },

    #[error("value '{value}' of parameter '{parameter}' (instance '{instance}') is not a number")]
    InvalidValue {
        instance: String,
        parameter: String,
        value: String,
    },

    #[error("'{0}' is not a declared quantity of the model")]
    UnknownQuantity(String),

    #[error("'{0}' is not a species of the model")]
    NotASpecies(String),

    #[error("event target '{target}' is {reason}")]
    FixedTarget {
        target: String,
        reason: &'static str,
    },

    #[error("event '{0}' is already installed")]
    DuplicateEvent(String),

    #[error("{context} uses undeclared identifier '{symbol}'")]
    UndeclaredSymbol { context: String, symbol: String },

    #[error("selection '{0}' is neither time nor a model quantity")]
    UnknownSelection(String),

    #[error("invalid schedule: {0}")]
    InvalidSchedule(String),
}

#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("simulation diverged at t={time}: {message}")]
    Simulation { time: f64, message: String },
}
