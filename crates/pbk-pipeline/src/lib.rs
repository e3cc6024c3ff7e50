//! # pbk-pipeline
//!
//! The model lifecycle pipeline: compile a reaction-network description into
//! an exchange document, annotate it from a human-curated table and citation
//! record, then validate it against modeling conventions.
//!
//! Every model gets its own artifact family (see [`ArtifactNames`]) and every
//! (model, stage) pair its own truncated log (see [`StageLogger`]). The
//! external tools are reached through the traits in [`collaborators`];
//! [`builtin`] holds the reference implementations.

pub mod builtin;
pub mod collaborators;
pub mod error;
pub mod logger;
pub mod naming;
pub mod orchestrator;
pub mod stages;
pub mod store;

pub use collaborators::{
    AnnotationSummary, Collaborators, ModelAnnotator, ModelCompiler, ModelValidator, SourceModel,
    TemplateGenerator,
};
pub use error::{AnnotationError, PipelineError, SourceError};
pub use logger::{LogLevel, Stage, StageLogger};
pub use naming::ArtifactNames;
pub use orchestrator::{ModelOutcome, Pipeline, PipelineReport};
pub use stages::{AnnotationOutcome, StageStatus, ValidationOutcome};
pub use store::{ArtifactStore, DocumentCodec, FsArtifactStore, JsonDocumentCodec};
