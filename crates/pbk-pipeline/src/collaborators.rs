//! Contracts of the external tools the pipeline sequences.
//!
//! The pipeline never looks inside these: it hands each one its inputs,
//! persists what comes back and logs the outcome.

use std::path::{Path, PathBuf};

use pbk_core::{AnnotationTable, Citation, ExchangeDocument, ValidationReport};
use serde::Serialize;

use crate::builtin::{
    ConventionValidator, EntityTemplateGenerator, OntologyAnnotator, ReactionNetworkCompiler,
};
use crate::error::{AnnotationError, SourceError};
use crate::logger::StageLogger;

/// A human-authored reaction-network description. Never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceModel {
    /// Base filename stem.
    pub name: String,
    pub path: PathBuf,
    pub text: String,
}

impl SourceModel {
    #[must_use]
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            text: text.into(),
        }
    }

    /// Read a source file; its stem becomes the model name.
    ///
    /// # Errors
    ///
    /// Returns `SourceError::Read` if the file cannot be read.
    pub fn read(path: &Path) -> Result<Self, SourceError> {
        let text = std::fs::read_to_string(path).map_err(|source| SourceError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self::new(name, path, text))
    }
}

/// What the annotator did with the table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AnnotationSummary {
    /// Ontology terms attached to entities.
    pub applied: usize,
    /// Rows still carrying no resource.
    pub blank: usize,
    /// Rows naming unknown entities or unparsable qualifiers.
    pub rejected: usize,
}

pub trait ModelCompiler {
    /// # Errors
    ///
    /// Returns a `SourceError` when the description is malformed.
    fn compile(&self, source: &SourceModel) -> Result<ExchangeDocument, SourceError>;
}

pub trait TemplateGenerator {
    fn generate(&self, document: &ExchangeDocument) -> AnnotationTable;
}

pub trait ModelAnnotator {
    /// Merge table terms and citation metadata into `document`.
    ///
    /// # Errors
    ///
    /// Returns an `AnnotationError` when the inputs cannot be applied at all.
    fn annotate(
        &self,
        document: &mut ExchangeDocument,
        table: &AnnotationTable,
        citation: &Citation,
        logger: &mut StageLogger,
    ) -> Result<AnnotationSummary, AnnotationError>;
}

pub trait ModelValidator {
    fn validate(&self, document: &ExchangeDocument, logger: &mut StageLogger) -> ValidationReport;
}

/// The four collaborators a pipeline run uses.
pub struct Collaborators {
    pub compiler: Box<dyn ModelCompiler>,
    pub templates: Box<dyn TemplateGenerator>,
    pub annotator: Box<dyn ModelAnnotator>,
    pub validator: Box<dyn ModelValidator>,
}

impl Default for Collaborators {
    fn default() -> Self {
        Self {
            compiler: Box::new(ReactionNetworkCompiler),
            templates: Box::new(EntityTemplateGenerator),
            annotator: Box::new(OntologyAnnotator),
            validator: Box::new(ConventionValidator),
        }
    }
}
