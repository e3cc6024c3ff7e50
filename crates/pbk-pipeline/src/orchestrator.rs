//! Pipeline Orchestrator: discover source models and drive
//! compile → annotate → validate for each one.
//!
//! Stages are fault-isolated. A failed annotation still lets validation run
//! against whatever document is on disk, and a failed model never stops the
//! next one. A model that does not compile has nothing to annotate or
//! validate, so both later stages are recorded as skipped.

use std::path::{Path, PathBuf};

use globset::Glob;
use serde::Serialize;
use tracing::{error, info};

use crate::collaborators::{Collaborators, SourceModel};
use crate::error::PipelineError;
use crate::naming::ArtifactNames;
use crate::stages::{self, StageContext, StageStatus};
use crate::store::{ArtifactStore, DocumentCodec, FsArtifactStore, JsonDocumentCodec};

/// Everything the run produced for one model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelOutcome {
    pub model: String,
    pub source: PathBuf,
    pub artifacts: ArtifactNames,
    pub compilation: StageStatus,
    pub annotation: StageStatus,
    pub validation: StageStatus,
    pub table_created: bool,
    pub terms_applied: usize,
    pub rows_rejected: usize,
    pub errors: usize,
    pub warnings: usize,
}

impl ModelOutcome {
    fn new(source: &Path) -> Self {
        let artifacts = ArtifactNames::from_base(source);
        Self {
            model: artifacts.model.clone(),
            source: source.to_path_buf(),
            artifacts,
            compilation: StageStatus::Skipped,
            annotation: StageStatus::Skipped,
            validation: StageStatus::Skipped,
            table_created: false,
            terms_applied: 0,
            rows_rejected: 0,
            errors: 0,
            warnings: 0,
        }
    }

    /// Every stage ran and none failed.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.compilation.is_success()
            && self.annotation.is_success()
            && self.validation.is_success()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PipelineReport {
    pub models: Vec<ModelOutcome>,
}

impl PipelineReport {
    #[must_use]
    pub fn succeeded(&self) -> usize {
        self.models.iter().filter(|m| m.is_success()).count()
    }

    #[must_use]
    pub fn failed(&self) -> usize {
        self.models.len() - self.succeeded()
    }

    #[must_use]
    pub fn outcome(&self, model: &str) -> Option<&ModelOutcome> {
        self.models.iter().find(|m| m.model == model)
    }
}

pub struct Pipeline {
    collaborators: Collaborators,
    store: Box<dyn ArtifactStore>,
    codec: Box<dyn DocumentCodec>,
    citation_file: PathBuf,
}

impl Pipeline {
    /// Pipeline with the built-in collaborators, filesystem store and JSON codec.
    #[must_use]
    pub fn new(citation_file: impl Into<PathBuf>) -> Self {
        Self {
            collaborators: Collaborators::default(),
            store: Box::new(FsArtifactStore),
            codec: Box::new(JsonDocumentCodec),
            citation_file: citation_file.into(),
        }
    }

    #[must_use]
    pub fn with_collaborators(mut self, collaborators: Collaborators) -> Self {
        self.collaborators = collaborators;
        self
    }

    #[must_use]
    pub fn with_store(mut self, store: Box<dyn ArtifactStore>) -> Self {
        self.store = store;
        self
    }

    #[must_use]
    pub fn with_codec(mut self, codec: Box<dyn DocumentCodec>) -> Self {
        self.codec = codec;
        self
    }

    /// Source files in `model_dir` with the given extension, sorted by path.
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::ModelDirMissing` if the directory does not
    /// exist, or the I/O error from listing it.
    pub fn discover(model_dir: &Path, extension: &str) -> Result<Vec<PathBuf>, PipelineError> {
        if !model_dir.is_dir() {
            return Err(PipelineError::ModelDirMissing(model_dir.to_path_buf()));
        }
        let pattern = format!("*.{}", extension.trim_start_matches('.'));
        let matcher = Glob::new(&pattern)?.compile_matcher();

        let mut sources = Vec::new();
        for entry in std::fs::read_dir(model_dir)? {
            let path = entry?.path();
            if path.is_file() && path.file_name().is_some_and(|name| matcher.is_match(name)) {
                sources.push(path);
            }
        }
        sources.sort();
        Ok(sources)
    }

    /// Run every source through the pipeline.
    pub fn run(&self, sources: &[PathBuf]) -> PipelineReport {
        self.run_with(sources, |_| {})
    }

    /// Like [`Pipeline::run`], reporting each outcome as soon as it is known.
    pub fn run_with<F>(&self, sources: &[PathBuf], mut on_model: F) -> PipelineReport
    where
        F: FnMut(&ModelOutcome),
    {
        let mut report = PipelineReport::default();
        for source in sources {
            let outcome = self.process(source);
            on_model(&outcome);
            report.models.push(outcome);
        }
        info!(
            models = report.models.len(),
            succeeded = report.succeeded(),
            "pipeline finished"
        );
        report
    }

    /// A source sharing a path with its artifacts would be overwritten by them.
    fn check_source(source: &Path, artifacts: &ArtifactNames) -> Result<(), PipelineError> {
        if artifacts.all().contains(&source) {
            return Err(PipelineError::SourceIsArtifact(source.to_path_buf()));
        }
        Ok(())
    }

    /// Compile, annotate and validate one source model.
    pub fn process(&self, source: &Path) -> ModelOutcome {
        let mut outcome = ModelOutcome::new(source);
        let ctx = StageContext {
            collaborators: &self.collaborators,
            store: self.store.as_ref(),
            codec: self.codec.as_ref(),
            citation_file: &self.citation_file,
        };

        let compiled = Self::check_source(source, &outcome.artifacts)
            .and_then(|()| SourceModel::read(source).map_err(PipelineError::from))
            .and_then(|model| stages::compile(&ctx, &model, &outcome.artifacts));
        let document = match compiled {
            Ok(document) => document,
            Err(err) => {
                error!(model = %outcome.model, stage = "compilation", "{err}");
                outcome.compilation = StageStatus::Failed {
                    message: err.to_string(),
                };
                return outcome;
            }
        };
        outcome.compilation = StageStatus::Succeeded;

        let annotation = stages::annotate(&ctx, &document, &outcome.artifacts);
        outcome.annotation = annotation.status;
        outcome.table_created = annotation.table_created;
        outcome.terms_applied = annotation.summary.applied;
        outcome.rows_rejected = annotation.summary.rejected;

        let validation = stages::validate(&ctx, &outcome.artifacts);
        outcome.validation = validation.status;
        outcome.errors = validation.errors;
        outcome.warnings = validation.warnings;
        outcome
    }
}
