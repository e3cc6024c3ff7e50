//! The three per-model stages. Each one owns its inputs for the duration of
//! the call and releases its log before returning.

use std::path::Path;

use pbk_core::{AnnotationTable, Citation, ExchangeDocument, Severity};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::collaborators::{AnnotationSummary, Collaborators, SourceModel};
use crate::error::{AnnotationError, PipelineError};
use crate::logger::{LogLevel, Stage, StageLogger};
use crate::naming::ArtifactNames;
use crate::store::{ArtifactStore, DocumentCodec, load_document};

/// Outcome of one stage for one model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StageStatus {
    Succeeded,
    Failed { message: String },
    Skipped,
}

impl StageStatus {
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded)
    }

    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Succeeded => "succeeded",
            Self::Failed { .. } => "failed",
            Self::Skipped => "skipped",
        }
    }

    fn failed(message: impl ToString) -> Self {
        Self::Failed {
            message: message.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnnotationOutcome {
    pub status: StageStatus,
    pub table_created: bool,
    pub summary: AnnotationSummary,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationOutcome {
    pub status: StageStatus,
    pub errors: usize,
    pub warnings: usize,
}

/// Shared handles every stage needs.
pub struct StageContext<'a> {
    pub collaborators: &'a Collaborators,
    pub store: &'a dyn ArtifactStore,
    pub codec: &'a dyn DocumentCodec,
    pub citation_file: &'a Path,
}

/// Compile a source model and persist the exchange document, overwriting any
/// previous one.
///
/// # Errors
///
/// Returns `PipelineError::Source` for a malformed description, or the I/O or
/// encoding error raised while persisting.
pub fn compile(
    ctx: &StageContext<'_>,
    source: &SourceModel,
    names: &ArtifactNames,
) -> Result<ExchangeDocument, PipelineError> {
    info!(model = %source.name, stage = "compilation", "compiling {}", source.path.display());
    let document = ctx.collaborators.compiler.compile(source)?;
    ctx.store.write(&names.document, &ctx.codec.encode(&document)?)?;
    debug!(
        model = %source.name,
        compartments = document.compartments.len(),
        species = document.species.len(),
        parameters = document.parameters.len(),
        reactions = document.reactions.len(),
        "wrote {}",
        names.document.display()
    );
    Ok(document)
}

/// Ensure the annotation table exists, then annotate and persist the document.
///
/// An existing table is never rewritten. The document on disk is replaced only
/// when annotation succeeds; failures go to the annotation log.
pub fn annotate(
    ctx: &StageContext<'_>,
    document: &ExchangeDocument,
    names: &ArtifactNames,
) -> AnnotationOutcome {
    let mut logger =
        match StageLogger::create(&names.annotation_log, &names.model, Stage::Annotation) {
            Ok(logger) => logger,
            Err(error) => {
                warn!(model = %names.model, "cannot open {}: {error}", names.annotation_log.display());
                return AnnotationOutcome {
                    status: StageStatus::failed(format!("annotation log not writable: {error}")),
                    table_created: false,
                    summary: AnnotationSummary::default(),
                };
            }
        };

    let mut table_created = false;
    let result = ensure_table(ctx, document, names, &mut logger).and_then(|(table, created)| {
        table_created = created;
        let citation = read_citation(ctx, &mut logger)?;
        let mut annotated = document.clone();
        let summary =
            ctx.collaborators
                .annotator
                .annotate(&mut annotated, &table, &citation, &mut logger)?;
        ctx.store.write(&names.document, &ctx.codec.encode(&annotated)?)?;
        logger.info(format!("wrote annotated document {}", names.document.display()));
        Ok(summary)
    });

    let (status, summary) = match result {
        Ok(summary) => (StageStatus::Succeeded, summary),
        Err(error) => {
            logger.error(error.to_string());
            warn!(model = %names.model, stage = "annotation", "{error}");
            (StageStatus::failed(error), AnnotationSummary::default())
        }
    };
    let status = close(logger, status);
    AnnotationOutcome {
        status,
        table_created,
        summary,
    }
}

/// Validate the persisted document and write every diagnostic to the
/// validation log. Findings never fail the stage.
pub fn validate(ctx: &StageContext<'_>, names: &ArtifactNames) -> ValidationOutcome {
    let mut logger =
        match StageLogger::create(&names.validation_log, &names.model, Stage::Validation) {
            Ok(logger) => logger,
            Err(error) => {
                warn!(model = %names.model, "cannot open {}: {error}", names.validation_log.display());
                return ValidationOutcome {
                    status: StageStatus::failed(format!("validation log not writable: {error}")),
                    errors: 0,
                    warnings: 0,
                };
            }
        };

    let document = match load_document(ctx.store, ctx.codec, &names.document) {
        Ok(document) => document,
        Err(error) => {
            logger.error(format!("cannot load {}: {error}", names.document.display()));
            let status = close(logger, StageStatus::failed(error));
            return ValidationOutcome {
                status,
                errors: 0,
                warnings: 0,
            };
        }
    };

    let report = ctx.collaborators.validator.validate(&document, &mut logger);
    for diagnostic in &report.diagnostics {
        logger.log(LogLevel::from(diagnostic.severity), diagnostic.to_string());
    }
    let errors = report.count(Severity::Error);
    let warnings = report.count(Severity::Warning);
    logger.info(format!(
        "validation of '{}' finished: {errors} errors, {warnings} warnings",
        document.model_id
    ));
    info!(model = %names.model, stage = "validation", errors, warnings, "validated");

    ValidationOutcome {
        status: close(logger, StageStatus::Succeeded),
        errors,
        warnings,
    }
}

fn ensure_table(
    ctx: &StageContext<'_>,
    document: &ExchangeDocument,
    names: &ArtifactNames,
    logger: &mut StageLogger,
) -> Result<(AnnotationTable, bool), AnnotationError> {
    let path = &names.annotation_table;
    if ctx.store.exists(path) {
        logger.info(format!("using existing annotation table {}", path.display()));
        let content = ctx.store.read_to_string(path)?;
        let table = AnnotationTable::from_csv(&content).map_err(|source| AnnotationError::Table {
            path: path.clone(),
            source,
        })?;
        return Ok((table, false));
    }

    let table = ctx.collaborators.templates.generate(document);
    ctx.store.write(path, &table.to_csv())?;
    logger.info(format!(
        "created annotation template {} with {} rows",
        path.display(),
        table.len()
    ));
    Ok((table, true))
}

fn read_citation(
    ctx: &StageContext<'_>,
    logger: &mut StageLogger,
) -> Result<Citation, AnnotationError> {
    let content = ctx
        .store
        .read_to_string(ctx.citation_file)
        .map_err(|source| AnnotationError::CitationUnreadable {
            path: ctx.citation_file.to_path_buf(),
            source,
        })?;
    let citation = Citation::from_cff_str(&content)?;
    logger.debug(format!("read citation metadata from {}", ctx.citation_file.display()));
    Ok(citation)
}

/// Close the log. A log that cannot be flushed fails an otherwise successful stage.
fn close(logger: StageLogger, status: StageStatus) -> StageStatus {
    let path = logger.path().to_path_buf();
    match (logger.finish(), status) {
        (Err(error), StageStatus::Succeeded) => {
            StageStatus::failed(format!("failed to write {}: {error}", path.display()))
        }
        (_, status) => status,
    }
}
