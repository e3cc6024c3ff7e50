use anyhow::Context;
use pbk_pipeline::{ModelOutcome, Pipeline, PipelineReport, StageStatus};
use serde::Serialize;

use crate::cli::root_commands::BuildArgs;
use crate::cli::{GlobalFlags, OutputFormat};
use crate::commands::shared::progress_total;
use crate::context::AppContext;
use crate::output::output;
use crate::progress::Progress;

/// One line of the build report in table form.
#[derive(Debug, Serialize)]
struct BuildRow<'a> {
    model: &'a str,
    compilation: &'static str,
    annotation: &'static str,
    validation: &'static str,
    table_created: bool,
    terms_applied: usize,
    errors: usize,
    warnings: usize,
    message: Option<&'a str>,
}

impl<'a> From<&'a ModelOutcome> for BuildRow<'a> {
    fn from(outcome: &'a ModelOutcome) -> Self {
        let message = [
            &outcome.compilation,
            &outcome.annotation,
            &outcome.validation,
        ]
        .into_iter()
        .find_map(|status| match status {
            StageStatus::Failed { message } => Some(message.as_str()),
            _ => None,
        });
        Self {
            model: &outcome.model,
            compilation: outcome.compilation.label(),
            annotation: outcome.annotation.label(),
            validation: outcome.validation.label(),
            table_created: outcome.table_created,
            terms_applied: outcome.terms_applied,
            errors: outcome.errors,
            warnings: outcome.warnings,
            message,
        }
    }
}

/// Handle `pbk build`.
///
/// Per-model stage failures are reported, not raised; only a failed discovery
/// makes the command fail.
pub fn handle(args: &BuildArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let model_dir = args.model_dir.clone().unwrap_or_else(|| ctx.model_dir());
    let sources = Pipeline::discover(&model_dir, &ctx.config.pipeline.source_extension)
        .with_context(|| format!("failed to discover source models in {}", model_dir.display()))?;
    if sources.is_empty() {
        tracing::warn!(dir = %model_dir.display(), "no source models found");
    }

    let pipeline = Pipeline::new(ctx.citation_file());
    let progress = Progress::bar(progress_total(sources.len()), "building models");
    let report = pipeline.run_with(&sources, |outcome| progress.advance(&outcome.model));

    if report.failed() > 0 {
        progress.finish_err(&format!("{} of {} models failed", report.failed(), report.models.len()));
    } else {
        progress.finish_clear();
    }
    for outcome in report.models.iter().filter(|outcome| !outcome.is_success()) {
        tracing::warn!(model = %outcome.model, "model did not pass every stage");
    }

    render(&report, flags.format)
}

fn render(report: &PipelineReport, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Table => {
            let rows = report.models.iter().map(BuildRow::from).collect::<Vec<_>>();
            output(&rows, format)
        }
        OutputFormat::Json | OutputFormat::Raw => output(report, format),
    }
}
