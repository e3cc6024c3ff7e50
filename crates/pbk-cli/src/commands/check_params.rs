use std::path::Path;

use anyhow::{Context, bail};
use pbk_harness::{ParametrisationReport, ParametrisationValidator};
use serde::Serialize;

use crate::cli::root_commands::CheckParamsArgs;
use crate::cli::{GlobalFlags, OutputFormat};
use crate::commands::shared::read_document;
use crate::context::AppContext;
use crate::output::output;

/// One scope, or one offending row of a scope, in table form.
#[derive(Debug, Serialize)]
struct CheckRow<'a> {
    file: String,
    instance: &'a str,
    status: &'static str,
    line: Option<usize>,
    parameter: Option<&'a str>,
    message: Option<&'a str>,
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| path.display().to_string(), |name| name.to_string_lossy().into_owned())
}

fn rows(report: &ParametrisationReport) -> Vec<CheckRow<'_>> {
    let mut rows = Vec::new();
    for scope in &report.scopes {
        if scope.is_valid() {
            rows.push(CheckRow {
                file: file_name(&scope.file),
                instance: &scope.instance,
                status: "valid",
                line: None,
                parameter: None,
                message: None,
            });
        }
        for failure in &scope.failures {
            rows.push(CheckRow {
                file: file_name(&scope.file),
                instance: &scope.instance,
                status: "invalid",
                line: Some(failure.line),
                parameter: Some(&failure.parameter),
                message: Some(&failure.message),
            });
        }
    }
    for unreadable in &report.unreadable {
        rows.push(CheckRow {
            file: file_name(&unreadable.file),
            instance: "-",
            status: "unreadable",
            line: None,
            parameter: None,
            message: Some(&unreadable.message),
        });
    }
    rows
}

/// Handle `pbk check-params`.
pub fn handle(args: &CheckParamsArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let document = read_document(&args.model)?;
    let dir = args.dir.clone().unwrap_or_else(|| ctx.parametrisation_dir());
    let report = ParametrisationValidator::new(&document)
        .check_dir(&dir)
        .with_context(|| format!("failed to check parametrisations in {}", dir.display()))?;

    match flags.format {
        OutputFormat::Table => output(&rows(&report), flags.format)?,
        OutputFormat::Json | OutputFormat::Raw => output(&report, flags.format)?,
    }

    if !report.is_valid() {
        bail!(
            "{} of {} parametrisation scopes failed, {} files unreadable",
            report.failed_scopes().len(),
            report.scopes.len(),
            report.unreadable.len()
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use pbk_harness::{FileFailure, RowFailure, ScopeCheck};
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn every_scope_and_offending_row_gets_a_line() {
        let report = ParametrisationReport {
            scopes: vec![
                ScopeCheck {
                    file: PathBuf::from("parametrisations/pfoa.csv"),
                    instance: "Human".to_string(),
                    rows_checked: 2,
                    failures: Vec::new(),
                },
                ScopeCheck {
                    file: PathBuf::from("parametrisations/pfoa.csv"),
                    instance: "Rat".to_string(),
                    rows_checked: 3,
                    failures: vec![
                        RowFailure {
                            line: 5,
                            parameter: "Vmax".to_string(),
                            message: "unknown".to_string(),
                        },
                        RowFailure {
                            line: 6,
                            parameter: "Km".to_string(),
                            message: "unknown".to_string(),
                        },
                    ],
                },
            ],
            unreadable: vec![FileFailure {
                file: PathBuf::from("parametrisations/broken.csv"),
                message: "missing column".to_string(),
            }],
        };

        let summary = rows(&report)
            .iter()
            .map(|row| (row.file.clone(), row.instance, row.status, row.line))
            .collect::<Vec<_>>();
        assert_eq!(
            summary,
            vec![
                ("pfoa.csv".to_string(), "Human", "valid", None),
                ("pfoa.csv".to_string(), "Rat", "invalid", Some(5)),
                ("pfoa.csv".to_string(), "Rat", "invalid", Some(6)),
                ("broken.csv".to_string(), "-", "unreadable", None),
            ]
        );
    }
}
