//! Parametrization Loader and Validator.
//!
//! Both check parameter names against the model's declared constant
//! parameters. The loader fails on the first problem; the validator collects
//! every offending row, scoped per (file, instance).

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use pbk_core::{ExchangeDocument, ParameterSet, ParametrisationTable};
use serde::Serialize;
use tracing::{debug, info};

use crate::error::{ConfigurationError, HarnessError};
use crate::live::LiveModel;

/// Apply every row of `set` to the model. Nothing is applied unless every
/// row names a declared constant parameter and carries a number.
///
/// # Errors
///
/// `ConfigurationError::UnknownParameter` or `ConfigurationError::InvalidValue`
/// for the first offending row.
pub fn apply_parameter_set(model: &mut LiveModel, set: &ParameterSet) -> Result<usize, HarnessError> {
    let values = {
        let vocabulary = model.document().constant_parameter_ids();
        set.rows
            .iter()
            .map(|row| {
                if !vocabulary.contains(row.parameter.as_str()) {
                    return Err(ConfigurationError::UnknownParameter {
                        instance: set.instance.clone(),
                        parameter: row.parameter.clone(),
                    });
                }
                let value = row
                    .numeric_value()
                    .map_err(|_| ConfigurationError::InvalidValue {
                        instance: set.instance.clone(),
                        parameter: row.parameter.clone(),
                        value: row.value.clone(),
                    })?;
                Ok((row.parameter.as_str(), value))
            })
            .collect::<Result<Vec<_>, _>>()?
    };

    for (parameter, value) in &values {
        model.set_parameter(parameter, *value)?;
    }
    debug!(instance = %set.instance, parameters = values.len(), "applied parameter set");
    Ok(values.len())
}

/// Read a parametrisation file and apply the rows of one instance.
///
/// # Errors
///
/// `ConfigurationError::MissingInstance` when the file has no rows for
/// `instance`, the file's read/parse error, or the errors of
/// [`apply_parameter_set`].
pub fn load_parametrisation(
    model: &mut LiveModel,
    path: &Path,
    instance: &str,
) -> Result<usize, HarnessError> {
    let table = ParametrisationTable::read(path)?;
    let set = table
        .instance(instance)
        .ok_or_else(|| ConfigurationError::MissingInstance {
            instance: instance.to_string(),
            file: path.to_path_buf(),
        })?;
    apply_parameter_set(model, &set)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowFailure {
    pub line: usize,
    pub parameter: String,
    pub message: String,
}

/// Result of checking one instance of one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScopeCheck {
    pub file: PathBuf,
    pub instance: String,
    pub rows_checked: usize,
    pub failures: Vec<RowFailure>,
}

impl ScopeCheck {
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.failures.is_empty()
    }
}

/// A file that could not be read or parsed at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileFailure {
    pub file: PathBuf,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParametrisationReport {
    pub scopes: Vec<ScopeCheck>,
    pub unreadable: Vec<FileFailure>,
}

impl ParametrisationReport {
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.unreadable.is_empty() && self.scopes.iter().all(ScopeCheck::is_valid)
    }

    #[must_use]
    pub fn failed_scopes(&self) -> Vec<&ScopeCheck> {
        self.scopes.iter().filter(|s| !s.is_valid()).collect()
    }

    #[must_use]
    pub fn scope(&self, file_name: &str, instance: &str) -> Option<&ScopeCheck> {
        self.scopes.iter().find(|s| {
            s.instance == instance && s.file.file_name().is_some_and(|n| n == file_name)
        })
    }
}

pub struct ParametrisationValidator<'a> {
    vocabulary: BTreeSet<&'a str>,
}

impl<'a> ParametrisationValidator<'a> {
    #[must_use]
    pub fn new(document: &'a ExchangeDocument) -> Self {
        Self {
            vocabulary: document.constant_parameter_ids(),
        }
    }

    /// One scope per instance, in first-appearance order.
    #[must_use]
    pub fn check_table(&self, file: &Path, table: &ParametrisationTable) -> Vec<ScopeCheck> {
        table
            .instances()
            .into_iter()
            .map(|set| self.check_set(file, &set))
            .collect()
    }

    fn check_set(&self, file: &Path, set: &ParameterSet) -> ScopeCheck {
        let failures = set
            .rows
            .iter()
            .filter(|row| !self.vocabulary.contains(row.parameter.as_str()))
            .map(|row| RowFailure {
                line: row.line,
                parameter: row.parameter.clone(),
                message: ConfigurationError::UnknownParameter {
                    instance: set.instance.clone(),
                    parameter: row.parameter.clone(),
                }
                .to_string(),
            })
            .collect();
        ScopeCheck {
            file: file.to_path_buf(),
            instance: set.instance.clone(),
            rows_checked: set.rows.len(),
            failures,
        }
    }

    /// Check every `*.csv` file in `dir`, sorted by path.
    ///
    /// # Errors
    ///
    /// Returns `HarnessError::Io` if the directory cannot be listed.
    /// Unreadable files are recorded in the report, not raised.
    pub fn check_dir(&self, dir: &Path) -> Result<ParametrisationReport, HarnessError> {
        let mut files = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == "csv") {
                files.push(path);
            }
        }
        files.sort();

        let mut report = ParametrisationReport::default();
        for file in files {
            match ParametrisationTable::read(&file) {
                Ok(table) => report.scopes.extend(self.check_table(&file, &table)),
                Err(error) => report.unreadable.push(FileFailure {
                    file,
                    message: error.to_string(),
                }),
            }
        }
        info!(
            dir = %dir.display(),
            scopes = report.scopes.len(),
            failed = report.failed_scopes().len(),
            "checked parametrisations"
        );
        Ok(report)
    }
}
