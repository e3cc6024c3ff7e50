//! Parametrisation tables: externally supplied `(instance, parameter, value)`
//! rows, several instances per file.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::Serialize;

use crate::csv::CsvTable;
use crate::errors::CoreError;

pub const INSTANCE_COLUMN: &str = "idModelInstance";
pub const PARAMETER_COLUMN: &str = "Parameter";
pub const VALUE_COLUMN: &str = "Value";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParameterRow {
    /// 1-based line in the source file.
    pub line: usize,
    pub instance: String,
    /// Parameter name with incidental whitespace trimmed.
    pub parameter: String,
    /// Raw value text; parsed on application.
    pub value: String,
}

impl ParameterRow {
    /// Numeric value of the row.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Csv` when the value is not a finite number.
    pub fn numeric_value(&self) -> Result<f64, CoreError> {
        self.value
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| CoreError::Csv {
                line: self.line,
                message: format!(
                    "value '{}' of parameter '{}' is not a number",
                    self.value, self.parameter
                ),
            })
    }
}

/// The rows of one model instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParameterSet {
    pub instance: String,
    pub rows: Vec<ParameterRow>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParametrisationTable {
    pub source: Option<PathBuf>,
    pub rows: Vec<ParameterRow>,
}

impl ParametrisationTable {
    /// Parse a parametrisation CSV. Columns other than instance, parameter and
    /// value are ignored.
    ///
    /// # Errors
    ///
    /// Returns a `CoreError` for malformed CSV or a missing required column.
    pub fn from_csv(content: &str) -> Result<Self, CoreError> {
        let table = CsvTable::parse(content)?;
        let instance_col = table.require_column(INSTANCE_COLUMN)?;
        let parameter_col = table.require_column(PARAMETER_COLUMN)?;
        let value_col = table
            .column(VALUE_COLUMN)
            .or_else(|| table.column("value"))
            .ok_or_else(|| CoreError::MissingColumn(VALUE_COLUMN.to_string()))?;

        let rows = table
            .records
            .iter()
            .map(|record| ParameterRow {
                line: record.line,
                instance: record.get(instance_col).trim().to_string(),
                parameter: record.get(parameter_col).trim().to_string(),
                value: record.get(value_col).trim().to_string(),
            })
            .collect();

        Ok(Self { source: None, rows })
    }

    /// Read and parse a parametrisation file.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Csv` (line 0) if the file cannot be read, otherwise
    /// the errors of [`ParametrisationTable::from_csv`].
    pub fn read(path: &Path) -> Result<Self, CoreError> {
        let content = std::fs::read_to_string(path).map_err(|error| CoreError::Csv {
            line: 0,
            message: format!("failed to read {}: {error}", path.display()),
        })?;
        let mut table = Self::from_csv(&content)?;
        table.source = Some(path.to_path_buf());
        Ok(table)
    }

    /// Rows partitioned by instance identifier.
    ///
    /// Stable: instances appear in first-appearance order and rows keep file order.
    #[must_use]
    pub fn instances(&self) -> Vec<ParameterSet> {
        let mut grouped: IndexMap<&str, Vec<ParameterRow>> = IndexMap::new();
        for row in &self.rows {
            grouped
                .entry(row.instance.as_str())
                .or_default()
                .push(row.clone());
        }
        grouped
            .into_iter()
            .map(|(instance, rows)| ParameterSet {
                instance: instance.to_string(),
                rows,
            })
            .collect()
    }

    /// The rows of one instance, or `None` if the file does not mention it.
    #[must_use]
    pub fn instance(&self, instance: &str) -> Option<ParameterSet> {
        let rows = self
            .rows
            .iter()
            .filter(|row| row.instance == instance)
            .cloned()
            .collect::<Vec<_>>();
        (!rows.is_empty()).then(|| ParameterSet {
            instance: instance.to_string(),
            rows,
        })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    const CSV: &str = "idModelInstance,Parameter,Value,Unit\n\
                       Human_A,BW,70,kg\n\
                       Human_B, QCC ,16.5,L/h\n\
                       Human_A,ka,1.2,1/h\n\
                       Human_B,BW,60,kg\n";

    #[test]
    fn groups_instances_in_first_appearance_order() {
        let table = ParametrisationTable::from_csv(CSV).unwrap();
        let sets = table.instances();
        assert_eq!(
            sets.iter().map(|s| s.instance.as_str()).collect::<Vec<_>>(),
            vec!["Human_A", "Human_B"]
        );
        assert_eq!(
            sets[0].rows.iter().map(|r| r.parameter.as_str()).collect::<Vec<_>>(),
            vec!["BW", "ka"]
        );
        assert_eq!(sets[1].rows[0].parameter, "QCC");
        assert_eq!(sets[1].rows[0].line, 3);
    }

    #[test]
    fn instance_lookup_filters_rows() {
        let table = ParametrisationTable::from_csv(CSV).unwrap();
        let set = table.instance("Human_B").unwrap();
        assert_eq!(set.rows.len(), 2);
        assert!(table.instance("Rat").is_none());
    }

    #[test]
    fn numeric_values_are_checked() {
        let table =
            ParametrisationTable::from_csv("idModelInstance,Parameter,Value\nA,BW,heavy\n").unwrap();
        assert!(table.rows[0].numeric_value().is_err());
    }

    #[test]
    fn required_columns_are_enforced() {
        assert!(matches!(
            ParametrisationTable::from_csv("Parameter,Value\nBW,70\n"),
            Err(CoreError::MissingColumn(column)) if column == INSTANCE_COLUMN
        ));
    }
}
