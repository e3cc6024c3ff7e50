//! Sampled simulation output.

use serde::Serialize;

use crate::csv::write_record;

/// Ordered time series: one column per selection, one row per sample.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SimulationResult {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<f64>>,
}

impl SimulationResult {
    #[must_use]
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Values of one selection over all samples.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<Vec<f64>> {
        let index = self.columns.iter().position(|c| c == name)?;
        Some(self.rows.iter().map(|row| row[index]).collect())
    }

    #[must_use]
    pub fn to_csv(&self) -> String {
        let mut out = String::new();
        write_record(&mut out, &self.columns);
        for row in &self.rows {
            let cells = row.iter().map(f64::to_string).collect::<Vec<_>>();
            write_record(&mut out, &cells);
        }
        out
    }
}
