//! Minimal CSV reader and writer for annotation tables, parametrisation files
//! and scenario outputs.
//!
//! Supports a header row, double-quoted fields (with `""` escapes and embedded
//! commas or newlines) and both `\n` and `\r\n` record separators.

use crate::errors::CoreError;

/// One data record and the 1-based line it starts on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvRecord {
    pub line: usize,
    pub fields: Vec<String>,
}

impl CsvRecord {
    /// Field at `index`, or the empty string for short rows.
    #[must_use]
    pub fn get(&self, index: usize) -> &str {
        self.fields.get(index).map_or("", String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvTable {
    pub headers: Vec<String>,
    pub records: Vec<CsvRecord>,
}

impl CsvTable {
    /// Parse CSV content. The first record is the header.
    ///
    /// Blank lines are skipped. Rows with more fields than the header are rejected.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Csv` for an empty document, an unterminated quote or
    /// a row wider than the header.
    pub fn parse(content: &str) -> Result<Self, CoreError> {
        let mut records = split_records(content)?.into_iter();
        let header = records.next().ok_or(CoreError::Csv {
            line: 1,
            message: "empty CSV document".to_string(),
        })?;
        let headers = header
            .fields
            .into_iter()
            .map(|h| h.trim().trim_start_matches('\u{feff}').to_string())
            .collect::<Vec<_>>();

        let mut rows = Vec::new();
        for record in records {
            if record.fields.len() > headers.len() {
                return Err(CoreError::Csv {
                    line: record.line,
                    message: format!(
                        "row has {} fields, header has {}",
                        record.fields.len(),
                        headers.len()
                    ),
                });
            }
            rows.push(record);
        }

        Ok(Self {
            headers,
            records: rows,
        })
    }

    #[must_use]
    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Index of a column that must be present.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::MissingColumn` when the header lacks `name`.
    pub fn require_column(&self, name: &str) -> Result<usize, CoreError> {
        self.column(name)
            .ok_or_else(|| CoreError::MissingColumn(name.to_string()))
    }
}

fn split_records(content: &str) -> Result<Vec<CsvRecord>, CoreError> {
    let mut records = Vec::new();
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut line = 1usize;
    let mut record_line = 1usize;
    let mut chars = content.chars().peekable();

    while let Some(ch) = chars.next() {
        if in_quotes {
            match ch {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => in_quotes = false,
                '\n' => {
                    line += 1;
                    field.push('\n');
                }
                other => field.push(other),
            }
            continue;
        }

        match ch {
            '"' => in_quotes = true,
            ',' => fields.push(std::mem::take(&mut field)),
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' => {
                fields.push(std::mem::take(&mut field));
                push_record(&mut records, std::mem::take(&mut fields), record_line);
                line += 1;
                record_line = line;
            }
            other => field.push(other),
        }
    }

    if in_quotes {
        return Err(CoreError::Csv {
            line: record_line,
            message: "unterminated quoted field".to_string(),
        });
    }
    if !field.is_empty() || !fields.is_empty() {
        fields.push(field);
        push_record(&mut records, fields, record_line);
    }
    Ok(records)
}

fn push_record(records: &mut Vec<CsvRecord>, fields: Vec<String>, line: usize) {
    let blank = fields.iter().all(|f| f.trim().is_empty());
    if !blank {
        records.push(CsvRecord { line, fields });
    }
}

/// Append one CSV record (with trailing newline) to `out`.
pub fn write_record<S: AsRef<str>>(out: &mut String, fields: &[S]) {
    for (index, field) in fields.iter().enumerate() {
        if index > 0 {
            out.push(',');
        }
        let field = field.as_ref();
        if field.contains([',', '"', '\n', '\r']) {
            out.push('"');
            out.push_str(&field.replace('"', "\"\""));
            out.push('"');
        } else {
            out.push_str(field);
        }
    }
    out.push('\n');
}
