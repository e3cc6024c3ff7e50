//! Stage Logger: one isolated, truncate-on-open log per (model, stage).
//!
//! Lines have the form `[LEVEL] - message`. The file is flushed by
//! [`StageLogger::finish`] and, on any other exit path, by `Drop`.

use std::fmt;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use pbk_core::Severity;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Annotation,
    Validation,
}

impl Stage {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Annotation => "annotation",
            Self::Validation => "validation",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl LogLevel {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
        }
    }

    const fn index(self) -> usize {
        self as usize
    }
}

impl From<Severity> for LogLevel {
    fn from(severity: Severity) -> Self {
        match severity {
            Severity::Info => Self::Info,
            Severity::Warning => Self::Warning,
            Severity::Error => Self::Error,
        }
    }
}

pub struct StageLogger {
    model: String,
    stage: Stage,
    path: PathBuf,
    writer: Option<BufWriter<File>>,
    counts: [usize; 4],
    write_error: Option<io::Error>,
}

impl StageLogger {
    /// Open (truncating) the log at `path`.
    ///
    /// # Errors
    ///
    /// Returns the I/O error if the file cannot be created.
    pub fn create(path: &Path, model: &str, stage: Stage) -> io::Result<Self> {
        let file = File::create(path)?;
        Ok(Self {
            model: model.to_string(),
            stage,
            path: path.to_path_buf(),
            writer: Some(BufWriter::new(file)),
            counts: [0; 4],
            write_error: None,
        })
    }

    pub fn log(&mut self, level: LogLevel, message: impl AsRef<str>) {
        let message = message.as_ref();
        self.counts[level.index()] += 1;
        tracing::debug!(
            model = %self.model,
            stage = self.stage.as_str(),
            level = level.as_str(),
            "{message}"
        );

        let Some(writer) = self.writer.as_mut() else {
            return;
        };
        if let Err(error) = writeln!(writer, "[{}] - {message}", level.as_str())
            && self.write_error.is_none()
        {
            self.write_error = Some(error);
        }
    }

    pub fn debug(&mut self, message: impl AsRef<str>) {
        self.log(LogLevel::Debug, message);
    }

    pub fn info(&mut self, message: impl AsRef<str>) {
        self.log(LogLevel::Info, message);
    }

    pub fn warning(&mut self, message: impl AsRef<str>) {
        self.log(LogLevel::Warning, message);
    }

    pub fn error(&mut self, message: impl AsRef<str>) {
        self.log(LogLevel::Error, message);
    }

    /// Number of lines written at `level`.
    #[must_use]
    pub const fn count(&self, level: LogLevel) -> usize {
        self.counts[level.index()]
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Flush and close the log.
    ///
    /// # Errors
    ///
    /// Returns the first write error encountered while logging, or the flush error.
    pub fn finish(mut self) -> io::Result<()> {
        if let Some(mut writer) = self.writer.take() {
            writer.flush()?;
        }
        self.write_error.take().map_or(Ok(()), Err)
    }
}

impl Drop for StageLogger {
    fn drop(&mut self) {
        if let Some(writer) = self.writer.as_mut() {
            let _ = writer.flush();
        }
    }
}

impl fmt::Debug for StageLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StageLogger")
            .field("model", &self.model)
            .field("stage", &self.stage)
            .field("path", &self.path)
            .field("counts", &self.counts)
            .finish_non_exhaustive()
    }
}
