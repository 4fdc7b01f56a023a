// src/exec/boundary.rs

//! Per-file error isolation for compiler adapters.
//!
//! Every adapter call owns a fresh [`ErrorBoundary`]. Each input file is run
//! through [`ErrorBoundary::attempt`]; a failure is logged with the offending
//! path and recorded, and the adapter moves on to the next file. The
//! boundary is consumed into a [`BuildReport`] when the call ends, so no error
//! state survives into the next call.

use std::fmt;
use std::path::{Path, PathBuf};

use tracing::{debug, error};

use crate::logging::console_file_error;
use crate::types::AssetClass;

/// One input that failed to compile, copy or write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileError {
    pub path: PathBuf,
    pub message: String,
}

impl fmt::Display for FileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path.display(), self.message)
    }
}

/// Aggregated outcome of one adapter call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildReport {
    pub class: AssetClass,
    /// Number of inputs processed successfully.
    pub compiled: usize,
    pub errors: Vec<FileError>,
}

impl BuildReport {
    pub fn new(class: AssetClass) -> Self {
        Self {
            class,
            compiled: 0,
            errors: Vec::new(),
        }
    }

    /// Report for a call that could not run at all (e.g. its blocking job
    /// panicked).
    pub fn failed(class: AssetClass, path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self {
            class,
            compiled: 0,
            errors: vec![FileError {
                path: path.into(),
                message: message.into(),
            }],
        }
    }

    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

#[derive(Debug)]
pub struct ErrorBoundary {
    report: BuildReport,
}

impl ErrorBoundary {
    pub fn new(class: AssetClass) -> Self {
        Self {
            report: BuildReport::new(class),
        }
    }

    /// Run one file's transformation, containing any error it returns.
    pub fn attempt<F>(&mut self, path: &Path, f: F)
    where
        F: FnOnce() -> anyhow::Result<()>,
    {
        match f() {
            Ok(()) => {
                debug!(class = %self.report.class, path = ?path, "processed");
                self.report.compiled += 1;
            }
            Err(err) => self.record(path, &err),
        }
    }

    /// Record a failure that did not come from [`attempt`](Self::attempt).
    pub fn record(&mut self, path: &Path, err: &anyhow::Error) {
        // `{:#}` keeps the whole context chain on one line.
        let message = format!("{err:#}");
        error!(
            class = %self.report.class,
            path = %path.display(),
            error = %message,
            "compile error"
        );
        console_file_error(self.report.class, path, &message);
        self.report.errors.push(FileError {
            path: path.to_path_buf(),
            message,
        });
    }

    pub fn finish(self) -> BuildReport {
        self.report
    }
}
