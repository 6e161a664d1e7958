//! Per-file results and the batch summary.
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::common::error::{Error, ErrorKind};

/// Why a file failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub kind: ErrorKind,
    pub message: String,
}

impl From<&Error> for ErrorDetail {
    fn from(err: &Error) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

/// Outcome of processing one input path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessingResult {
    pub path: PathBuf,
    pub success: bool,
    pub message: String,
    /// Occurrences replaced, one entry per rule in rule order
    pub counts: Vec<usize>,
    pub replacements: usize,
    pub error: Option<ErrorDetail>,
    pub backup_path: Option<PathBuf>,
    pub elapsed_ms: u64,
}

impl ProcessingResult {
    pub fn success(path: &Path, counts: Vec<usize>, backup_path: Option<PathBuf>, elapsed: Duration) -> Self {
        let replacements = counts.iter().sum();
        Self {
            path: path.to_path_buf(),
            success: true,
            message: format!("{} replacement(s)", replacements),
            counts,
            replacements,
            error: None,
            backup_path,
            elapsed_ms: elapsed.as_millis() as u64,
        }
    }

    pub fn failure(path: &Path, err: &Error, backup_path: Option<PathBuf>, elapsed: Duration) -> Self {
        Self {
            path: path.to_path_buf(),
            success: false,
            message: err.to_string(),
            counts: Vec::new(),
            replacements: 0,
            error: Some(ErrorDetail::from(err)),
            backup_path,
            elapsed_ms: elapsed.as_millis() as u64,
        }
    }

    #[inline]
    pub fn error_kind(&self) -> Option<ErrorKind> {
        self.error.as_ref().map(|e| e.kind)
    }
}

/// Every result of a batch, one per input path, in completion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub total: usize,
    pub success: usize,
    pub failure: usize,
    /// Set when the batch was cancelled before every file was started
    pub cancelled: bool,
    pub results: Vec<ProcessingResult>,
}

impl BatchSummary {
    pub fn from_results(results: Vec<ProcessingResult>, cancelled: bool) -> Self {
        let success = results.iter().filter(|r| r.success).count();
        Self {
            total: results.len(),
            success,
            failure: results.len() - success,
            cancelled,
            results,
        }
    }

    pub fn total_replacements(&self) -> usize {
        self.results.iter().map(|r| r.replacements).sum()
    }

    /// Fraction of files that succeeded; 0 for an empty batch.
    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.success as f64 / self.total as f64
        }
    }

    pub fn succeeded(&self) -> impl Iterator<Item = &ProcessingResult> {
        self.results.iter().filter(|r| r.success)
    }

    pub fn failed(&self) -> impl Iterator<Item = &ProcessingResult> {
        self.results.iter().filter(|r| !r.success)
    }

    /// Result for `path`, if it was part of the batch.
    pub fn result_for(&self, path: &Path) -> Option<&ProcessingResult> {
        self.results.iter().find(|r| r.path == path)
    }

    #[inline]
    pub fn all_succeeded(&self) -> bool {
        self.failure == 0
    }
}
