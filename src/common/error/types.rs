//! Unified error types for docsplice.
//!
//! Every failure the library can report maps onto one variant of [`Error`].
//! The variants follow the taxonomy used for per-file reporting in a batch:
//! validation, backup, structural, and I/O failures are all isolated to the
//! document that produced them.
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for docsplice operations.
#[derive(Error, Debug)]
pub enum Error {
    /// The input file does not exist
    #[error("File not found: {0}")]
    NotFound(String),

    /// Input rejected before any processing (extension, size, structure, rule shape)
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The container or its XML could not be parsed
    #[error("Invalid format: {0}")]
    Format(String),

    /// Malformed or excessively deep document structure
    #[error("Structural error: {0}")]
    Structural(String),

    /// Backup could not be written or finalized
    #[error("Backup failed: {0}")]
    Backup(String),

    /// Every backup name tried was already taken
    #[error("Backup name still collided after {attempts} attempts in {dir}")]
    BackupCollision { dir: String, attempts: usize },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A session operation was called in the wrong lifecycle state
    #[error("Invalid session state: {0}")]
    State(String),

    /// The batch was cancelled before this file was started
    #[error("Processing cancelled")]
    Cancelled,

    /// Invalid options, rules file, or environment override
    #[error("Configuration error: {0}")]
    Config(String),

    /// A worker failed unexpectedly
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Stable classification of an [`Error`], used in results and JSON output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NotFound,
    Validation,
    Format,
    Structural,
    Backup,
    Io,
    State,
    Cancelled,
    Config,
    Internal,
}

impl Error {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::NotFound(_) => ErrorKind::NotFound,
            Error::Validation(_) => ErrorKind::Validation,
            Error::Format(_) => ErrorKind::Format,
            Error::Structural(_) => ErrorKind::Structural,
            Error::Backup(_) | Error::BackupCollision { .. } => ErrorKind::Backup,
            Error::Io(_) => ErrorKind::Io,
            Error::State(_) => ErrorKind::State,
            Error::Cancelled => ErrorKind::Cancelled,
            Error::Config(_) => ErrorKind::Config,
            Error::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Wrap an IO error that happened while writing a backup.
    pub(crate) fn backup_io(context: &str, err: std::io::Error) -> Self {
        Error::Backup(format!("{}: {}", context, err))
    }
}

/// Result type for docsplice operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_groups_backup_variants() {
        assert_eq!(Error::Backup("x".into()).kind(), ErrorKind::Backup);
        let collision = Error::BackupCollision {
            dir: "/tmp".into(),
            attempts: 50,
        };
        assert_eq!(collision.kind(), ErrorKind::Backup);
        assert!(collision.to_string().contains("50 attempts"));
    }

    #[test]
    fn test_io_conversion() {
        let err: Error = std::io::Error::other("disk full").into();
        assert_eq!(err.kind(), ErrorKind::Io);
        assert_eq!(err.to_string(), "IO error: disk full");
    }
}
