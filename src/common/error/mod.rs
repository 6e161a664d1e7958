//! Unified error types for docsplice.
//!
//! This module provides a single error type covering container parsing,
//! validation, backups, and batch orchestration.

// Submodule declarations
pub mod conversions;
pub mod types;

// Re-exports
pub use types::{Error, ErrorKind, Result};
