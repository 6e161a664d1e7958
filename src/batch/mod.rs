//! Batch processing of many documents.
//!
//! - [`BatchOptions`]: backup, pool width, and limits
//! - [`validate_path`]: checks run before a file is scheduled
//! - [`BackupNamer`]: collision-resistant, durable backups
//! - [`DocumentSession`]: one document from load to save
//! - [`BatchCoordinator`]: the worker pool and result collection
pub mod backup;
pub mod config;
pub mod coordinator;
pub mod discover;
pub mod result;
pub mod session;
pub mod validate;

#[cfg(test)]
mod tests;

pub use backup::{BackupName, BackupNamer};
pub use config::{BatchOptions, load_rules, rules_from_yaml};
pub use coordinator::{BatchCoordinator, CancelHandle, process_documents};
pub use discover::{collect_documents, expand_inputs};
pub use result::{BatchSummary, ErrorDetail, ProcessingResult};
pub use session::{DocumentSession, SessionState};
pub use validate::{validate_path, validate_structure};
