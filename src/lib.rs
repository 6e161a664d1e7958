//! Docsplice - format-preserving find and replace for Word documents
//!
//! This library edits the text of `.docx` files in place while leaving their
//! formatting, layout, and every unrelated package member untouched.
//!
//! # Features
//!
//! - **Cross-run matching**: text split over differently formatted runs is
//!   found and replaced as one match
//! - **Format inheritance**: a replacement takes the formatting of the first
//!   character it replaces
//! - **Nested tables**: cells are searched recursively, with a depth guard
//! - **Batch processing**: a fixed-width worker pool with per-file isolation
//! - **Safe backups**: collision-resistant names, written durably before any
//!   change
//!
//! # Example - Replacing text in one document
//!
//! ```no_run
//! use docsplice::ooxml::docx::Package;
//! use docsplice::replace::{ReplacementRule, replace_text};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut pkg = Package::open("report.docx")?;
//! let rules = [ReplacementRule::new("2024", "2025")?];
//! let counts = replace_text(pkg.document_mut(), &rules)?;
//! println!("{} replacement(s)", counts[0]);
//! pkg.save("report.docx")?;
//! # Ok(())
//! # }
//! ```
//!
//! # Example - Processing a batch
//!
//! ```no_run
//! use docsplice::batch::{BatchOptions, process_documents};
//! use docsplice::replace::ReplacementRule;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let rules = [ReplacementRule::new("ACME Ltd", "ACME GmbH")?];
//! let options = BatchOptions::default().with_backup_dir(Some("backups"));
//! let summary = process_documents(&["a.docx", "b.docx"], &rules, &options, |done, total| {
//!     eprintln!("{}/{}", done, total);
//! });
//! println!("{} of {} succeeded", summary.success, summary.total);
//! # Ok(())
//! # }
//! ```

pub mod batch;
pub mod common;
pub mod ooxml;
pub mod replace;

pub use batch::{BatchCoordinator, BatchOptions, BatchSummary, ProcessingResult, process_documents};
pub use common::{Error, ErrorKind, Result};
pub use replace::{ReplacementRule, replace_text};
