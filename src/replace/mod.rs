//! Format-preserving find and replace.
//!
//! The pieces, leaves first:
//! - [`FormatSnapshot`], [`BlockFormat`], [`CellFormat`]: capture and replay
//!   explicitly set formatting
//! - [`TextSpanLocator`]: literal matches across fragment boundaries
//! - [`FragmentSplicer`]: rebuild a paragraph around those matches
//! - [`TableWalker`]: reach every paragraph of a (nested) table
//! - [`Replacer`]: rules applied over a whole document
//!
//! # Example
//!
//! ```rust
//! use docsplice::ooxml::docx::Block;
//! use docsplice::replace::{FragmentSplicer, TextSpanLocator};
//!
//! let mut block = Block::from_texts(&["Report 20", "24 Summary"]);
//! let locator = TextSpanLocator::new("2024");
//! let matches = locator.locate_in_block(&block);
//! assert_eq!(FragmentSplicer::splice(&mut block, &matches, "2025"), 1);
//! assert_eq!(block.text(), "Report 2025 Summary");
//! ```
pub mod locator;
pub mod replacer;
pub mod rule;
pub mod snapshot;
pub mod splicer;
pub mod walker;

#[cfg(test)]
mod tests;

pub use locator::{FragmentSpan, SpanMatch, TextSpanLocator};
pub use replacer::{Replacer, replace_in_block, replace_text};
pub use rule::{ReplacementRule, rules_from_pairs};
pub use snapshot::{AttrSet, BlockFormat, CellFormat, FormatSnapshot, Snapshot, TextColor};
pub use splicer::FragmentSplicer;
pub use walker::{DEFAULT_MAX_TABLE_DEPTH, TableWalker};
