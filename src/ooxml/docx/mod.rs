/// Word (.docx) document support.
///
/// The main document part is parsed into an editable tree:
/// - `Package`: the .docx file, with every non-body member carried through
/// - `Document`: the body as ordered paragraphs, tables, and opaque nodes
/// - `Block`: a paragraph with its text fragments and opaque inlines
/// - `Fragment`: a formatted run of plain text
/// - `Table` / `Row` / `Cell`: the table tree, nested tables included
///
/// # Example
///
/// ```rust,no_run
/// use docsplice::ooxml::docx::Package;
///
/// let package = Package::open("document.docx")?;
/// for block in package.document().all_blocks() {
///     for fragment in block.fragments() {
///         println!("{:?}", fragment.text());
///     }
/// }
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub mod document;
pub mod format;
pub mod package;
pub mod paragraph;
pub mod statistics;
pub mod table;

#[cfg(test)]
pub(crate) mod testing;

pub use document::{BodyItem, Document};
pub use package::Package;
pub use paragraph::{Block, Fragment, Inline};
pub use statistics::DocumentStatistics;
pub use table::{Cell, CellItem, Row, RowItem, Table, TableItem};
