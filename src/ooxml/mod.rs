//! Office Open XML (OOXML) support for WordprocessingML packages.
//!
//! The module is organized into two layers:
//!
//! 1. **OPC Layer** (`opc`): the ZIP container, content types, and package
//!    relationships
//! 2. **Word Layer** (`docx`): the main document part as an editable tree of
//!    paragraphs, fragments, and tables
//!
//! # Example
//!
//! ```rust,no_run
//! use docsplice::ooxml::docx::Package;
//!
//! let pkg = Package::open("document.docx")?;
//! let stats = pkg.document().statistics();
//! println!("{} paragraphs, {} tables", stats.paragraph_count(), stats.table_count());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
pub mod docx;
pub mod error;
pub mod opc;

pub use error::OoxmlError;
pub use opc::{OpcPackage, PackURI};
