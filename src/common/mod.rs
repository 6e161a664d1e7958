//! Common types and utilities shared by the container, replacement and batch layers.

// Submodule declarations
pub mod error;
pub mod fs;
pub mod id;
pub mod style;
pub mod xml;

// Re-exports for convenience
pub use error::{Error, ErrorKind, Result};
pub use style::{ColorValue, RGBColor, VerticalPosition};
