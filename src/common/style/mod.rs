//! Common style and formatting types.

// Submodule declarations
pub mod color;
pub mod text;

// Re-exports
pub use color::{ColorValue, RGBColor};
pub use text::{VerticalPosition, parse_on_off};
