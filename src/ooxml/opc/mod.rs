/// Open Packaging Conventions (OPC) container handling.
///
/// This module covers the parts of the OPC specification needed to edit a
/// WordprocessingML package in place:
///
/// - ZIP-based physical packaging with member order and compression preserved
/// - Content type lookup from `[Content_Types].xml`
/// - Package relationships, used to locate the main document part

pub mod constants;
pub mod error;
pub mod package;
pub mod packuri;
pub mod phys_pkg;
pub mod pkgreader;

// Re-export commonly used types
pub use package::{OpcPackage, build_package, missing_required_member};
pub use packuri::PackURI;
