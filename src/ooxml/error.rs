/// Error types for OOXML operations.
use thiserror::Error;

/// Result type for OOXML operations.
pub type Result<T> = std::result::Result<T, OoxmlError>;

/// Error types for OOXML operations.
#[derive(Error, Debug)]
pub enum OoxmlError {
    /// OPC package error
    #[error("OPC error: {0}")]
    Opc(#[from] crate::ooxml::opc::error::OpcError),

    /// XML parsing error
    #[error("XML error: {0}")]
    Xml(String),

    /// Part not found
    #[error("Part not found: {0}")]
    PartNotFound(String),

    /// Invalid content type
    #[error("Invalid content type: expected {expected}, got {got}")]
    InvalidContentType { expected: String, got: String },

    /// Invalid format
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    /// Nesting deeper than the model allows
    #[error("Structural error: {0}")]
    Structural(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<crate::common::error::Error> for OoxmlError {
    fn from(err: crate::common::error::Error) -> Self {
        use crate::common::error::Error;
        match err {
            Error::Structural(s) => OoxmlError::Structural(s),
            Error::Format(s) => OoxmlError::Xml(s),
            Error::Io(e) => OoxmlError::Io(e),
            other => OoxmlError::Xml(other.to_string()),
        }
    }
}
