//! Error conversion implementations.
//!
//! This module contains From trait implementations to convert from the
//! container-layer error types to the unified Error type.

use super::types::Error;
use crate::ooxml::error::OoxmlError;
use crate::ooxml::opc::error::OpcError;

impl From<OpcError> for Error {
    fn from(err: OpcError) -> Self {
        match err {
            OpcError::PackageNotFound(s) => Error::NotFound(s),
            OpcError::IoError(e) => Error::Io(e),
            other => Error::Format(other.to_string()),
        }
    }
}

impl From<OoxmlError> for Error {
    fn from(err: OoxmlError) -> Self {
        match err {
            OoxmlError::Opc(e) => Error::from(e),
            OoxmlError::Io(e) => Error::Io(e),
            OoxmlError::Structural(s) => Error::Structural(s),
            other => Error::Format(other.to_string()),
        }
    }
}
