//! Pre-validation of input paths, before anything is scheduled.
use std::fs::{self, File};
use std::io::{ErrorKind as IoErrorKind, Read, Seek};
use std::path::{Path, PathBuf};

use log::debug;

use crate::batch::config::BatchOptions;
use crate::common::error::{Error, Result};
use crate::ooxml::opc::missing_required_member;

/// The one accepted file extension, compared case-insensitively.
pub const DOCX_EXTENSION: &str = "docx";

pub fn has_docx_extension(path: &Path) -> bool {
    path.extension().is_some_and(|e| e.eq_ignore_ascii_case(DOCX_EXTENSION))
}

/// Check extension, readability, size, and package structure of `path`.
///
/// Extension and size are checked before the file is opened, so an
/// oversized or empty file is never read. The structure check reads the
/// ZIP central directory only.
pub fn validate_path(path: &Path, options: &BatchOptions) -> Result<()> {
    if !has_docx_extension(path) {
        return Err(Error::Validation(format!("{} is not a .docx file", path.display())));
    }

    let meta = fs::metadata(path).map_err(|e| match e.kind() {
        IoErrorKind::NotFound => Error::NotFound(path.display().to_string()),
        _ => Error::Validation(format!("cannot read {}: {}", path.display(), e)),
    })?;
    if !meta.is_file() {
        return Err(Error::Validation(format!("{} is not a regular file", path.display())));
    }
    let size = meta.len();
    if size == 0 {
        return Err(Error::Validation(format!("{} is empty", path.display())));
    }
    if size > options.max_file_size {
        return Err(Error::Validation(format!(
            "{} is {} bytes, over the {} byte limit",
            path.display(),
            size,
            options.max_file_size
        )));
    }

    let file = File::open(path).map_err(|e| Error::Validation(format!("cannot read {}: {}", path.display(), e)))?;
    validate_structure(file).map_err(|e| match e {
        Error::Validation(msg) => Error::Validation(format!("{}: {}", path.display(), msg)),
        other => other,
    })?;
    debug!("validated {} ({} bytes)", path.display(), size);
    Ok(())
}

/// Check that `reader` holds a package with the members every .docx needs.
pub fn validate_structure<R: Read + Seek>(reader: R) -> Result<()> {
    match missing_required_member(reader) {
        Ok(None) => Ok(()),
        Ok(Some(member)) => Err(Error::Validation(format!("missing required member {}", member))),
        Err(e) => Err(Error::Validation(format!("not a valid package: {}", e))),
    }
}

/// Key used to spot the same file listed twice under different spellings.
pub(crate) fn identity_key(path: &Path) -> PathBuf {
    fs::canonicalize(path)
        .or_else(|_| std::path::absolute(path))
        .unwrap_or_else(|_| path.to_path_buf())
}
