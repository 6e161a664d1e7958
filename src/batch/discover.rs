//! Finding documents in directories.
use std::fs;
use std::path::{Path, PathBuf};

use crate::batch::validate::has_docx_extension;
use crate::common::error::Result;

/// Word keeps a hidden `~$name.docx` owner file next to every open document.
fn is_lock_file(path: &Path) -> bool {
    path.file_name()
        .is_some_and(|n| n.to_string_lossy().starts_with("~$"))
}

/// Every `.docx` file in `dir` (and its subdirectories when `recursive`),
/// sorted, without Word lock files.
pub fn collect_documents<P: AsRef<Path>>(dir: P, recursive: bool) -> Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    let mut pending = vec![dir.as_ref().to_path_buf()];

    while let Some(current) = pending.pop() {
        for entry in fs::read_dir(&current)? {
            let entry = entry?;
            let path = entry.path();
            let file_type = entry.file_type()?;
            if file_type.is_dir() {
                if recursive {
                    pending.push(path);
                }
            } else if has_docx_extension(&path) && !is_lock_file(&path) {
                found.push(path);
            }
        }
    }

    found.sort();
    Ok(found)
}

/// Expand command-line inputs: directories become the documents they hold,
/// anything else is passed through for validation to judge.
pub fn expand_inputs<P: AsRef<Path>>(inputs: &[P], recursive: bool) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::with_capacity(inputs.len());
    for input in inputs {
        let input = input.as_ref();
        if input.is_dir() {
            paths.extend(collect_documents(input, recursive)?);
        } else {
            paths.push(input.to_path_buf());
        }
    }
    Ok(paths)
}
