//! Collision-resistant backup files.
//!
//! A backup is named
//! `{stem}_backup_{parent hint}_{path hash}_{random}{ext}`:
//! - the parent hint is the source's directory name, reduced to letters,
//!   digits and underscores (CJK included), at most 20 characters, or
//!   `_root_` when nothing is left
//! - the path hash is the first 6 hex digits of SHA-256 over the absolute
//!   source path, so same-named files from different folders differ
//! - the random part is 8 fresh hex digits per attempt
//!
//! Finalizing writes a synced temporary file inside the backup directory and
//! hard-links it to the final name. Linking never replaces an existing file,
//! so a name taken by another thread or process is detected rather than
//! overwritten, and a new random part is drawn. On volumes without hard
//! links (FAT, exFAT, many SMB shares) the final name is created exclusively
//! and written directly instead, which is just as unable to clobber.

use std::fmt;
use std::fs;
use std::io::{self, ErrorKind as IoErrorKind};
use std::path::{Path, PathBuf};

use log::{debug, warn};
use sha2::{Digest, Sha256};

use crate::batch::config::DEFAULT_BACKUP_RETRY_LIMIT;
use crate::common::error::{Error, Result};
use crate::common::fs::{fsync_dir, write_new_synced};
use crate::common::id::{hex_encode, random_hex};

const HINT_MAX_CHARS: usize = 20;
const ROOT_HINT: &str = "_root_";
const HASH_HEX_LEN: usize = 6;
const RANDOM_HEX_LEN: usize = 8;

/// The parts of a backup file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupName {
    pub stem: String,
    pub hint: String,
    pub hash: String,
    pub random: String,
    /// Extension including the dot, or empty
    pub ext: String,
}

impl BackupName {
    pub fn file_name(&self) -> String {
        format!(
            "{}_backup_{}_{}_{}{}",
            self.stem, self.hint, self.hash, self.random, self.ext
        )
    }

    /// Draw a new random part.
    pub fn reroll(&mut self) {
        self.random = random_hex(RANDOM_HEX_LEN);
    }
}

impl fmt::Display for BackupName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.file_name())
    }
}

fn is_cjk(c: char) -> bool {
    matches!(c,
        '\u{3400}'..='\u{4DBF}'
        | '\u{4E00}'..='\u{9FFF}'
        | '\u{F900}'..='\u{FAFF}'
        | '\u{3040}'..='\u{30FF}'
        | '\u{AC00}'..='\u{D7AF}'
        | '\u{20000}'..='\u{2FA1F}')
}

/// Directory hint for `source`: its parent's name, filtered and truncated.
pub fn parent_hint(source: &Path) -> String {
    let hint: String = source
        .parent()
        .and_then(Path::file_name)
        .map(|n| n.to_string_lossy())
        .unwrap_or_default()
        .chars()
        .filter(|&c| c.is_ascii_alphanumeric() || c == '_' || is_cjk(c))
        .take(HINT_MAX_CHARS)
        .collect();
    if hint.is_empty() { ROOT_HINT.to_string() } else { hint }
}

/// First 6 hex digits of SHA-256 over the absolute form of `source`.
pub fn path_hash(source: &Path) -> String {
    let absolute = std::path::absolute(source).unwrap_or_else(|_| source.to_path_buf());
    let mut hasher = Sha256::new();
    hasher.update(absolute.to_string_lossy().as_bytes());
    let digest = hasher.finalize().to_vec();
    let mut hex = hex_encode(&digest[..HASH_HEX_LEN / 2]);
    hex.truncate(HASH_HEX_LEN);
    hex
}

/// Generates backup names and writes backups without ever overwriting one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackupNamer {
    retry_limit: usize,
}

impl BackupNamer {
    pub fn new(retry_limit: usize) -> Self {
        Self {
            retry_limit: retry_limit.max(1),
        }
    }

    #[inline]
    pub fn retry_limit(&self) -> usize {
        self.retry_limit
    }

    /// A fresh name for a backup of `source`.
    pub fn generate(&self, source: &Path) -> BackupName {
        BackupName {
            stem: source
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default(),
            hint: parent_hint(source),
            hash: path_hash(source),
            random: random_hex(RANDOM_HEX_LEN),
            ext: source
                .extension()
                .map(|e| format!(".{}", e.to_string_lossy()))
                .unwrap_or_default(),
        }
    }

    /// Durably write `data` into `dir` under `name`, drawing a new random
    /// part whenever the name is taken. Returns the final path; `name` is
    /// left holding the name that was used.
    pub fn finalize(&self, data: &[u8], dir: &Path, name: &mut BackupName) -> Result<PathBuf> {
        self.finalize_with(data, dir, name, |from, to| fs::hard_link(from, to))
    }

    fn finalize_with<L>(&self, data: &[u8], dir: &Path, name: &mut BackupName, link: L) -> Result<PathBuf>
    where
        L: Fn(&Path, &Path) -> io::Result<()>,
    {
        fs::create_dir_all(dir).map_err(|e| Error::backup_io(&format!("cannot create {}", dir.display()), e))?;

        let tmp = self.write_temp(data, dir, &name.stem, || random_hex(RANDOM_HEX_LEN))?;
        let outcome = self.link_unique(&tmp, data, dir, name, link);
        let _ = fs::remove_file(&tmp);
        let target = outcome?;
        let _ = fsync_dir(&target);
        Ok(target)
    }

    /// Write `data` to a new hidden file in `dir`, drawing another suffix
    /// while the drawn name exists.
    fn write_temp(&self, data: &[u8], dir: &Path, stem: &str, mut draw: impl FnMut() -> String) -> Result<PathBuf> {
        for _ in 0..self.retry_limit {
            let tmp = dir.join(format!(".{}.{}.tmp", stem, draw()));
            match write_new_synced(&tmp, data) {
                Ok(()) => return Ok(tmp),
                Err(e) if e.kind() == IoErrorKind::AlreadyExists => {
                    debug!("temporary {} already exists", tmp.display());
                },
                Err(e) => return Err(Error::backup_io(&format!("cannot write {}", tmp.display()), e)),
            }
        }
        Err(Error::BackupCollision {
            dir: dir.display().to_string(),
            attempts: self.retry_limit,
        })
    }

    fn link_unique<L>(&self, tmp: &Path, data: &[u8], dir: &Path, name: &mut BackupName, link: L) -> Result<PathBuf>
    where
        L: Fn(&Path, &Path) -> io::Result<()>,
    {
        let mut linkable = true;
        for attempt in 1..=self.retry_limit {
            let target = dir.join(name.file_name());
            let placed = if linkable {
                match link(tmp, &target) {
                    Err(e) if links_unsupported(&e) => {
                        debug!("no hard links in {} ({}), writing backups directly", dir.display(), e);
                        linkable = false;
                        write_new_synced(&target, data)
                    },
                    other => other,
                }
            } else {
                write_new_synced(&target, data)
            };

            match placed {
                Ok(()) => {
                    debug!("backup written to {}", target.display());
                    return Ok(target);
                },
                Err(e) if e.kind() == IoErrorKind::AlreadyExists => {
                    warn!(
                        "backup name {} already taken (attempt {}/{})",
                        target.display(),
                        attempt,
                        self.retry_limit
                    );
                    name.reroll();
                },
                Err(e) => return Err(Error::backup_io(&format!("cannot create {}", target.display()), e)),
            }
        }
        Err(Error::BackupCollision {
            dir: dir.display().to_string(),
            attempts: self.retry_limit,
        })
    }

    /// Back up `source` (whose contents are `data`) into `dir`.
    pub fn backup(&self, source: &Path, data: &[u8], dir: &Path) -> Result<PathBuf> {
        let mut name = self.generate(source);
        self.finalize(data, dir, &mut name)
    }
}

/// Link failures that mean the volume has no hard links at all.
fn links_unsupported(e: &io::Error) -> bool {
    matches!(e.kind(), IoErrorKind::Unsupported | IoErrorKind::PermissionDenied)
}

impl Default for BackupNamer {
    fn default() -> Self {
        Self::new(DEFAULT_BACKUP_RETRY_LIMIT)
    }
}
