//! Batch options.
//!
//! Options can come from three places, later ones overriding earlier ones:
//! - defaults ([`BatchOptions::default`])
//! - a YAML file ([`BatchOptions::from_yaml_file`])
//! - environment variables ([`BatchOptions::apply_env`]):
//!   `DOCSPLICE_MAX_WORKERS`, `DOCSPLICE_BACKUP_DIR`, `DOCSPLICE_NO_BACKUP`
//!
//! The command-line front-end applies its own flags last.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::common::error::{Error, Result};
use crate::replace::{DEFAULT_MAX_TABLE_DEPTH, ReplacementRule};

/// Largest input file accepted, in bytes (100 MiB).
pub const DEFAULT_MAX_FILE_SIZE: u64 = 100 * 1024 * 1024;

pub const DEFAULT_MAX_WORKERS: usize = 4;

/// Attempts at a fresh backup name before giving up.
pub const DEFAULT_BACKUP_RETRY_LIMIT: usize = 50;

/// Options for one batch run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchOptions {
    /// Write a backup of every file before changing it.
    /// Env: DOCSPLICE_NO_BACKUP = 1|true|yes|on disables (default enabled)
    pub backup_enabled: bool,

    /// Directory for backups. None places each backup next to its source.
    /// Env: DOCSPLICE_BACKUP_DIR
    pub backup_dir: Option<PathBuf>,

    /// Worker pool width. Env: DOCSPLICE_MAX_WORKERS (default 4)
    pub max_workers: usize,

    pub max_file_size: u64,
    pub backup_retry_limit: usize,
    pub max_table_depth: usize,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            backup_enabled: true,
            backup_dir: None,
            max_workers: DEFAULT_MAX_WORKERS,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            backup_retry_limit: DEFAULT_BACKUP_RETRY_LIMIT,
            max_table_depth: DEFAULT_MAX_TABLE_DEPTH,
        }
    }
}

fn truthy(v: &str) -> bool {
    let s = v.trim().to_ascii_lowercase();
    s == "1" || s == "true" || s == "yes" || s == "on"
}

impl BatchOptions {
    /// Defaults with environment overrides applied.
    pub fn from_env() -> Self {
        Self::default().apply_env()
    }

    /// Apply environment overrides to these options.
    pub fn apply_env(self) -> Self {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides read through `lookup`. Unparsable values are ignored.
    pub fn apply_env_from<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("DOCSPLICE_MAX_WORKERS")
            && let Ok(n) = v.trim().parse::<usize>()
        {
            self.max_workers = n;
        }

        if let Some(v) = lookup("DOCSPLICE_BACKUP_DIR") {
            let s = v.trim();
            if !s.is_empty() {
                self.backup_dir = Some(PathBuf::from(s));
            }
        }

        if let Some(v) = lookup("DOCSPLICE_NO_BACKUP") {
            self.backup_enabled = !truthy(&v);
        }

        self
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        serde_saphyr::from_str(yaml).map_err(|e| Error::Config(format!("invalid options: {}", e)))
    }

    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read {}: {}", path.display(), e)))?;
        Self::from_yaml_str(&text)
    }

    /// Fluent setters (builder-style) to override specific fields.
    pub fn with_backup_enabled(mut self, on: bool) -> Self {
        self.backup_enabled = on;
        self
    }

    pub fn with_backup_dir<P: Into<PathBuf>>(mut self, dir: Option<P>) -> Self {
        self.backup_dir = dir.map(Into::into);
        self
    }

    pub fn with_max_workers(mut self, n: usize) -> Self {
        self.max_workers = n;
        self
    }

    pub fn with_max_file_size(mut self, bytes: u64) -> Self {
        self.max_file_size = bytes;
        self
    }

    pub fn with_backup_retry_limit(mut self, attempts: usize) -> Self {
        self.backup_retry_limit = attempts;
        self
    }

    pub fn with_max_table_depth(mut self, depth: usize) -> Self {
        self.max_table_depth = depth;
        self
    }

    /// Pool width actually used; never zero.
    #[inline]
    pub fn workers(&self) -> usize {
        self.max_workers.max(1)
    }
}

/// Load replacement rules from YAML: a list of `{find, replace}` maps.
///
/// ```yaml
/// - find: "2024"
///   replace: "2025"
/// - find: "DRAFT "
/// ```
pub fn load_rules<P: AsRef<Path>>(path: P) -> Result<Vec<ReplacementRule>> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("cannot read {}: {}", path.display(), e)))?;
    rules_from_yaml(&text)
}

pub fn rules_from_yaml(yaml: &str) -> Result<Vec<ReplacementRule>> {
    serde_saphyr::from_str(yaml).map_err(|e| Error::Config(format!("invalid rules: {}", e)))
}
