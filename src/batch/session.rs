//! Single-document lifecycle.
use std::fmt;
use std::fs;
use std::io::{Cursor, ErrorKind as IoErrorKind};
use std::path::{Path, PathBuf};
use std::time::Instant;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::batch::backup::BackupNamer;
use crate::batch::config::BatchOptions;
use crate::batch::result::ProcessingResult;
use crate::common::error::{Error, Result};
use crate::common::fs::write_atomic;
use crate::ooxml::docx::{DocumentStatistics, Package};
use crate::ooxml::opc::missing_required_member;
use crate::replace::{ReplacementRule, Replacer, TableWalker};

/// Where a [`DocumentSession`] is in its lifecycle.
///
/// `Unopened → Loaded → [BackedUp] → Mutated → Saved`; any failing step
/// moves the session to `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Unopened,
    Loaded,
    BackedUp,
    Mutated,
    Saved,
    Failed,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SessionState::Unopened => "unopened",
            SessionState::Loaded => "loaded",
            SessionState::BackedUp => "backed up",
            SessionState::Mutated => "mutated",
            SessionState::Saved => "saved",
            SessionState::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Owns one document from load to save.
///
/// A session is confined to the thread that drives it. When backups are
/// enabled, [`replace_text`](Self::replace_text) refuses to run until
/// [`create_backup`](Self::create_backup) has succeeded.
///
/// # Examples
///
/// ```rust,no_run
/// use docsplice::batch::{BatchOptions, DocumentSession};
/// use docsplice::replace::ReplacementRule;
///
/// let rules = [ReplacementRule::new("2024", "2025")?];
/// let mut session = DocumentSession::new("report.docx", BatchOptions::default());
/// session.load()?;
/// session.create_backup()?;
/// let counts = session.replace_text(&rules)?;
/// session.save()?;
/// println!("{:?} -> {:?}", counts, session.backup_path());
/// # Ok::<(), docsplice::common::Error>(())
/// ```
pub struct DocumentSession {
    path: PathBuf,
    options: BatchOptions,
    state: SessionState,
    /// File contents as loaded; the backup is written from these
    original: Option<Vec<u8>>,
    package: Option<Package>,
    backup_path: Option<PathBuf>,
    counts: Vec<usize>,
}

impl DocumentSession {
    pub fn new<P: Into<PathBuf>>(path: P, options: BatchOptions) -> Self {
        Self {
            path: path.into(),
            options,
            state: SessionState::Unopened,
            original: None,
            package: None,
            backup_path: None,
            counts: Vec::new(),
        }
    }

    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[inline]
    pub fn state(&self) -> SessionState {
        self.state
    }

    #[inline]
    pub fn backup_path(&self) -> Option<&Path> {
        self.backup_path.as_deref()
    }

    /// Per-rule occurrence counts of every `replace_text` call so far.
    #[inline]
    pub fn counts(&self) -> &[usize] {
        &self.counts
    }

    fn expect_state(&self, op: &str, allowed: &[SessionState]) -> Result<()> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(Error::State(format!(
                "cannot {} {} while the session is {}",
                op,
                self.path.display(),
                self.state
            )))
        }
    }

    /// Record a failure of a lifecycle step.
    fn fail<T>(&mut self, result: Result<T>) -> Result<T> {
        if result.is_err() {
            self.state = SessionState::Failed;
        }
        result
    }

    /// Read and parse the document.
    pub fn load(&mut self) -> Result<()> {
        self.expect_state("load", &[SessionState::Unopened])?;
        let result = read_package(&self.path);
        let (data, package) = self.fail(result)?;
        debug!("loaded {}", self.path.display());
        self.original = Some(data);
        self.package = Some(package);
        self.state = SessionState::Loaded;
        Ok(())
    }

    /// Directory backups go to: the configured one, or the source's own.
    pub fn backup_dir(&self) -> PathBuf {
        match &self.options.backup_dir {
            Some(dir) => dir.clone(),
            None => match self.path.parent() {
                Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
                _ => PathBuf::from("."),
            },
        }
    }

    /// Write a durable backup of the document as loaded.
    pub fn create_backup(&mut self) -> Result<PathBuf> {
        self.expect_state("back up", &[SessionState::Loaded])?;
        let namer = BackupNamer::new(self.options.backup_retry_limit);
        let dir = self.backup_dir();
        let data = self.original.as_deref().unwrap_or_default();
        let result = namer.backup(&self.path, data, &dir);
        let backup = self.fail(result)?;
        info!("backed up {} to {}", self.path.display(), backup.display());
        self.backup_path = Some(backup.clone());
        self.state = SessionState::BackedUp;
        Ok(backup)
    }

    /// Apply `rules` in order; returns the occurrence count of each rule.
    pub fn replace_text(&mut self, rules: &[ReplacementRule]) -> Result<Vec<usize>> {
        if self.options.backup_enabled {
            self.expect_state("edit", &[SessionState::BackedUp, SessionState::Mutated])?;
        } else {
            self.expect_state(
                "edit",
                &[SessionState::Loaded, SessionState::BackedUp, SessionState::Mutated],
            )?;
        }

        let replacer = Replacer::new(TableWalker::new(self.options.max_table_depth));
        let result = match self.package.as_mut() {
            Some(package) => replacer.replace_in_document(package.document_mut(), rules),
            None => Err(Error::Internal("loaded session has no document".to_string())),
        };
        let counts = self.fail(result)?;
        self.counts.extend_from_slice(&counts);
        self.state = SessionState::Mutated;
        Ok(counts)
    }

    /// Write the edited document back over the source, atomically.
    pub fn save(&mut self) -> Result<()> {
        let path = self.path.clone();
        self.save_as(&path)
    }

    /// Write the edited document to `path`, atomically.
    pub fn save_as<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        self.expect_state("save", &[SessionState::Mutated])?;
        let path = path.as_ref();
        let result = match self.package.as_mut() {
            Some(package) => package.save(path).map_err(Error::from),
            None => Err(Error::Internal("mutated session has no document".to_string())),
        };
        self.fail(result)?;
        debug!("saved {}", path.display());
        self.state = SessionState::Saved;
        Ok(())
    }

    /// Statistics of the document in its current form.
    pub fn statistics(&self) -> Result<DocumentStatistics> {
        let package = self.package.as_ref().ok_or_else(|| {
            Error::State(format!("{} has not been loaded", self.path.display()))
        })?;
        let mut stats = package.document().statistics();
        stats.set_replacement_count(self.counts.iter().sum());
        Ok(stats)
    }

    /// Copy the backup back over the source and reload it.
    pub fn restore_backup(&mut self) -> Result<()> {
        let Some(backup) = self.backup_path.clone() else {
            return Err(Error::State(format!("{} has no backup to restore", self.path.display())));
        };
        let data = fs::read(&backup).map_err(|e| Error::backup_io(&format!("cannot read {}", backup.display()), e))?;
        write_atomic(&self.path, &data)?;
        let package = Package::from_bytes(&data)?;
        info!("restored {} from {}", self.path.display(), backup.display());
        self.original = Some(data);
        self.package = Some(package);
        self.counts.clear();
        self.state = SessionState::BackedUp;
        Ok(())
    }

    /// Drive the whole lifecycle for `path` and report the outcome.
    /// Never returns an error; failures are captured in the result.
    pub fn run(path: &Path, rules: &[ReplacementRule], options: &BatchOptions) -> ProcessingResult {
        let started = Instant::now();
        let mut session = Self::new(path, options.clone());
        match session.run_steps(rules) {
            Ok(()) => {
                let result =
                    ProcessingResult::success(path, session.counts.clone(), session.backup_path.clone(), started.elapsed());
                info!("{}: {}", path.display(), result.message);
                result
            },
            Err(err) => {
                info!("{}: failed in state {}: {}", path.display(), session.state, err);
                ProcessingResult::failure(path, &err, session.backup_path.clone(), started.elapsed())
            },
        }
    }

    fn run_steps(&mut self, rules: &[ReplacementRule]) -> Result<()> {
        self.load()?;
        if self.options.backup_enabled {
            self.create_backup()?;
        }
        self.replace_text(rules)?;
        self.save()
    }
}

/// Read `path` and parse it as a Word package.
fn read_package(path: &Path) -> Result<(Vec<u8>, Package)> {
    let data = fs::read(path).map_err(|e| match e.kind() {
        IoErrorKind::NotFound => Error::NotFound(path.display().to_string()),
        _ => Error::Io(e),
    })?;
    if let Some(member) = missing_required_member(Cursor::new(&data))? {
        return Err(Error::Format(format!("{} has no {}", path.display(), member)));
    }
    let package = Package::from_bytes(&data)?;
    Ok((data, package))
}
