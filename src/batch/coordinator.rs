//! Concurrent batch processing.
//!
//! Every input path is validated on the calling thread first; rejected paths
//! get a failure result straight away and are never scheduled. Valid paths
//! are spawned onto a fixed-width rayon pool, one [`DocumentSession`] per
//! unit, and each unit sends its [`ProcessingResult`] back over a channel.
//! Only the calling thread drains that channel, so progress and result
//! callbacks always run there and never on a worker.

use std::any::Any;
use std::collections::HashSet;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, mpsc};
use std::time::{Duration, Instant};

use log::{info, warn};

use crate::batch::config::BatchOptions;
use crate::batch::result::{BatchSummary, ProcessingResult};
use crate::batch::session::DocumentSession;
use crate::batch::validate::{identity_key, validate_path};
use crate::common::error::{Error, ErrorKind};
use crate::replace::ReplacementRule;

/// Cooperative cancellation flag, checked before each file is started.
///
/// Clones share the flag, so a handle can be moved to another thread (a
/// signal handler, a UI) and triggered from there. Files already being
/// processed run to completion.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle(Arc<AtomicBool>);

impl CancelHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

type ProgressFn<'a> = Box<dyn FnMut(usize, usize) + 'a>;
type ResultFn<'a> = Box<dyn FnMut(&ProcessingResult) + 'a>;

/// Fans documents out over a worker pool and collects their results.
///
/// # Examples
///
/// ```rust,no_run
/// use docsplice::batch::{BatchCoordinator, BatchOptions};
/// use docsplice::replace::ReplacementRule;
///
/// let rules = [ReplacementRule::new("2024", "2025")?];
/// let mut coordinator = BatchCoordinator::new(BatchOptions::default())
///     .on_progress(|done, total| println!("{}/{}", done, total));
/// let summary = coordinator.process(&["a.docx", "b.docx"], &rules);
/// println!("{} of {} succeeded", summary.success, summary.total);
/// # Ok::<(), docsplice::common::Error>(())
/// ```
pub struct BatchCoordinator<'a> {
    options: BatchOptions,
    cancel: CancelHandle,
    on_progress: Option<ProgressFn<'a>>,
    on_result: Option<ResultFn<'a>>,
    summary: BatchSummary,
}

impl<'a> BatchCoordinator<'a> {
    pub fn new(options: BatchOptions) -> Self {
        Self {
            options,
            cancel: CancelHandle::new(),
            on_progress: None,
            on_result: None,
            summary: BatchSummary::default(),
        }
    }

    /// Called with `(completed, scheduled)` after each scheduled file finishes.
    pub fn on_progress<F>(mut self, f: F) -> Self
    where
        F: FnMut(usize, usize) + 'a,
    {
        self.on_progress = Some(Box::new(f));
        self
    }

    /// Called with every result, rejected paths included.
    pub fn on_result<F>(mut self, f: F) -> Self
    where
        F: FnMut(&ProcessingResult) + 'a,
    {
        self.on_result = Some(Box::new(f));
        self
    }

    /// Use an existing cancellation flag instead of a fresh one.
    pub fn with_cancel_handle(mut self, cancel: CancelHandle) -> Self {
        self.cancel = cancel;
        self
    }

    /// A handle that cancels this coordinator's runs. Once cancelled, it
    /// stays cancelled.
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    #[inline]
    pub fn options(&self) -> &BatchOptions {
        &self.options
    }

    /// Summary of the most recent run.
    #[inline]
    pub fn summary(&self) -> &BatchSummary {
        &self.summary
    }

    fn emit(&mut self, result: ProcessingResult, results: &mut Vec<ProcessingResult>) {
        if let Some(f) = self.on_result.as_mut() {
            f(&result);
        }
        results.push(result);
    }

    /// Process `paths` with `rules`. The summary holds exactly one result per
    /// input path: rejected paths first, then scheduled ones in the order
    /// they completed.
    pub fn process<P: AsRef<Path>>(&mut self, paths: &[P], rules: &[ReplacementRule]) -> BatchSummary {
        let mut results = Vec::with_capacity(paths.len());
        let mut seen = HashSet::with_capacity(paths.len());
        let mut scheduled = Vec::with_capacity(paths.len());

        for path in paths {
            let path = path.as_ref();
            let outcome = if seen.insert(identity_key(path)) {
                validate_path(path, &self.options)
            } else {
                Err(Error::Validation(format!("{} is listed more than once", path.display())))
            };
            match outcome {
                Ok(()) => scheduled.push(path.to_path_buf()),
                Err(err) => {
                    warn!("skipping {}: {}", path.display(), err);
                    self.emit(ProcessingResult::failure(path, &err, None, Duration::ZERO), &mut results);
                },
            }
        }

        if !scheduled.is_empty() {
            info!(
                "processing {} file(s) with {} worker(s), {} rejected",
                scheduled.len(),
                self.options.workers(),
                results.len()
            );
            self.run_pool(scheduled, rules, &mut results);
        }

        let cancelled = results.iter().any(|r| r.error_kind() == Some(ErrorKind::Cancelled));
        if cancelled {
            info!("batch cancelled");
        }
        self.summary = BatchSummary::from_results(results, cancelled);
        self.summary.clone()
    }

    fn run_pool(&mut self, scheduled: Vec<PathBuf>, rules: &[ReplacementRule], results: &mut Vec<ProcessingResult>) {
        let total = scheduled.len();
        let pool = match rayon::ThreadPoolBuilder::new()
            .num_threads(self.options.workers())
            .thread_name(|i| format!("docsplice-worker-{}", i))
            .build()
        {
            Ok(pool) => pool,
            Err(e) => {
                let err = Error::Internal(format!("cannot start worker pool: {}", e));
                for path in &scheduled {
                    self.emit(ProcessingResult::failure(path, &err, None, Duration::ZERO), results);
                }
                return;
            },
        };

        let (tx, rx) = mpsc::channel::<ProcessingResult>();
        let options = self.options.clone();
        let options = &options;
        let cancel = &self.cancel;

        pool.in_place_scope(|scope| {
            for path in scheduled {
                let tx = tx.clone();
                scope.spawn(move |_| {
                    let result = run_unit(&path, rules, options, cancel);
                    let _ = tx.send(result);
                });
            }
            drop(tx);

            // drain on the calling thread while the workers run
            let mut completed = 0;
            while let Ok(result) = rx.recv() {
                completed += 1;
                if let Some(f) = self.on_result.as_mut() {
                    f(&result);
                }
                if let Some(f) = self.on_progress.as_mut() {
                    f(completed, total);
                }
                results.push(result);
            }
        });
    }
}

/// One file, end to end, on a worker thread.
fn run_unit(path: &Path, rules: &[ReplacementRule], options: &BatchOptions, cancel: &CancelHandle) -> ProcessingResult {
    if cancel.is_cancelled() {
        return ProcessingResult::failure(path, &Error::Cancelled, None, Duration::ZERO);
    }
    let started = Instant::now();
    panic::catch_unwind(AssertUnwindSafe(|| DocumentSession::run(path, rules, options))).unwrap_or_else(|payload| {
        let err = Error::Internal(format!("worker panicked: {}", panic_message(payload.as_ref())));
        ProcessingResult::failure(path, &err, None, started.elapsed())
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Process `paths` with default callbacks beyond progress.
///
/// This is the batch entry point: one result per input path, never an
/// early return on a per-file error.
pub fn process_documents<P, F>(
    paths: &[P],
    rules: &[ReplacementRule],
    options: &BatchOptions,
    on_progress: F,
) -> BatchSummary
where
    P: AsRef<Path>,
    F: FnMut(usize, usize),
{
    BatchCoordinator::new(options.clone())
        .on_progress(on_progress)
        .process(paths, rules)
}
