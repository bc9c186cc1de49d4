//! The synchronization engine: one cycle of directory and file
//! convergence, and the polling loop around it.

use std::collections::HashSet;
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use replica_core::{EventSink, SyncConfig, SyncError, SyncEvent};
use replica_scan::{TreeDiff, TreeWalker};

use crate::compare::files_equal;

/// Outcome of a single synchronization cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Both phases ran to completion.
    Completed(CycleStats),
    /// One of the roots is currently missing; nothing was touched.
    ///
    /// Expected during setup and teardown, not a fault; the next cycle
    /// re-checks.
    RootMissing,
}

/// Counters for the actions taken during one cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleStats {
    pub dirs_created: usize,
    pub dirs_deleted: usize,
    pub files_created: usize,
    pub files_updated: usize,
    pub files_deleted: usize,
    /// Files whose copy or delete failed this cycle; retried next cycle.
    pub files_skipped: usize,
}

impl CycleStats {
    /// Total replica mutations performed this cycle.
    pub fn actions(&self) -> usize {
        self.dirs_created
            + self.dirs_deleted
            + self.files_created
            + self.files_updated
            + self.files_deleted
    }
}

/// One-way synchronization of a replica tree onto a source tree.
///
/// The engine holds no state between cycles beyond its configuration;
/// every cycle re-enumerates both trees and converges the replica from
/// scratch. Events are emitted to the injected sink, one per filesystem
/// action taken.
pub struct SyncEngine {
    config: SyncConfig,
    sink: Arc<dyn EventSink>,
}

impl SyncEngine {
    /// Create an engine for the given configuration, emitting events to
    /// `sink`.
    pub fn new(config: SyncConfig, sink: Arc<dyn EventSink>) -> Self {
        Self { config, sink }
    }

    /// Run cycles until the token is cancelled, sleeping the configured
    /// interval between them.
    ///
    /// A failed cycle is logged and retried at the next tick; nothing
    /// escapes the loop. Cycles never overlap: the sleep starts only after
    /// the previous cycle has run to completion or to its abort point.
    pub async fn run(&self, cancel: CancellationToken) {
        self.sink.emit(&SyncEvent::started(&self.config));

        while !cancel.is_cancelled() {
            match self.run_cycle() {
                Ok(CycleOutcome::Completed(stats)) => {
                    tracing::debug!(?stats, "cycle completed");
                }
                Ok(CycleOutcome::RootMissing) => {
                    tracing::debug!("source or replica root missing, cycle deferred");
                }
                Err(err) => {
                    tracing::warn!(error = %err, "cycle failed, retrying next interval");
                }
            }

            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(self.config.interval) => {}
            }
        }
    }

    /// One full pass: preflight, directory sync, then file sync.
    ///
    /// Directories are synchronized first so that file copies never land in
    /// a missing parent. A structural error in the directory phase aborts
    /// the cycle before file sync runs; the caller decides whether to retry.
    pub fn run_cycle(&self) -> Result<CycleOutcome, SyncError> {
        if !self.config.source.is_dir() || !self.config.replica.is_dir() {
            return Ok(CycleOutcome::RootMissing);
        }

        let mut stats = CycleStats::default();
        self.sync_directories(&mut stats)?;
        self.sync_files(&mut stats)?;

        Ok(CycleOutcome::Completed(stats))
    }

    /// Converge the replica's directory skeleton: create what the source
    /// has, then delete what the source no longer has.
    fn sync_directories(&self, stats: &mut CycleStats) -> Result<(), SyncError> {
        let source_dirs = TreeWalker::new(&self.config.source).directories()?;
        let replica_dirs = TreeWalker::new(&self.config.replica).directories()?;
        let diff = TreeDiff::between(&source_dirs, &replica_dirs);

        for rel in &diff.missing {
            let target = self.config.replica.join(rel);
            // create_dir_all for a deeper path may already have
            // materialized this ancestor; creating it again would
            // double-count the event.
            if target.is_dir() {
                continue;
            }
            fs::create_dir_all(&target).map_err(|source| SyncError::CreateDirectory {
                path: target.clone(),
                source,
            })?;
            stats.dirs_created += 1;
            self.sink.emit(&SyncEvent::directory_created(rel));
        }

        for rel in &diff.extraneous {
            let target = self.config.replica.join(rel);
            // Deleting an ancestor earlier in this pass removes its whole
            // subtree; entries already gone are skipped, not errors.
            if !target.is_dir() {
                continue;
            }
            fs::remove_dir_all(&target).map_err(|source| SyncError::DeleteDirectory {
                path: target.clone(),
                source,
            })?;
            stats.dirs_deleted += 1;
            self.sink.emit(&SyncEvent::directory_deleted(rel));
        }

        Ok(())
    }

    /// Converge file contents: copy new files, rewrite changed ones, delete
    /// extraneous ones.
    ///
    /// Failures on individual files are contained and retried next cycle;
    /// only enumeration failures abort the phase.
    fn sync_files(&self, stats: &mut CycleStats) -> Result<(), SyncError> {
        let source_files = TreeWalker::new(&self.config.source).files()?;
        let replica_files = TreeWalker::new(&self.config.replica).files()?;
        let replica_set: HashSet<&Path> =
            replica_files.iter().map(PathBuf::as_path).collect();

        for rel in &source_files {
            let source_path = self.config.source.join(rel);
            let replica_path = self.config.replica.join(rel);

            if replica_set.contains(rel.as_path()) {
                match files_equal(&source_path, &replica_path) {
                    Ok(true) => {}
                    Ok(false) => match fs::copy(&source_path, &replica_path) {
                        Ok(_) => {
                            stats.files_updated += 1;
                            self.sink.emit(&SyncEvent::file_updated(rel));
                        }
                        Err(err) => self.skip_file(rel, "update", &err, stats),
                    },
                    // A file that can't be read right now is left alone;
                    // the next cycle re-evaluates it from scratch.
                    Err(err) => self.skip_file(rel, "compare", &err, stats),
                }
            } else {
                match copy_new(&source_path, &replica_path) {
                    Ok(_) => {
                        stats.files_created += 1;
                        self.sink.emit(&SyncEvent::file_created(rel));
                    }
                    Err(err) => self.skip_file(rel, "copy", &err, stats),
                }
            }
        }

        let diff = TreeDiff::between(&source_files, &replica_files);
        for rel in &diff.extraneous {
            let target = self.config.replica.join(rel);
            match fs::remove_file(&target) {
                Ok(()) => {
                    stats.files_deleted += 1;
                    self.sink.emit(&SyncEvent::file_deleted(rel));
                }
                Err(err) => self.skip_file(rel, "delete", &err, stats),
            }
        }

        Ok(())
    }

    fn skip_file(&self, rel: &Path, action: &str, err: &io::Error, stats: &mut CycleStats) {
        tracing::debug!(
            path = %rel.display(),
            action,
            error = %err,
            "file skipped, will retry next cycle"
        );
        stats.files_skipped += 1;
    }
}

/// Copy a file that must not yet exist in the replica.
fn copy_new(source: &Path, target: &Path) -> io::Result<u64> {
    let mut reader = File::open(source)?;
    let mut writer = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(target)?;
    io::copy(&mut reader, &mut writer)
}
