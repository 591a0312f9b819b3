//! Directory cleaner: deletes stale entries and records what it could not delete

use crate::config::parse_level;
use crate::{CleanerConfig, CleanerMetrics, DeleteError, ErrorHistory, JanitorError, MetricsSnapshot};
use chrono::{DateTime, Utc};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tracing::Level;

/// Deletes entries in one directory that have not been modified within the
/// retention threshold
///
/// Only the immediate children of the directory are examined, in
/// lexicographic path order. A stale child directory is removed together with
/// its contents; the directory itself is never removed. Symlinks are judged
/// and removed as links, never followed.
///
/// A cycle never fails as a whole. Every entry that cannot be deleted becomes
/// a [`DeleteError`] in the cleaner's history, is logged at the configured
/// level, and the cycle moves on to the next entry. A directory that cannot
/// be listed counts as a single error for that cycle.
///
/// Cycles must not overlap; the scheduling side runs one at a time. Reads of
/// the error history are safe from any thread while a cycle is running.
///
/// # Examples
///
/// ```no_run
/// use custodian_janitor::DirectoryCleaner;
/// use std::time::Duration;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let cleaner = DirectoryCleaner::new("/var/spool/uploads", Duration::from_secs(3600))?;
/// cleaner.run_cycle();
/// println!("{} delete errors so far", cleaner.total_error_count());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct DirectoryCleaner {
    directory: PathBuf,
    retention_threshold: Duration,
    log_level: Level,
    dry_run: bool,
    started_at: DateTime<Utc>,
    history: ErrorHistory,
    metrics: CleanerMetrics,
}

impl DirectoryCleaner {
    /// Create a cleaner with the default log level (WARN) and history size
    pub fn new(directory_path: impl AsRef<str>, retention_threshold: Duration) -> Result<Self, JanitorError> {
        let directory_path = directory_path.as_ref();
        if directory_path.trim().is_empty() {
            return Err(JanitorError::Config("directory_path must not be blank".to_string()));
        }

        Ok(Self {
            directory: PathBuf::from(directory_path),
            retention_threshold,
            log_level: Level::WARN,
            dry_run: false,
            started_at: Utc::now(),
            history: ErrorHistory::default(),
            metrics: CleanerMetrics::new(),
        })
    }

    /// Create a cleaner from a validated job configuration
    pub fn from_config(config: &CleanerConfig) -> Result<Self, JanitorError> {
        config.validate()?;
        Ok(Self::new(&config.directory_path, config.retention_threshold)?
            .with_log_level(parse_level(&config.delete_error_log_level)?)
            .with_max_recent_errors(config.max_recent_errors)
            .with_dry_run(config.dry_run))
    }

    /// Log delete failures at `level`
    pub fn with_log_level(mut self, level: Level) -> Self {
        self.log_level = level;
        self
    }

    /// Retain at most `capacity` delete errors
    pub fn with_max_recent_errors(mut self, capacity: usize) -> Self {
        self.history = ErrorHistory::new(capacity);
        self
    }

    /// Log eligible entries instead of deleting them
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Directory being cleaned
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Minimum age before an entry is deleted
    pub fn retention_threshold(&self) -> Duration {
        self.retention_threshold
    }

    /// When this cleaner was created
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Retained delete errors, oldest first
    pub fn recent_errors(&self) -> Vec<DeleteError> {
        self.history.recent()
    }

    /// Delete errors recorded since creation, including evicted ones
    pub fn total_error_count(&self) -> u64 {
        self.history.total()
    }

    /// Counters across all cycles so far
    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot(self.history.total())
    }

    /// Run one cleanup cycle
    pub fn run_cycle(&self) {
        let entries = match list_entries(&self.directory) {
            Ok(entries) => entries,
            Err(e) => {
                self.record_error(DeleteError::from_cause(&self.directory, e));
                self.metrics.record_cycle();
                return;
            }
        };

        let now = SystemTime::now();
        let mut deleted = 0u64;
        let mut eligible = 0u64;
        let mut failed = 0u64;

        for entry in entries {
            match self.clean_entry(&entry, now) {
                Ok(EntryOutcome::Kept) => {}
                Ok(EntryOutcome::Eligible) => eligible += 1,
                Ok(EntryOutcome::Deleted) => deleted += 1,
                Err(e) => {
                    failed += 1;
                    self.record_error(DeleteError::from_cause(&entry, e));
                }
            }
        }

        if self.dry_run {
            self.metrics.record_dry_run(eligible);
        }
        self.metrics.record_deletions(deleted);
        self.metrics.record_cycle();

        tracing::debug!(
            "Cleanup of {} finished: {} deleted, {} failed",
            self.directory.display(),
            deleted,
            failed
        );
    }

    fn clean_entry(&self, entry: &Path, now: SystemTime) -> io::Result<EntryOutcome> {
        let metadata = fs::symlink_metadata(entry)?;
        let modified = metadata.modified()?;
        // modification times in the future count as brand new
        let age = now.duration_since(modified).unwrap_or(Duration::ZERO);

        if !self.is_eligible(age) {
            return Ok(EntryOutcome::Kept);
        }

        if self.dry_run {
            tracing::info!(
                "DRY RUN: Would delete {} (age {:?})",
                entry.display(),
                age
            );
            return Ok(EntryOutcome::Eligible);
        }

        if metadata.is_dir() {
            fs::remove_dir_all(entry)?;
        } else {
            fs::remove_file(entry)?;
        }
        tracing::trace!("Deleted {}", entry.display());
        Ok(EntryOutcome::Deleted)
    }

    fn is_eligible(&self, age: Duration) -> bool {
        self.retention_threshold.is_zero() || age > self.retention_threshold
    }

    pub(crate) fn record_error(&self, error: DeleteError) {
        log_delete_error(self.log_level, &error);
        self.history.record(error);
    }
}

enum EntryOutcome {
    Kept,
    Eligible,
    Deleted,
}

fn list_entries(directory: &Path) -> io::Result<Vec<PathBuf>> {
    let mut entries = fs::read_dir(directory)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<io::Result<Vec<_>>>()?;
    entries.sort();
    Ok(entries)
}

fn log_delete_error(level: Level, error: &DeleteError) {
    if level == Level::ERROR {
        tracing::error!("{}", error);
    } else if level == Level::WARN {
        tracing::warn!("{}", error);
    } else if level == Level::INFO {
        tracing::info!("{}", error);
    } else if level == Level::DEBUG {
        tracing::debug!("{}", error);
    } else {
        tracing::trace!("{}", error);
    }
}
