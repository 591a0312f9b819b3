//! Counters collected across cleanup cycles

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters updated by the cleanup worker and readable from anywhere
///
/// Tracks completed cycles, deleted entries and (in dry-run mode) entries
/// that would have been deleted. Counters only ever increase.
#[derive(Debug, Default)]
pub struct CleanerMetrics {
    cycles: AtomicU64,
    deleted: AtomicU64,
    would_delete: AtomicU64,
}

/// Point-in-time copy of [`CleanerMetrics`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    /// Completed cleanup cycles
    pub cycles: u64,

    /// Entries deleted
    pub deleted: u64,

    /// Entries skipped because of dry-run mode
    pub would_delete: u64,

    /// Delete errors recorded
    pub errors: u64,
}

impl CleanerMetrics {
    /// Create zeroed counters
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a cycle completion
    pub fn record_cycle(&self) {
        self.cycles.fetch_add(1, Ordering::Relaxed);
    }

    /// Record deleted entries
    pub fn record_deletions(&self, count: u64) {
        self.deleted.fetch_add(count, Ordering::Relaxed);
    }

    /// Record entries left in place by dry-run mode
    pub fn record_dry_run(&self, count: u64) {
        self.would_delete.fetch_add(count, Ordering::Relaxed);
    }

    /// Completed cycles
    pub fn cycles(&self) -> u64 {
        self.cycles.load(Ordering::Relaxed)
    }

    /// Deleted entries
    pub fn deleted(&self) -> u64 {
        self.deleted.load(Ordering::Relaxed)
    }

    /// Entries skipped by dry-run mode
    pub fn would_delete(&self) -> u64 {
        self.would_delete.load(Ordering::Relaxed)
    }

    /// Copy the counters, pairing them with the cleaner's error total
    pub fn snapshot(&self, errors: u64) -> MetricsSnapshot {
        MetricsSnapshot {
            cycles: self.cycles(),
            deleted: self.deleted(),
            would_delete: self.would_delete(),
            errors,
        }
    }
}

impl MetricsSnapshot {
    /// Generate a summary report
    pub fn summary(&self) -> String {
        let mut lines = vec![
            "Cleaner Metrics Summary".to_string(),
            "=======================".to_string(),
            format!("Cleanup cycles: {}", self.cycles),
            format!("Entries deleted: {}", self.deleted),
        ];

        if self.would_delete > 0 {
            lines.push(format!("Entries kept (dry run): {}", self.would_delete));
        }

        lines.push(format!("Delete errors: {}", self.errors));
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_creation() {
        let metrics = CleanerMetrics::new();
        assert_eq!(metrics.cycles(), 0);
        assert_eq!(metrics.deleted(), 0);
        assert_eq!(metrics.would_delete(), 0);
    }

    #[test]
    fn test_counters_accumulate() {
        let metrics = CleanerMetrics::new();
        metrics.record_cycle();
        metrics.record_cycle();
        metrics.record_deletions(5);
        metrics.record_deletions(2);
        metrics.record_dry_run(3);

        let snapshot = metrics.snapshot(4);
        assert_eq!(
            snapshot,
            MetricsSnapshot {
                cycles: 2,
                deleted: 7,
                would_delete: 3,
                errors: 4,
            }
        );
    }

    #[test]
    fn test_summary() {
        let metrics = CleanerMetrics::new();
        metrics.record_cycle();
        metrics.record_deletions(5);

        let summary = metrics.snapshot(1).summary();
        assert!(summary.contains("Cleanup cycles: 1"));
        assert!(summary.contains("Entries deleted: 5"));
        assert!(summary.contains("Delete errors: 1"));
        assert!(!summary.contains("dry run"));
    }

    #[test]
    fn test_summary_mentions_dry_run() {
        let metrics = CleanerMetrics::new();
        metrics.record_dry_run(2);
        assert!(metrics.snapshot(0).summary().contains("Entries kept (dry run): 2"));
    }
}
