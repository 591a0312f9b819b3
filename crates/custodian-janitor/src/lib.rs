//! Custodian Janitor
//!
//! Self-monitoring background cleanup of stale directory entries.
//!
//! # Overview
//!
//! The Janitor is responsible for:
//! - **Cleanup**: deleting entries whose last modification is older than a
//!   retention threshold, one directory per [`DirectoryCleaner`]
//! - **Failure tracking**: recording every failed deletion as a
//!   [`DeleteError`] in a bounded history, plus a lifetime total
//! - **Health reporting**: [`CleanerHealthCheck`] turns recent failures into
//!   a healthy/unhealthy verdict
//! - **Scheduling**: [`CleanupWorker`] drives a cleaner with a fixed delay
//!
//! # Error history
//!
//! Recent errors live in a fixed-capacity ring buffer (default 500 entries,
//! `max_recent_errors`). When full, the oldest error is evicted. Size it so
//! that it can hold every failure expected within the health check's warning
//! window; errors evicted early are still counted in the total but can no
//! longer make the check unhealthy.
//!
//! # Usage
//!
//! ## One-time Cycle
//!
//! ```no_run
//! use custodian_janitor::{CleanerHealthCheck, DirectoryCleaner};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let cleaner = Arc::new(DirectoryCleaner::new("/var/spool/uploads", Duration::from_secs(86_400))?);
//! cleaner.run_cycle();
//!
//! let check = CleanerHealthCheck::new(Arc::clone(&cleaner), Duration::from_secs(3600));
//! println!("{}", check.evaluate());
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration
//!
//! A cleanup job can be configured via TOML:
//!
//! ```toml
//! directory_path = "/var/spool/uploads"
//! retention_threshold = "1day"
//! initial_delay = "1s"
//! interval = "10m"
//! health_check_warning_window = "1h"
//! delete_error_log_level = "WARN"
//! max_recent_errors = 500
//! dry_run = false
//! ```

#![warn(missing_docs)]

mod cleaner;
mod config;
mod delete_error;
mod error;
mod format;
mod health;
mod history;
mod metrics;
mod worker;

pub use cleaner::DirectoryCleaner;
pub use config::CleanerConfig;
pub use delete_error::DeleteError;
pub use error::JanitorError;
pub use format::human_duration;
pub use health::CleanerHealthCheck;
pub use history::{ErrorHistory, DEFAULT_MAX_RECENT_ERRORS};
pub use metrics::{CleanerMetrics, MetricsSnapshot};
pub use worker::CleanupWorker;
