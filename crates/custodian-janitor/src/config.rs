//! Configuration for a directory cleanup job
//!
//! Defines the directory to clean, the retention threshold, the schedule and
//! the health check window.

use crate::history::DEFAULT_MAX_RECENT_ERRORS;
use crate::JanitorError;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::Level;

/// Configuration for one directory cleanup job
///
/// Durations are written in humantime form (`"30s"`, `"1h"`, `"7days"`).
///
/// # Examples
///
/// ```
/// use custodian_janitor::CleanerConfig;
/// use std::time::Duration;
///
/// let config = CleanerConfig::new("/var/spool/uploads", Duration::from_secs(3600), Duration::from_secs(300));
/// assert_eq!(config.initial_delay, Duration::from_secs(1));
/// assert_eq!(config.health_check_warning_window, Duration::from_secs(3600));
/// assert_eq!(config.delete_error_log_level, "WARN");
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleanerConfig {
    /// Directory whose entries are cleaned
    pub directory_path: String,

    /// Entries last modified longer ago than this are deleted
    #[serde(with = "humantime_serde")]
    pub retention_threshold: Duration,

    /// Delay before the first cycle
    /// Default: 1 second
    #[serde(with = "humantime_serde", default = "default_initial_delay")]
    pub initial_delay: Duration,

    /// Delay between the end of one cycle and the start of the next
    #[serde(with = "humantime_serde")]
    pub interval: Duration,

    /// Look-back window for the health check
    /// Default: 1 hour
    #[serde(with = "humantime_serde", default = "default_warning_window")]
    pub health_check_warning_window: Duration,

    /// Severity used when logging delete failures
    /// Default: "WARN"
    #[serde(default = "default_log_level")]
    pub delete_error_log_level: String,

    /// Number of delete errors retained for the health check
    /// Default: 500
    #[serde(default = "default_max_recent_errors")]
    pub max_recent_errors: usize,

    /// Dry-run mode: log what would be deleted without deleting
    /// Default: false
    #[serde(default)]
    pub dry_run: bool,

    /// Deadline for the registered health check; the service default applies when absent
    #[serde(with = "humantime_serde", default)]
    pub health_check_timeout: Option<Duration>,
}

fn default_initial_delay() -> Duration {
    Duration::from_secs(1)
}

fn default_warning_window() -> Duration {
    Duration::from_secs(3600)
}

fn default_log_level() -> String {
    "WARN".to_string()
}

fn default_max_recent_errors() -> usize {
    DEFAULT_MAX_RECENT_ERRORS
}

impl CleanerConfig {
    /// Configuration with the required fields set and defaults elsewhere
    pub fn new(directory_path: impl Into<String>, retention_threshold: Duration, interval: Duration) -> Self {
        Self {
            directory_path: directory_path.into(),
            retention_threshold,
            initial_delay: default_initial_delay(),
            interval,
            health_check_warning_window: default_warning_window(),
            delete_error_log_level: default_log_level(),
            max_recent_errors: default_max_recent_errors(),
            dry_run: false,
            health_check_timeout: None,
        }
    }

    /// Parse the delete-error log level
    pub fn log_level(&self) -> Result<Level, JanitorError> {
        parse_level(&self.delete_error_log_level)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), JanitorError> {
        if self.directory_path.trim().is_empty() {
            return Err(JanitorError::Config("directory_path must not be blank".to_string()));
        }
        if self.interval.is_zero() {
            return Err(JanitorError::Config("interval must be greater than 0".to_string()));
        }
        if self.max_recent_errors == 0 {
            return Err(JanitorError::Config(
                "max_recent_errors must be greater than 0".to_string(),
            ));
        }
        if matches!(self.health_check_timeout, Some(t) if t.is_zero()) {
            return Err(JanitorError::Config(
                "health_check_timeout must be greater than 0".to_string(),
            ));
        }
        self.log_level()?;
        Ok(())
    }
}

/// Parse a standard severity name, case-insensitively
///
/// Only names are accepted; the numeric forms `tracing` also parses are not.
pub(crate) fn parse_level(name: &str) -> Result<Level, JanitorError> {
    let trimmed = name.trim();
    if !trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(JanitorError::InvalidLogLevel(name.to_string()));
    }
    trimmed
        .parse::<Level>()
        .map_err(|_| JanitorError::InvalidLogLevel(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> CleanerConfig {
        CleanerConfig::new("/tmp/uploads", Duration::from_secs(60), Duration::from_secs(30))
    }

    #[test]
    fn test_defaults() {
        let config = config();
        assert_eq!(config.initial_delay, Duration::from_secs(1));
        assert_eq!(config.health_check_warning_window, Duration::from_secs(3600));
        assert_eq!(config.delete_error_log_level, "WARN");
        assert_eq!(config.max_recent_errors, 500);
        assert!(!config.dry_run);
        assert!(config.health_check_timeout.is_none());
        assert_eq!(config.log_level().unwrap(), Level::WARN);
    }

    #[test]
    fn test_blank_path_rejected() {
        let mut config = config();
        config.directory_path = "   ".to_string();
        assert!(matches!(config.validate(), Err(JanitorError::Config(_))));
    }

    #[test]
    fn test_zero_interval_rejected() {
        let mut config = config();
        config.interval = Duration::ZERO;
        assert!(matches!(config.validate(), Err(JanitorError::Config(_))));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut config = config();
        config.health_check_timeout = Some(Duration::ZERO);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_log_levels() {
        for (name, level) in [
            ("trace", Level::TRACE),
            ("DEBUG", Level::DEBUG),
            ("Info", Level::INFO),
            ("WARN", Level::WARN),
            ("error", Level::ERROR),
        ] {
            assert_eq!(parse_level(name).unwrap(), level);
        }

        let mut config = config();
        config.delete_error_log_level = "LOUD".to_string();
        assert!(matches!(config.validate(), Err(JanitorError::InvalidLogLevel(_))));
    }

    #[test]
    fn test_numeric_log_levels_rejected() {
        for name in ["1", "3", "5", "0", ""] {
            assert!(
                matches!(parse_level(name), Err(JanitorError::InvalidLogLevel(_))),
                "{:?} should be rejected",
                name
            );
        }
    }

    #[test]
    fn test_parse_toml() {
        let toml = r#"
            directory_path = "/var/tmp/exports"
            retention_threshold = "7days"
            interval = "15m"
            delete_error_log_level = "ERROR"
            health_check_timeout = "2s"
        "#;

        let config: CleanerConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.directory_path, "/var/tmp/exports");
        assert_eq!(config.retention_threshold, Duration::from_secs(7 * 86_400));
        assert_eq!(config.interval, Duration::from_secs(15 * 60));
        assert_eq!(config.initial_delay, Duration::from_secs(1));
        assert_eq!(config.health_check_warning_window, Duration::from_secs(3600));
        assert_eq!(config.health_check_timeout, Some(Duration::from_secs(2)));
        assert_eq!(config.log_level().unwrap(), Level::ERROR);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_required_field() {
        let toml = r#"
            directory_path = "/var/tmp/exports"
            interval = "15m"
        "#;
        assert!(toml::from_str::<CleanerConfig>(toml).is_err());
    }
}
