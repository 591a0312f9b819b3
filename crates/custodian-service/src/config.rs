//! Configuration file parsing for the service.
//!
//! Loads the cleanup jobs and health polling settings from TOML.

use crate::ServiceError;
use custodian_health::{DEFAULT_POOL_SIZE, DEFAULT_TIMEOUT};
use custodian_janitor::CleanerConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Service configuration loaded from TOML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Directories to clean, one scheduled job each
    #[serde(default)]
    pub cleanup_jobs: Vec<CleanerConfig>,

    /// Health polling settings
    #[serde(default)]
    pub health: HealthConfig,

    /// How long shutdown waits for running cycles and checks (default: 5s)
    #[serde(with = "humantime_serde", default = "default_shutdown_grace_period")]
    pub shutdown_grace_period: Duration,
}

/// Health polling configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthConfig {
    /// Checks that may run at once on the shared pool (default: 4)
    #[serde(default = "default_pool_size")]
    pub pool_size: usize,

    /// How often every registered check is evaluated (default: 30s)
    #[serde(with = "humantime_serde", default = "default_poll_interval")]
    pub poll_interval: Duration,

    /// Deadline for guarded checks that set none of their own (default: 5s)
    #[serde(with = "humantime_serde", default = "default_timeout")]
    pub default_timeout: Duration,
}

fn default_shutdown_grace_period() -> Duration {
    Duration::from_secs(5)
}

fn default_pool_size() -> usize {
    DEFAULT_POOL_SIZE
}

fn default_poll_interval() -> Duration {
    Duration::from_secs(30)
}

fn default_timeout() -> Duration {
    DEFAULT_TIMEOUT
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            pool_size: default_pool_size(),
            poll_interval: default_poll_interval(),
            default_timeout: default_timeout(),
        }
    }
}

impl ServiceConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ServiceError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse and validate configuration from a TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, ServiceError> {
        let config: ServiceConfig = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate every job and the health settings
    pub fn validate(&self) -> Result<(), ServiceError> {
        if self.health.pool_size == 0 {
            return Err(ServiceError::Config("health.pool_size must be greater than 0".to_string()));
        }
        if self.health.poll_interval.is_zero() {
            return Err(ServiceError::Config(
                "health.poll_interval must be greater than 0".to_string(),
            ));
        }
        if self.health.default_timeout.is_zero() {
            return Err(ServiceError::Config(
                "health.default_timeout must be greater than 0".to_string(),
            ));
        }

        for job in &self.cleanup_jobs {
            job.validate()?;
        }

        let mut paths: Vec<&str> = self.cleanup_jobs.iter().map(|j| j.directory_path.as_str()).collect();
        paths.sort_unstable();
        if let Some(dup) = paths.windows(2).find(|w| w[0] == w[1]) {
            return Err(ServiceError::Config(format!(
                "directory scheduled more than once: {}",
                dup[0]
            )));
        }

        Ok(())
    }
}
