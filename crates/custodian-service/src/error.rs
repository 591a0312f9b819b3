//! Error types for the cleanup service

use custodian_health::HealthError;
use custodian_janitor::JanitorError;
use thiserror::Error;

/// Errors raised while configuring or starting the service
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse config TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Cleanup job could not be built
    #[error(transparent)]
    Janitor(#[from] JanitorError),

    /// Health check registration or pool failure
    #[error(transparent)]
    Health(#[from] HealthError),
}
