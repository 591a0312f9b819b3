//! Error types for Janitor operations

use thiserror::Error;

/// Errors that can occur while setting up a cleanup job
///
/// Failures during a cleanup cycle are never returned; they are recorded as
/// [`DeleteError`](crate::DeleteError)s instead.
#[derive(Error, Debug)]
pub enum JanitorError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Unrecognised log level name
    #[error("Invalid log level: {0}")]
    InvalidLogLevel(String),

    /// Worker error (tokio runtime issues)
    #[error("Worker error: {0}")]
    Worker(String),
}
