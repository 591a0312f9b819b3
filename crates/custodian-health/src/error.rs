//! Error types for health check operations

use thiserror::Error;

/// Boxed error returned by a failing health check
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors raised by the registry and the check pool
#[derive(Error, Debug)]
pub enum HealthError {
    /// A check is already registered under this name
    #[error("Health check already registered: {0}")]
    DuplicateName(String),

    /// No check is registered under this name
    #[error("Health check not found: {0}")]
    NotFound(String),

    /// The worker pool could not be built
    #[error("Check pool error: {0}")]
    Pool(String),
}

/// Failures synthesized by [`TimeoutGuardedCheck`](crate::TimeoutGuardedCheck)
///
/// Retained on the unhealthy [`HealthResult`](crate::HealthResult) so callers can tell
/// a failing delegate apart from one that never answered.
#[derive(Error, Debug)]
pub enum GuardError {
    /// The delegate returned an error; the message is the delegate's own
    #[error("{source}")]
    DelegateFailed {
        /// Error returned by the delegate
        #[source]
        source: BoxError,
    },

    /// The delegate panicked while running on the pool
    #[error("Health check panicked: {0}")]
    DelegatePanicked(String),

    /// No result within the deadline (whole seconds)
    #[error("Unable to obtain result in {0} seconds")]
    TimedOut(u64),

    /// The pool was interrupted while waiting
    #[error("Unable to obtain result due to process being interrupted")]
    Interrupted,
}
