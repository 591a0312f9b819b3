//! Health check trait and verdict type
//!
//! These define the boundary between things that can report their own health
//! (cleaners, pools, stores) and whatever polls them.

use crate::error::BoxError;
use std::error::Error;
use std::fmt;
use std::sync::Arc;

/// Healthy/unhealthy verdict produced by a health check
///
/// Equality compares the verdict, the message and the identity of the retained
/// error, so a result passed through unchanged compares equal to the original.
#[derive(Clone)]
pub struct HealthResult {
    healthy: bool,
    message: Option<String>,
    error: Option<Arc<dyn Error + Send + Sync + 'static>>,
}

impl HealthResult {
    /// Healthy verdict without a message
    pub fn healthy() -> Self {
        Self {
            healthy: true,
            message: None,
            error: None,
        }
    }

    /// Healthy verdict with a message
    pub fn healthy_with_message(message: impl Into<String>) -> Self {
        Self {
            healthy: true,
            message: Some(message.into()),
            error: None,
        }
    }

    /// Unhealthy verdict with a message
    pub fn unhealthy(message: impl Into<String>) -> Self {
        Self {
            healthy: false,
            message: Some(message.into()),
            error: None,
        }
    }

    /// Unhealthy verdict whose message is taken from `error`, which is retained
    ///
    /// # Examples
    ///
    /// ```
    /// use custodian_health::HealthResult;
    ///
    /// let err = std::io::Error::new(std::io::ErrorKind::Other, "disk on fire");
    /// let result = HealthResult::unhealthy_with_error(err);
    /// assert!(!result.is_healthy());
    /// assert_eq!(result.message(), Some("disk on fire"));
    /// assert!(result.error().is_some());
    /// ```
    pub fn unhealthy_with_error<E>(error: E) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        Self {
            healthy: false,
            message: Some(error.to_string()),
            error: Some(Arc::new(error)),
        }
    }

    /// Unhealthy verdict retaining an already boxed error
    pub fn unhealthy_with_boxed(error: BoxError) -> Self {
        Self {
            healthy: false,
            message: Some(error.to_string()),
            error: Some(Arc::from(error)),
        }
    }

    /// Whether the check passed
    pub fn is_healthy(&self) -> bool {
        self.healthy
    }

    /// Message attached to the verdict, if any
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Error retained for diagnostics, if any
    pub fn error(&self) -> Option<&(dyn Error + Send + Sync + 'static)> {
        self.error.as_deref()
    }
}

impl PartialEq for HealthResult {
    fn eq(&self, other: &Self) -> bool {
        let same_error = match (&self.error, &other.error) {
            (None, None) => true,
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            _ => false,
        };
        self.healthy == other.healthy && self.message == other.message && same_error
    }
}

impl fmt::Debug for HealthResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HealthResult")
            .field("healthy", &self.healthy)
            .field("message", &self.message)
            .field("error", &self.error.as_ref().map(|e| e.to_string()))
            .finish()
    }
}

impl fmt::Display for HealthResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = if self.healthy { "healthy" } else { "unhealthy" };
        match &self.message {
            Some(message) => write!(f, "{}: {}", status, message),
            None => f.write_str(status),
        }
    }
}

/// Something that can evaluate its own health
///
/// Implementations return `Err` for failures they cannot turn into a verdict
/// themselves; [`execute`](HealthCheck::execute) folds those into an unhealthy
/// result.
pub trait HealthCheck: Send + Sync {
    /// Evaluate the check
    fn check(&self) -> Result<HealthResult, BoxError>;

    /// Evaluate the check, converting an error into an unhealthy verdict
    fn execute(&self) -> HealthResult {
        match self.check() {
            Ok(result) => result,
            Err(e) => HealthResult::unhealthy_with_boxed(e),
        }
    }
}
