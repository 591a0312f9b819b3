//! Record of a single failed deletion

use chrono::{DateTime, Utc};
use std::error::Error;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// One failure to delete an entry (or to scan the directory at all)
///
/// Either carries the underlying I/O failure or nothing beyond the path;
/// there is no third shape. The timestamp is set at construction and can be
/// replaced once through [`with_timestamp`](DeleteError::with_timestamp),
/// which consumes the value. After that it is fixed.
///
/// # Examples
///
/// ```
/// use custodian_janitor::DeleteError;
/// use std::io;
///
/// let plain = DeleteError::from_path("/var/spool/tmp/a.lock");
/// assert!(plain.cause().is_none());
///
/// let failed = DeleteError::from_cause(
///     "/var/spool/tmp/b.lock",
///     io::Error::new(io::ErrorKind::PermissionDenied, "permission denied"),
/// );
/// assert_eq!(failed.cause().unwrap().kind(), io::ErrorKind::PermissionDenied);
/// ```
#[derive(Debug, Clone)]
pub struct DeleteError {
    target: PathBuf,
    cause: Option<Arc<io::Error>>,
    timestamp: DateTime<Utc>,
    retimed: bool,
}

impl DeleteError {
    /// Failure known only by the path that could not be deleted
    pub fn from_path(target: impl AsRef<Path>) -> Self {
        Self {
            target: target.as_ref().to_path_buf(),
            cause: None,
            timestamp: Utc::now(),
            retimed: false,
        }
    }

    /// Failure with the I/O error that caused it
    pub fn from_cause(target: impl AsRef<Path>, cause: io::Error) -> Self {
        Self {
            target: target.as_ref().to_path_buf(),
            cause: Some(Arc::new(cause)),
            timestamp: Utc::now(),
            retimed: false,
        }
    }

    /// Replace the timestamp, e.g. to simulate an older failure
    ///
    /// Only the first replacement takes effect; later calls return the error
    /// unchanged.
    pub fn with_timestamp(self, timestamp: DateTime<Utc>) -> Self {
        if self.retimed {
            tracing::debug!("Timestamp of delete error for {} already fixed", self.target.display());
            return self;
        }
        Self {
            timestamp,
            retimed: true,
            ..self
        }
    }

    /// Path of the entry that failed to delete
    pub fn target(&self) -> &Path {
        &self.target
    }

    /// Underlying failure, if known
    pub fn cause(&self) -> Option<&io::Error> {
        self.cause.as_deref()
    }

    /// When the failure was recorded
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

impl fmt::Display for DeleteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.cause {
            Some(cause) => write!(f, "Unable to delete {}: {}", self.target.display(), cause),
            None => write!(f, "Unable to delete {}", self.target.display()),
        }
    }
}

impl Error for DeleteError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.cause.as_deref().map(|e| e as &(dyn Error + 'static))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_from_path() {
        let err = DeleteError::from_path("/tmp/stale.dat");
        assert_eq!(err.target(), Path::new("/tmp/stale.dat"));
        assert!(err.cause().is_none());
        assert!(err.source().is_none());
        assert_eq!(err.to_string(), "Unable to delete /tmp/stale.dat");
    }

    #[test]
    fn test_from_cause() {
        let err = DeleteError::from_cause(
            "/tmp/busy.dat",
            io::Error::new(io::ErrorKind::PermissionDenied, "access denied"),
        );
        assert_eq!(err.cause().unwrap().kind(), io::ErrorKind::PermissionDenied);
        assert!(err.source().is_some());
        assert_eq!(err.to_string(), "Unable to delete /tmp/busy.dat: access denied");
    }

    #[test]
    fn test_timestamp_defaults_to_now() {
        let before = Utc::now();
        let err = DeleteError::from_path("/tmp/x");
        let after = Utc::now();

        assert!(err.timestamp() >= before && err.timestamp() <= after);
    }

    #[test]
    fn test_with_timestamp() {
        let old = Utc::now() - Duration::minutes(30);
        let err = DeleteError::from_path("/tmp/x").with_timestamp(old);
        assert_eq!(err.timestamp(), old);
        assert_eq!(err.target(), Path::new("/tmp/x"));
    }

    #[test]
    fn test_timestamp_replaced_only_once() {
        let first = Utc::now() - Duration::minutes(30);
        let second = Utc::now() - Duration::minutes(90);
        let err = DeleteError::from_cause("/tmp/x", io::Error::other("busy"))
            .with_timestamp(first)
            .with_timestamp(second);

        assert_eq!(err.timestamp(), first);
        assert!(err.cause().is_some());
    }
}
