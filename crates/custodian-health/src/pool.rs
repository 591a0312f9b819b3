//! Shared worker pool for running health checks off the caller's thread

use crate::error::HealthError;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tokio::runtime::{Builder, Handle, Runtime};
use tokio::sync::watch;

/// Default number of checks that may run concurrently on a pool
pub const DEFAULT_POOL_SIZE: usize = 4;

/// Bounded worker pool shared by every [`TimeoutGuardedCheck`](crate::TimeoutGuardedCheck)
///
/// The pool owns a dedicated tokio runtime whose blocking pool is capped at
/// `size` threads. Checks beyond that queue behind whatever is running, so a
/// pool filled with hung checks starves every other guarded check until one
/// of them returns.
///
/// The pool also carries an interrupt flag. Once raised it stays raised:
/// waits in progress return immediately and later waits never start.
///
/// # Examples
///
/// ```
/// use custodian_health::CheckPool;
/// use std::time::Duration;
///
/// let pool = CheckPool::new(2).unwrap();
/// assert_eq!(pool.size(), 2);
/// pool.shutdown(Duration::from_secs(1));
/// assert!(pool.is_interrupted());
/// ```
pub struct CheckPool {
    runtime: Mutex<Option<Runtime>>,
    handle: Handle,
    interrupt: watch::Sender<bool>,
    size: usize,
}

impl CheckPool {
    /// Start a pool running at most `size` checks at once
    pub fn new(size: usize) -> Result<Self, HealthError> {
        if size == 0 {
            return Err(HealthError::Pool("pool size must be greater than 0".to_string()));
        }

        let runtime = Builder::new_multi_thread()
            .worker_threads(1)
            .max_blocking_threads(size)
            .thread_name("health-check-pool")
            .enable_time()
            .build()
            .map_err(|e| HealthError::Pool(e.to_string()))?;
        let handle = runtime.handle().clone();
        let (interrupt, _) = watch::channel(false);

        tracing::debug!("Health check pool started (size: {})", size);

        Ok(Self {
            runtime: Mutex::new(Some(runtime)),
            handle,
            interrupt,
            size,
        })
    }

    /// Maximum number of checks running concurrently
    pub fn size(&self) -> usize {
        self.size
    }

    /// Raise the interrupt flag, releasing every waiter
    pub fn interrupt(&self) {
        self.interrupt.send_replace(true);
    }

    /// Whether the interrupt flag has been raised
    pub fn is_interrupted(&self) -> bool {
        *self.interrupt.borrow()
    }

    /// Interrupt waiters and stop the pool
    ///
    /// Running checks get up to `grace` to finish; anything still running
    /// after that is abandoned.
    pub fn shutdown(&self, grace: Duration) {
        self.interrupt();
        let runtime = self
            .runtime
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(runtime) = runtime {
            runtime.shutdown_timeout(grace);
            tracing::debug!("Health check pool stopped");
        }
    }

    pub(crate) fn handle(&self) -> &Handle {
        &self.handle
    }

    pub(crate) fn interrupt_signal(&self) -> watch::Receiver<bool> {
        self.interrupt.subscribe()
    }
}

impl Drop for CheckPool {
    fn drop(&mut self) {
        let runtime = self
            .runtime
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(runtime) = runtime {
            runtime.shutdown_background();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_size_rejected() {
        assert!(matches!(CheckPool::new(0), Err(HealthError::Pool(_))));
    }

    #[test]
    fn test_interrupt_is_sticky() {
        let pool = CheckPool::new(1).unwrap();
        assert!(!pool.is_interrupted());

        pool.interrupt();
        assert!(pool.is_interrupted());

        let signal = pool.interrupt_signal();
        assert!(*signal.borrow());
    }

    #[test]
    fn test_shutdown_twice_is_harmless() {
        let pool = CheckPool::new(1).unwrap();
        pool.shutdown(Duration::from_millis(10));
        pool.shutdown(Duration::from_millis(10));
        assert!(pool.is_interrupted());
    }
}
