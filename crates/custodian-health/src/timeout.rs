//! Deadline wrapper for arbitrary health checks

use crate::check::{HealthCheck, HealthResult};
use crate::error::{BoxError, GuardError};
use crate::pool::CheckPool;
use std::any::Any;
use std::future::Future;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tokio::runtime::{Handle, RuntimeFlavor};

/// Deadline applied when none is configured
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Wraps a health check so that a slow or hung delegate cannot block the poller
///
/// The delegate runs on the shared [`CheckPool`]; the caller waits at most
/// `timeout` for it. Outcomes:
///
/// - delegate answers in time: its verdict is returned unchanged
/// - delegate returns an error or panics: unhealthy, the failure retained as
///   a [`GuardError`]
/// - deadline passes: unhealthy, `"Unable to obtain result in <n> seconds"`
/// - pool interrupted while waiting: unhealthy, the interrupt flag stays set
///
/// A delegate that misses its deadline is **not** cancelled. It keeps running
/// on the pool until it finishes and its result is dropped. Hung delegates
/// therefore hold pool threads, and enough of them will starve every other
/// guarded check sharing the pool.
///
/// `check` blocks the calling thread. It is safe to call from inside a tokio
/// task: on a multi-thread runtime the worker is handed off with
/// `block_in_place`, and on a current-thread runtime the wait moves to a
/// helper thread. Async callers should still prefer `spawn_blocking`, since
/// both fallbacks hold up the caller's runtime for the duration of the wait.
pub struct TimeoutGuardedCheck {
    delegate: Arc<dyn HealthCheck>,
    pool: Arc<CheckPool>,
    timeout: Duration,
}

impl TimeoutGuardedCheck {
    /// Guard `delegate` with the default 5 second deadline
    pub fn new(delegate: Arc<dyn HealthCheck>, pool: Arc<CheckPool>) -> Self {
        Self::with_timeout(delegate, pool, DEFAULT_TIMEOUT)
    }

    /// Guard `delegate` with an explicit deadline
    pub fn with_timeout(
        delegate: Arc<dyn HealthCheck>,
        pool: Arc<CheckPool>,
        timeout: Duration,
    ) -> Self {
        Self {
            delegate,
            pool,
            timeout,
        }
    }

    /// Configured deadline
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn run_guarded(&self) -> Result<HealthResult, GuardError> {
        if self.pool.is_interrupted() {
            return Err(GuardError::Interrupted);
        }

        let delegate = Arc::clone(&self.delegate);
        let task = self.pool.handle().spawn_blocking(move || delegate.check());
        let mut interrupt = self.pool.interrupt_signal();
        let timeout = self.timeout;

        self.wait(async move {
            tokio::select! {
                joined = tokio::time::timeout(timeout, task) => match joined {
                    Ok(Ok(Ok(result))) => Ok(result),
                    Ok(Ok(Err(source))) => Err(GuardError::DelegateFailed { source }),
                    Ok(Err(join_error)) if join_error.is_panic() => {
                        Err(GuardError::DelegatePanicked(panic_message(join_error.into_panic())))
                    }
                    // cancelled by pool shutdown
                    Ok(Err(_)) => Err(GuardError::Interrupted),
                    Err(_) => Err(GuardError::TimedOut(timeout.as_secs())),
                },
                _ = interrupt.wait_for(|interrupted| *interrupted) => Err(GuardError::Interrupted),
            }
        })
    }

    // Block on the pool's runtime without nesting it inside the caller's
    fn wait<F>(&self, future: F) -> Result<HealthResult, GuardError>
    where
        F: Future<Output = Result<HealthResult, GuardError>> + Send,
    {
        let handle = self.pool.handle();
        match Handle::try_current() {
            Err(_) => handle.block_on(future),
            Ok(current) if current.runtime_flavor() == RuntimeFlavor::MultiThread => {
                tokio::task::block_in_place(|| handle.block_on(future))
            }
            // a current-thread runtime has no worker to give up
            Ok(_) => thread::scope(|scope| {
                scope
                    .spawn(|| handle.block_on(future))
                    .join()
                    .unwrap_or_else(|payload| Err(GuardError::DelegatePanicked(panic_message(payload))))
            }),
        }
    }
}

impl HealthCheck for TimeoutGuardedCheck {
    fn check(&self) -> Result<HealthResult, BoxError> {
        let result = match self.run_guarded() {
            Ok(result) => result,
            Err(e @ GuardError::DelegateFailed { .. }) | Err(e @ GuardError::DelegatePanicked(_)) => {
                tracing::debug!("Guarded health check failed: {}", e);
                HealthResult::unhealthy_with_error(e)
            }
            Err(e) => {
                tracing::debug!("Guarded health check gave no result: {}", e);
                HealthResult::unhealthy(e.to_string())
            }
        };
        Ok(result)
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    struct Fixed(HealthResult);

    impl HealthCheck for Fixed {
        fn check(&self) -> Result<HealthResult, BoxError> {
            Ok(self.0.clone())
        }
    }

    struct Slow(Duration);

    impl HealthCheck for Slow {
        fn check(&self) -> Result<HealthResult, BoxError> {
            thread::sleep(self.0);
            Ok(HealthResult::healthy())
        }
    }

    struct Failing;

    impl HealthCheck for Failing {
        fn check(&self) -> Result<HealthResult, BoxError> {
            Err("connection refused by upstream".into())
        }
    }

    struct Panicking;

    impl HealthCheck for Panicking {
        fn check(&self) -> Result<HealthResult, BoxError> {
            panic!("check exploded");
        }
    }

    fn pool() -> Arc<CheckPool> {
        Arc::new(CheckPool::new(2).unwrap())
    }

    #[test]
    fn test_default_timeout() {
        let guard = TimeoutGuardedCheck::new(Arc::new(Fixed(HealthResult::healthy())), pool());
        assert_eq!(guard.timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_passes_verdict_through_unchanged() {
        let verdict = HealthResult::healthy_with_message("all good");
        let guard = TimeoutGuardedCheck::new(Arc::new(Fixed(verdict.clone())), pool());

        let result = guard.execute();
        assert_eq!(result, verdict);
    }

    #[test]
    fn test_passes_unhealthy_verdict_through() {
        let verdict = HealthResult::unhealthy("queue backed up");
        let guard = TimeoutGuardedCheck::new(Arc::new(Fixed(verdict.clone())), pool());

        assert_eq!(guard.execute(), verdict);
    }

    #[test]
    fn test_timeout_reports_whole_seconds() {
        let guard = TimeoutGuardedCheck::with_timeout(
            Arc::new(Slow(Duration::from_millis(500))),
            pool(),
            Duration::from_millis(100),
        );

        let result = guard.execute();
        assert!(!result.is_healthy());
        assert_eq!(result.message(), Some("Unable to obtain result in 0 seconds"));
        assert!(result.error().is_none());
    }

    #[test]
    fn test_delegate_error_is_retained() {
        let guard = TimeoutGuardedCheck::new(Arc::new(Failing), pool());

        let result = guard.execute();
        assert!(!result.is_healthy());
        assert!(result
            .message()
            .unwrap()
            .contains("connection refused by upstream"));

        let error = result.error().expect("error should be retained");
        let guard_error = error.downcast_ref::<GuardError>().unwrap();
        assert!(matches!(guard_error, GuardError::DelegateFailed { .. }));
        assert!(std::error::Error::source(guard_error).is_some());
    }

    #[test]
    fn test_delegate_panic_is_unhealthy() {
        let guard = TimeoutGuardedCheck::new(Arc::new(Panicking), pool());

        let result = guard.execute();
        assert!(!result.is_healthy());
        assert!(result.message().unwrap().contains("check exploded"));
        let error = result.error().unwrap();
        assert!(matches!(
            error.downcast_ref::<GuardError>(),
            Some(GuardError::DelegatePanicked(_))
        ));
    }

    #[test]
    fn test_interrupt_releases_waiter() {
        let pool = pool();
        let guard = TimeoutGuardedCheck::with_timeout(
            Arc::new(Slow(Duration::from_secs(2))),
            Arc::clone(&pool),
            Duration::from_secs(30),
        );

        let interrupter = {
            let pool = Arc::clone(&pool);
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(100));
                pool.interrupt();
            })
        };

        let result = guard.execute();
        interrupter.join().unwrap();

        assert!(!result.is_healthy());
        assert_eq!(
            result.message(),
            Some("Unable to obtain result due to process being interrupted")
        );
        // the flag is not consumed by the waiter
        assert!(pool.is_interrupted());
    }

    #[test]
    fn test_interrupted_pool_short_circuits() {
        let pool = pool();
        pool.interrupt();
        let guard = TimeoutGuardedCheck::new(Arc::new(Fixed(HealthResult::healthy())), pool);

        let result = guard.execute();
        assert!(!result.is_healthy());
        assert_eq!(
            result.message(),
            Some("Unable to obtain result due to process being interrupted")
        );
    }

    #[tokio::test]
    async fn test_check_from_current_thread_runtime() {
        let verdict = HealthResult::healthy_with_message("reachable");
        let guard = TimeoutGuardedCheck::new(Arc::new(Fixed(verdict.clone())), pool());

        assert_eq!(guard.execute(), verdict);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_check_from_multi_thread_runtime() {
        let verdict = HealthResult::unhealthy("queue backed up");
        let guard = TimeoutGuardedCheck::new(Arc::new(Fixed(verdict.clone())), pool());
        assert_eq!(guard.execute(), verdict);

        let slow = TimeoutGuardedCheck::with_timeout(
            Arc::new(Slow(Duration::from_millis(500))),
            pool(),
            Duration::from_millis(100),
        );
        assert_eq!(
            slow.execute().message(),
            Some("Unable to obtain result in 0 seconds")
        );
    }

    #[test]
    fn test_shut_down_pool_is_interrupted() {
        let pool = pool();
        pool.shutdown(Duration::from_millis(10));
        let guard = TimeoutGuardedCheck::new(Arc::new(Fixed(HealthResult::healthy())), pool);

        assert!(!guard.execute().is_healthy());
    }
}
