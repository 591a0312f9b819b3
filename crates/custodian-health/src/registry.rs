//! Named registry of health checks polled by a monitor

use crate::check::{HealthCheck, HealthResult};
use crate::error::HealthError;
use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};
use std::thread;

/// Registry of health checks keyed by name
///
/// Checks are evaluated in name order. Evaluation happens outside the
/// registry lock so a slow check never blocks registration.
///
/// # Examples
///
/// ```
/// use custodian_health::{BoxError, HealthCheck, HealthCheckRegistry, HealthResult};
/// use std::sync::Arc;
///
/// struct AlwaysUp;
///
/// impl HealthCheck for AlwaysUp {
///     fn check(&self) -> Result<HealthResult, BoxError> {
///         Ok(HealthResult::healthy())
///     }
/// }
///
/// let registry = HealthCheckRegistry::new();
/// registry.register("always-up", Arc::new(AlwaysUp)).unwrap();
///
/// let results = registry.run_health_checks();
/// assert!(results["always-up"].is_healthy());
/// ```
#[derive(Default)]
pub struct HealthCheckRegistry {
    checks: RwLock<BTreeMap<String, Arc<dyn HealthCheck>>>,
}

impl HealthCheckRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a check under `name`
    pub fn register(
        &self,
        name: impl Into<String>,
        check: Arc<dyn HealthCheck>,
    ) -> Result<(), HealthError> {
        let name = name.into();
        let mut checks = self.checks.write().unwrap_or_else(PoisonError::into_inner);

        if checks.contains_key(&name) {
            return Err(HealthError::DuplicateName(name));
        }

        tracing::debug!("Registered health check {}", name);
        checks.insert(name, check);
        Ok(())
    }

    /// Remove the check registered under `name`
    pub fn unregister(&self, name: &str) -> Result<(), HealthError> {
        self.checks
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| HealthError::NotFound(name.to_string()))
    }

    /// Names of all registered checks, sorted
    pub fn names(&self) -> Vec<String> {
        self.checks
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect()
    }

    /// Number of registered checks
    pub fn len(&self) -> usize {
        self.checks.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Whether no checks are registered
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Evaluate a single check by name
    pub fn run_health_check(&self, name: &str) -> Result<HealthResult, HealthError> {
        let check = self
            .checks
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
            .ok_or_else(|| HealthError::NotFound(name.to_string()))?;

        Ok(check.execute())
    }

    /// Evaluate every registered check, one after another
    ///
    /// A pass takes as long as all checks together: N guarded checks that
    /// each hit their deadline hold the caller for N deadlines. Use
    /// [`run_health_checks_concurrently`](Self::run_health_checks_concurrently)
    /// to bound a pass by the slowest check instead.
    pub fn run_health_checks(&self) -> BTreeMap<String, HealthResult> {
        self.snapshot()
            .into_iter()
            .map(|(name, check)| {
                let result = check.execute();
                (name, result)
            })
            .collect()
    }

    /// Evaluate every registered check, each on its own scoped thread
    ///
    /// Returns once the slowest check has answered.
    pub fn run_health_checks_concurrently(&self) -> BTreeMap<String, HealthResult> {
        let snapshot = self.snapshot();

        thread::scope(|scope| {
            let running: Vec<_> = snapshot
                .iter()
                .map(|(name, check)| (name, scope.spawn(move || check.execute())))
                .collect();

            running
                .into_iter()
                .map(|(name, handle)| {
                    let result = handle.join().unwrap_or_else(|_| {
                        HealthResult::unhealthy(format!("Health check {} panicked", name))
                    });
                    (name.clone(), result)
                })
                .collect()
        })
    }

    fn snapshot(&self) -> Vec<(String, Arc<dyn HealthCheck>)> {
        self.checks
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(name, check)| (name.clone(), Arc::clone(check)))
            .collect()
    }
}
