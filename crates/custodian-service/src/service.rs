//! Scheduling adapter: runs cleanup workers and polls their health checks

use crate::config::ServiceConfig;
use crate::ServiceError;
use custodian_health::{CheckPool, HealthCheck, HealthCheckRegistry, HealthResult, TimeoutGuardedCheck};
use custodian_janitor::{CleanerConfig, CleanerHealthCheck, CleanupWorker, DirectoryCleaner};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

/// Owns the cleanup workers, the health check registry and the check pool
///
/// Each scheduled job gets its own worker task; a worker never runs two
/// cycles of its cleaner at once. Each cleaner's health check is registered
/// as `"DirectoryCleaner(<directory_path>)"`, guarded by a deadline on the
/// shared pool.
///
/// Must be created inside a tokio runtime.
pub struct CleanupService {
    registry: Arc<HealthCheckRegistry>,
    pool: Arc<CheckPool>,
    default_timeout: Duration,
    shutdown_tx: watch::Sender<bool>,
    tasks: Vec<JoinHandle<()>>,
    cleaners: Vec<Arc<DirectoryCleaner>>,
}

impl CleanupService {
    /// Create a service with no jobs around an existing registry and pool
    pub fn new(registry: Arc<HealthCheckRegistry>, pool: Arc<CheckPool>, default_timeout: Duration) -> Self {
        let (shutdown_tx, _) = watch::channel(false);
        Self {
            registry,
            pool,
            default_timeout,
            shutdown_tx,
            tasks: Vec::new(),
            cleaners: Vec::new(),
        }
    }

    /// Build the pool, schedule every configured job and start the health poller
    pub fn start(config: &ServiceConfig) -> Result<Self, ServiceError> {
        config.validate()?;

        let pool = Arc::new(CheckPool::new(config.health.pool_size)?);
        let registry = Arc::new(HealthCheckRegistry::new());
        let mut service = Self::new(registry, pool, config.health.default_timeout);

        for job in &config.cleanup_jobs {
            service.schedule(job)?;
        }
        service.start_health_poller(config.health.poll_interval);

        tracing::info!(
            "Cleanup service started with {} job(s), health pool size {}",
            service.cleaners.len(),
            config.health.pool_size
        );
        Ok(service)
    }

    /// Schedule one cleanup job and register its health check
    pub fn schedule(&mut self, config: &CleanerConfig) -> Result<Arc<DirectoryCleaner>, ServiceError> {
        let worker = CleanupWorker::from_config(config)?;
        let cleaner = Arc::clone(worker.cleaner());

        let check: Arc<dyn HealthCheck> = Arc::new(CleanerHealthCheck::new(
            Arc::clone(&cleaner),
            config.health_check_warning_window,
        ));
        let timeout = config.health_check_timeout.unwrap_or(self.default_timeout);
        let guarded = TimeoutGuardedCheck::with_timeout(check, Arc::clone(&self.pool), timeout);

        let name = health_check_name(&config.directory_path);
        self.registry.register(name.clone(), Arc::new(guarded))?;

        tracing::info!(
            "Scheduled {} to clean {} every {:?} after {:?} (retention: {:?})",
            cleaner_type_name(),
            config.directory_path,
            config.interval,
            config.initial_delay,
            config.retention_threshold
        );
        tracing::info!(
            "Registered health check {} (warning window: {:?}, timeout: {:?})",
            name,
            config.health_check_warning_window,
            timeout
        );

        let shutdown = self.shutdown_tx.subscribe();
        self.tasks
            .push(tokio::spawn(async move { worker.run(shutdown).await }));
        self.cleaners.push(Arc::clone(&cleaner));
        Ok(cleaner)
    }

    /// Evaluate every registered check every `interval`, logging failures
    pub fn start_health_poller(&mut self, interval: Duration) {
        let registry = Arc::clone(&self.registry);
        let mut shutdown = self.shutdown_tx.subscribe();

        self.tasks.push(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        for (name, result) in run_checks(&registry).await {
                            if result.is_healthy() {
                                tracing::debug!("Health check {}: {}", name, result);
                            } else {
                                tracing::warn!("Health check {}: {}", name, result);
                            }
                        }
                    }
                    _ = shutdown.changed() => break,
                }
            }
            tracing::debug!("Health poller stopped");
        }));
    }

    /// Evaluate all health checks now
    pub async fn health_report(&self) -> BTreeMap<String, HealthResult> {
        run_checks(&self.registry).await
    }

    /// The registry the service registers its checks with
    pub fn registry(&self) -> &Arc<HealthCheckRegistry> {
        &self.registry
    }

    /// Cleaners of every scheduled job, in scheduling order
    pub fn cleaners(&self) -> &[Arc<DirectoryCleaner>] {
        &self.cleaners
    }

    /// Stop all workers and the poller, then shut the check pool down
    ///
    /// Tasks still running after `grace` are aborted.
    pub async fn shutdown(self, grace: Duration) {
        tracing::info!("Shutting down cleanup service (grace period: {:?})", grace);
        self.shutdown_tx.send_replace(true);

        let deadline = Instant::now() + grace;
        for mut task in self.tasks {
            if tokio::time::timeout_at(deadline, &mut task).await.is_err() {
                tracing::warn!("Task did not stop within the grace period, aborting");
                task.abort();
            }
        }

        let pool = Arc::clone(&self.pool);
        if let Err(e) = tokio::task::spawn_blocking(move || pool.shutdown(grace)).await {
            tracing::error!("Health check pool shutdown failed: {}", e);
        }
        tracing::info!("Cleanup service stopped");
    }
}

/// Registry name for the health check of the cleaner of `directory_path`
pub fn health_check_name(directory_path: &str) -> String {
    format!("{}({})", cleaner_type_name(), directory_path)
}

fn cleaner_type_name() -> &'static str {
    let full = std::any::type_name::<DirectoryCleaner>();
    full.rsplit("::").next().unwrap_or(full)
}

// guarded checks block, so they run on the blocking pool
async fn run_checks(registry: &Arc<HealthCheckRegistry>) -> BTreeMap<String, HealthResult> {
    let registry = Arc::clone(registry);
    match tokio::task::spawn_blocking(move || registry.run_health_checks_concurrently()).await {
        Ok(results) => results,
        Err(e) => {
            tracing::error!("Health check run failed: {}", e);
            BTreeMap::new()
        }
    }
}
