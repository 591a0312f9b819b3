//! Background worker for continuous cleanup

use crate::{CleanerConfig, DirectoryCleaner, JanitorError};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::time::{sleep, sleep_until, Duration, Instant};

/// Background worker that runs a [`DirectoryCleaner`] with a fixed delay
///
/// Waits `initial_delay`, then runs a cycle, waits `interval` after the cycle
/// returns, and repeats. The next cycle is only scheduled once the previous
/// one has finished, so cycles of the same cleaner never overlap. Cycles run
/// on tokio's blocking pool because they do filesystem I/O.
///
/// # Examples
///
/// ```no_run
/// use custodian_janitor::{CleanerConfig, CleanupWorker};
/// use std::time::Duration;
/// use tokio::sync::watch;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = CleanerConfig::new("/var/spool/uploads", Duration::from_secs(3600), Duration::from_secs(60));
///     let worker = CleanupWorker::from_config(&config)?;
///
///     let (shutdown_tx, shutdown_rx) = watch::channel(false);
///     let handle = tokio::spawn(async move { worker.run(shutdown_rx).await });
///
///     tokio::signal::ctrl_c().await?;
///     shutdown_tx.send(true)?;
///     handle.await?;
///     Ok(())
/// }
/// ```
pub struct CleanupWorker {
    cleaner: Arc<DirectoryCleaner>,
    initial_delay: Duration,
    interval: Duration,
}

impl CleanupWorker {
    /// Create a worker for an existing cleaner
    pub fn new(cleaner: Arc<DirectoryCleaner>, initial_delay: Duration, interval: Duration) -> Self {
        Self {
            cleaner,
            initial_delay,
            interval,
        }
    }

    /// Build the cleaner and worker described by `config`
    pub fn from_config(config: &CleanerConfig) -> Result<Self, JanitorError> {
        let cleaner = Arc::new(DirectoryCleaner::from_config(config)?);
        Ok(Self::new(cleaner, config.initial_delay, config.interval))
    }

    /// The cleaner this worker drives
    pub fn cleaner(&self) -> &Arc<DirectoryCleaner> {
        &self.cleaner
    }

    /// Run until `shutdown` carries `true` (or its sender is dropped)
    ///
    /// A cycle already in progress is allowed to finish.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        tracing::info!(
            "Cleanup worker started for {} (initial delay: {:?}, interval: {:?})",
            self.cleaner.directory().display(),
            self.initial_delay,
            self.interval
        );

        let mut next_cycle = Instant::now() + self.initial_delay;
        loop {
            if *shutdown.borrow() {
                break;
            }

            // other values on the channel leave the deadline where it was
            tokio::select! {
                _ = sleep_until(next_cycle) => {}
                _ = shutdown.changed() => {
                    if shutdown_requested(&shutdown) {
                        break;
                    }
                    continue;
                }
            }

            if let Err(e) = self.run_cycle().await {
                tracing::error!("Cleanup cycle for {} failed: {}", self.cleaner.directory().display(), e);
            }
            next_cycle = Instant::now() + self.interval;
        }

        tracing::info!(
            "Cleanup worker for {} stopped. Final metrics:\n{}",
            self.cleaner.directory().display(),
            self.cleaner.metrics().summary()
        );
    }

    /// Run exactly `cycles` cycles with the configured delays (useful for testing)
    pub async fn run_cycles(&self, cycles: usize) -> Result<(), JanitorError> {
        let mut delay = self.initial_delay;
        for cycle in 0..cycles {
            sleep(delay).await;
            tracing::debug!("Starting cleanup cycle {}/{}", cycle + 1, cycles);
            self.run_cycle().await?;
            delay = self.interval;
        }
        Ok(())
    }

    async fn run_cycle(&self) -> Result<(), JanitorError> {
        let cleaner = Arc::clone(&self.cleaner);
        tokio::task::spawn_blocking(move || cleaner.run_cycle())
            .await
            .map_err(|e| JanitorError::Worker(format!("Task join error: {}", e)))
    }
}

fn shutdown_requested(shutdown: &watch::Receiver<bool>) -> bool {
    // a dropped sender also means stop
    *shutdown.borrow() || shutdown.has_changed().is_err()
}
