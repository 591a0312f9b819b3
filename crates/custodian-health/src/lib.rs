//! Custodian Health
//!
//! Health check primitives shared by the Custodian maintenance jobs.
//!
//! # Overview
//!
//! - [`HealthCheck`]: anything that can evaluate itself into a [`HealthResult`]
//! - [`HealthCheckRegistry`]: named checks polled together by a monitor
//! - [`CheckPool`]: bounded worker pool, constructed once at startup and shut
//!   down at teardown
//! - [`TimeoutGuardedCheck`]: runs any check on the pool with a deadline so a
//!   hung check cannot stall the poller
//!
//! # Usage
//!
//! ```
//! use custodian_health::{
//!     BoxError, CheckPool, HealthCheck, HealthCheckRegistry, HealthResult, TimeoutGuardedCheck,
//! };
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! struct Database;
//!
//! impl HealthCheck for Database {
//!     fn check(&self) -> Result<HealthResult, BoxError> {
//!         Ok(HealthResult::healthy_with_message("connected"))
//!     }
//! }
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = Arc::new(CheckPool::new(4)?);
//! let registry = HealthCheckRegistry::new();
//!
//! let guarded = TimeoutGuardedCheck::with_timeout(
//!     Arc::new(Database),
//!     Arc::clone(&pool),
//!     Duration::from_secs(2),
//! );
//! registry.register("database", Arc::new(guarded))?;
//!
//! for (name, result) in registry.run_health_checks() {
//!     println!("{}: {}", name, result);
//! }
//!
//! pool.shutdown(Duration::from_secs(1));
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod check;
mod error;
mod pool;
mod registry;
mod timeout;

pub use check::{HealthCheck, HealthResult};
pub use error::{BoxError, GuardError, HealthError};
pub use pool::{CheckPool, DEFAULT_POOL_SIZE};
pub use registry::HealthCheckRegistry;
pub use timeout::{TimeoutGuardedCheck, DEFAULT_TIMEOUT};
