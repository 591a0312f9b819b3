//! Custodian Service
//!
//! Schedules directory cleanup jobs, registers their health checks and polls
//! them. Configuration comes from a TOML file:
//!
//! ```toml
//! shutdown_grace_period = "5s"
//!
//! [health]
//! pool_size = 4
//! poll_interval = "30s"
//! default_timeout = "5s"
//!
//! [[cleanup_jobs]]
//! directory_path = "/var/spool/uploads"
//! retention_threshold = "1day"
//! interval = "10m"
//! ```

#![warn(missing_docs)]

pub mod config;
mod error;
mod service;

pub use config::{HealthConfig, ServiceConfig};
pub use error::ServiceError;
pub use service::{health_check_name, CleanupService};
