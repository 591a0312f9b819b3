//! Custodian CLI
//!
//! Starts the configured cleanup jobs and runs until Ctrl+C.

use anyhow::Context;
use custodian_service::{CleanupService, ServiceConfig};
use std::env;
use std::process;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().collect();

    let config = if args.len() > 2 && args[1] == "--config" {
        let config_path = &args[2];
        ServiceConfig::from_file(config_path)
            .with_context(|| format!("loading {}", config_path))?
    } else if args.len() > 1 && args[1] == "--help" {
        print_help();
        return Ok(());
    } else {
        eprintln!("Usage: custodian --config <path-to-config.toml>");
        process::exit(2);
    };

    if config.cleanup_jobs.is_empty() {
        tracing::warn!("No cleanup jobs configured");
    }

    let grace = config.shutdown_grace_period;
    let service = CleanupService::start(&config)?;

    tokio::signal::ctrl_c()
        .await
        .context("waiting for shutdown signal")?;
    tracing::info!("Shutdown signal received");

    service.shutdown(grace).await;
    Ok(())
}

fn print_help() {
    println!("Custodian - Scheduled directory cleanup with health checks");
    println!();
    println!("USAGE:");
    println!("    custodian --config <path-to-config.toml>");
    println!();
    println!("OPTIONS:");
    println!("    --config <file>    Load configuration from TOML file");
    println!("    --help             Print this help message");
    println!();
    println!("CONFIGURATION:");
    println!("    The TOML config file may contain:");
    println!("    - shutdown_grace_period: Time allowed for running work on shutdown (default: 5s)");
    println!("    - [health]: pool_size (default: 4), poll_interval (default: 30s), default_timeout (default: 5s)");
    println!("    - [[cleanup_jobs]]: directory_path, retention_threshold, interval, and optionally");
    println!("      initial_delay (1s), health_check_warning_window (1h), delete_error_log_level (WARN),");
    println!("      max_recent_errors (500), dry_run (false), health_check_timeout");
    println!();
    println!("LOGGING:");
    println!("    Set RUST_LOG to adjust verbosity (default: info)");
    println!();
}
