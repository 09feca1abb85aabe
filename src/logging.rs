//! Tracing setup: human-readable INFO on stderr, full DEBUG per run on disk

use anyhow::{Context, Result};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::current_timestamp;

/// Install the global subscriber. Call once, at process start.
///
/// Returns the path of this run's log file.
pub fn init(logs_dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(logs_dir)
        .with_context(|| format!("Failed to create log directory {}", logs_dir.display()))?;
    let log_file = logs_dir.join(format!("run_{}.log", current_timestamp()));
    let file = File::create(&log_file)
        .with_context(|| format!("Failed to create log file {}", log_file.display()))?;

    // Output logs to stderr so JSON output on stdout remains clean
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "pinprobe=info".into()),
        );

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(Arc::new(file))
        .with_ansi(false)
        .with_file(true)
        .with_line_number(true)
        .with_filter(EnvFilter::new("pinprobe=debug"));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .context("Logger already initialized")?;

    info!("Logger initialized. Writing to: {}", log_file.display());
    Ok(log_file)
}
