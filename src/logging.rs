//! Logging setup.
//!
//! Every event goes to two places: stderr (for the person at the terminal) and
//! an append-only log file. Library code only emits `tracing` events; which
//! subscriber receives them is decided here for the binaries, and by tests
//! through `tracing::subscriber::set_default`.

use crate::types::{Result, SqlRagError};
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Install the process-wide subscriber.
///
/// # Arguments
///
/// * `log_file` - Append-only log file, created if missing
///
/// # Returns
///
/// Guard that flushes the file writer when dropped; keep it alive in `main`
///
/// # Errors
///
/// Returns `SqlRagError::ConfigError` if a subscriber is already installed
pub fn init(log_file: &Path) -> Result<WorkerGuard> {
    let directory = match log_file.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => Path::new(".").to_path_buf(),
    };
    let file_name = log_file
        .file_name()
        .ok_or_else(|| SqlRagError::config(format!("Invalid log file: {}", log_file.display())))?;

    std::fs::create_dir_all(&directory)?;
    let appender = tracing_appender::rolling::never(&directory, file_name);
    let (file_writer, guard) = tracing_appender::non_blocking(appender);

    let filter = || EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let terminal_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_file(true)
        .with_line_number(true)
        .with_filter(filter());

    let file_layer = fmt::layer()
        .with_writer(file_writer)
        .with_ansi(false)
        .with_target(false)
        .with_file(true)
        .with_line_number(true)
        .with_filter(filter());

    tracing_subscriber::registry()
        .with(terminal_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| SqlRagError::config(format!("Failed to install logger: {}", e)))?;

    Ok(guard)
}

/// Minimal setup for the utility binaries: stderr only.
pub fn init_terminal() {
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .try_init();
}
