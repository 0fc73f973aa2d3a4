//! Logging configuration using the tracing ecosystem.
//!
//! Logs go to a daily-rotated file so that stdout stays reserved for
//! command output. The level is taken from `RUST_LOG` when set.

use std::path::PathBuf;

use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

use crate::config::APP_NAME;

/// Default log level if RUST_LOG is not set.
const DEFAULT_LOG_FILTER: &str = "backlog_cli=info,warn";

/// Log level used with `--verbose` if RUST_LOG is not set.
const VERBOSE_LOG_FILTER: &str = "backlog_cli=debug,info";

/// Initialize the logging system.
///
/// # Log Directory
///
/// Logs are stored in the platform-specific local data directory:
/// - Linux: `~/.local/share/backlog-cli/logs/`
/// - macOS: `~/Library/Application Support/backlog-cli/logs/`
/// - Windows: `C:\Users\<User>\AppData\Local\backlog-cli\logs\`
///
/// # Errors
///
/// Returns an error if the log directory cannot be determined or created,
/// or if a global subscriber is already set.
pub fn init(verbose: bool) -> anyhow::Result<()> {
    let log_dir = get_log_directory()?;
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, &log_dir, "backlog-cli.log");

    let default_filter = if verbose {
        VERBOSE_LOG_FILTER
    } else {
        DEFAULT_LOG_FILTER
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let subscriber = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_target(true)
                .with_file(true)
                .with_line_number(true),
        )
        .with(filter);

    tracing::subscriber::set_global_default(subscriber)?;

    tracing::debug!(version = env!("CARGO_PKG_VERSION"), log_dir = %log_dir.display(), "backlog-cli starting");

    Ok(())
}

/// Get the log directory path.
fn get_log_directory() -> anyhow::Result<PathBuf> {
    let base_dir = dirs::data_local_dir()
        .ok_or_else(|| anyhow::anyhow!("Could not determine local data directory"))?;

    Ok(base_dir.join(APP_NAME).join("logs"))
}

/// Get the path where logs are stored.
pub fn log_directory() -> Option<PathBuf> {
    get_log_directory().ok()
}
