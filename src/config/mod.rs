//! Configuration management for backlog-cli.
//!
//! This module handles reading user settings from `config.toml` and
//! resolving Backlog credentials from the environment.

mod env;
mod settings;

use std::path::PathBuf;

use thiserror::Error;

pub use env::{Environment, ENV_API_ENDPOINT, ENV_API_KEY, ENV_SPACE_KEY};
pub use settings::Settings;

/// Application name used for config, data and log directories.
pub const APP_NAME: &str = "backlog-cli";

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The platform config directory could not be determined.
    #[error("Could not determine configuration directory")]
    NoConfigDir,

    /// A file could not be read.
    #[error("Failed to read configuration: {0}")]
    ReadError(#[source] std::io::Error),

    /// A file is not valid TOML for its schema.
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// A value is syntactically valid but not acceptable.
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// The platform config directory for backlog-cli.
///
/// - Linux: `~/.config/backlog-cli/`
/// - macOS: `~/Library/Application Support/backlog-cli/`
/// - Windows: `C:\Users\<User>\AppData\Roaming\backlog-cli\`
pub fn config_dir() -> Result<PathBuf> {
    dirs::config_dir()
        .map(|dir| dir.join(APP_NAME))
        .ok_or(ConfigError::NoConfigDir)
}
