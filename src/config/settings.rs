//! Application settings configuration.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{config_dir, ConfigError, Result};
use crate::api::DEFAULT_RATE_LIMIT_DELAY_MS;

/// Settings file name inside the config directory.
const SETTINGS_FILE: &str = "config.toml";

/// Default project-local directory for context documents.
const DEFAULT_CONTEXT_DIR: &str = ".backlog/context";

/// Application-wide settings, read from `config.toml`.
///
/// The API key is never read from this file, only from the environment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Space key used when `BACKLOG_SPACE_KEY` is not set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub space_key: Option<String>,
    /// Endpoint override used when `BACKLOG_API_ENDPOINT` is not set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_endpoint: Option<String>,
    /// Minimum spacing between API requests in milliseconds.
    pub rate_limit_delay_ms: u64,
    /// Where the project context and workflow config live.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context_dir: Option<PathBuf>,
    /// Default number of recommendations shown by `next`.
    pub next_count: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            space_key: None,
            api_endpoint: None,
            rate_limit_delay_ms: DEFAULT_RATE_LIMIT_DELAY_MS,
            context_dir: None,
            next_count: 3,
        }
    }
}

impl Settings {
    /// Load settings from the platform config directory.
    ///
    /// A missing file yields the defaults.
    pub fn load() -> Result<Self> {
        let path = config_dir()?.join(SETTINGS_FILE);
        Self::load_from(&path)
    }

    /// Load settings from an explicit path.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ReadError` if the file exists but cannot be read,
    /// `ConfigError::ParseError` if it is not valid TOML, and
    /// `ConfigError::ValidationError` if a value is unacceptable.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No settings file, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::ReadError(e)),
        };

        let settings: Settings =
            toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        settings.validate()?;

        debug!(path = %path.display(), "Loaded settings");
        Ok(settings)
    }

    /// Validate this configuration.
    ///
    /// Checks that:
    /// - The space key, if set, is non-empty and has no whitespace
    /// - The endpoint, if set, starts with `http://` or `https://`
    pub fn validate(&self) -> Result<()> {
        if let Some(space_key) = &self.space_key {
            if space_key.is_empty() {
                return Err(ConfigError::ValidationError(
                    "space_key cannot be empty".to_string(),
                ));
            }
            if space_key.contains(char::is_whitespace) {
                return Err(ConfigError::ValidationError(format!(
                    "space_key '{}' cannot contain whitespace",
                    space_key
                )));
            }
        }

        if let Some(endpoint) = &self.api_endpoint {
            if !endpoint.starts_with("https://") && !endpoint.starts_with("http://") {
                return Err(ConfigError::ValidationError(format!(
                    "api_endpoint '{}' must start with http:// or https://",
                    endpoint
                )));
            }
        }

        Ok(())
    }

    /// The directory holding context documents.
    pub fn context_dir(&self) -> PathBuf {
        self.context_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONTEXT_DIR))
    }
}
