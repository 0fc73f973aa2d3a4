//! Credential lookup from the process environment and a `.env` file.

use std::collections::HashMap;
use std::path::Path;

use tracing::{debug, warn};

use super::Settings;
use crate::api::error::{ApiError, Result};
use crate::api::Credentials;

/// Space key variable.
pub const ENV_SPACE_KEY: &str = "BACKLOG_SPACE_KEY";
/// API key variable.
pub const ENV_API_KEY: &str = "BACKLOG_API_KEY";
/// Optional endpoint override variable.
pub const ENV_API_ENDPOINT: &str = "BACKLOG_API_ENDPOINT";

const KNOWN_KEYS: [&str; 3] = [ENV_SPACE_KEY, ENV_API_KEY, ENV_API_ENDPOINT];

/// Named configuration values: process environment first, then `.env`.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    vars: HashMap<String, String>,
}

impl Environment {
    /// Read the known variables from the process environment, falling back
    /// to a `.env` file in `dir`.
    pub fn load(dir: &Path) -> Self {
        let mut env = Self::from_dotenv_file(&dir.join(".env"));

        for key in KNOWN_KEYS {
            if let Ok(value) = std::env::var(key) {
                if !value.is_empty() {
                    env.vars.insert(key.to_string(), value);
                }
            }
        }

        env
    }

    /// Parse a `.env` file. A missing or unreadable file yields an empty set.
    fn from_dotenv_file(path: &Path) -> Self {
        match dotenv::from_path_iter(path) {
            Ok(iter) => {
                debug!(path = %path.display(), "Loaded .env file");
                Self::collect(iter)
            }
            Err(e) if e.not_found() => Self::default(),
            Err(e) => {
                warn!(path = %path.display(), "Failed to read .env file: {}", e);
                Self::default()
            }
        }
    }

    /// Parse `.env` content. Lines that fail to parse and entries with an
    /// empty value are skipped.
    pub fn parse_dotenv(content: &str) -> Self {
        Self::collect(dotenv::from_read_iter(content.as_bytes()))
    }

    fn collect(entries: impl Iterator<Item = dotenv::Result<(String, String)>>) -> Self {
        let vars = entries
            .filter_map(|entry| match entry {
                Ok(pair) => Some(pair),
                Err(e) => {
                    warn!("Skipping .env line: {}", e);
                    None
                }
            })
            .filter(|(_, value)| !value.is_empty())
            .collect();

        Self { vars }
    }

    /// Set a value, replacing any previous one.
    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.vars.insert(key.to_string(), value.to_string());
        self
    }

    /// Look up a value.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    /// Resolve credentials. The space key and endpoint fall back to
    /// `settings`; the API key must come from the environment.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Configuration` naming the missing variable.
    pub fn credentials(&self, settings: &Settings) -> Result<Credentials> {
        let space_key = self
            .get(ENV_SPACE_KEY)
            .or(settings.space_key.as_deref())
            .ok_or_else(|| missing(ENV_SPACE_KEY))?;
        let api_key = self.get(ENV_API_KEY).ok_or_else(|| missing(ENV_API_KEY))?;
        let api_endpoint = self
            .get(ENV_API_ENDPOINT)
            .or(settings.api_endpoint.as_deref());

        Credentials::new(space_key, api_key, api_endpoint)
    }
}

fn missing(key: &str) -> ApiError {
    ApiError::Configuration(format!("{} environment variable is required", key))
}
