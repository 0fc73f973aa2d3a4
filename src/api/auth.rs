//! Authentication handling for the Backlog API.
//!
//! Backlog authenticates API-key requests through an `apiKey` query
//! parameter, so credentials are just the space key, the key itself and an
//! optional endpoint override.

use std::fmt;

use tracing::warn;

use super::error::{ApiError, Result};

/// Domain hosting Backlog spaces.
pub const SERVICE_DOMAIN: &str = "backlog.com";

/// Credentials for a Backlog space.
#[derive(Clone)]
pub struct Credentials {
    space_key: String,
    api_key: String,
    api_endpoint: String,
}

impl Credentials {
    /// Create credentials, deriving the endpoint from the space key when no
    /// override is given.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Configuration` if the space key or API key is empty.
    pub fn new(space_key: &str, api_key: &str, api_endpoint: Option<&str>) -> Result<Self> {
        let space_key = space_key.trim();
        let api_key = api_key.trim();

        if space_key.is_empty() {
            return Err(ApiError::Configuration("spaceKey is required".to_string()));
        }
        if api_key.is_empty() {
            return Err(ApiError::Configuration("apiKey is required".to_string()));
        }

        let api_endpoint = match api_endpoint.map(str::trim).filter(|e| !e.is_empty()) {
            Some(endpoint) => normalize_endpoint(endpoint),
            None => default_endpoint(space_key),
        };

        Ok(Self {
            space_key: space_key.to_string(),
            api_key: api_key.to_string(),
            api_endpoint,
        })
    }

    /// The space key.
    pub fn space_key(&self) -> &str {
        &self.space_key
    }

    /// The API key.
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// The API base endpoint, without a trailing slash.
    pub fn api_endpoint(&self) -> &str {
        &self.api_endpoint
    }

    /// The browser URL of the space.
    pub fn space_url(&self) -> String {
        format!("https://{}.{}", self.space_key, SERVICE_DOMAIN)
    }
}

// The API key must never end up in logs.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("space_key", &self.space_key)
            .field("api_key", &"<redacted>")
            .field("api_endpoint", &self.api_endpoint)
            .finish()
    }
}

/// The default endpoint for a space.
fn default_endpoint(space_key: &str) -> String {
    format!("https://{}.{}/api/v2", space_key, SERVICE_DOMAIN)
}

/// Remove trailing slashes and warn about plain HTTP.
fn normalize_endpoint(url: &str) -> String {
    let url = url.trim_end_matches('/');

    if !url.starts_with("https://") && !url.contains("localhost") && !url.contains("127.0.0.1") {
        warn!("Endpoint does not use HTTPS: {}. This is insecure for production use.", url);
    }

    url.to_string()
}
