//! API error types for the Backlog client.

use serde_json::Value;
use thiserror::Error;

/// Errors that can occur when interacting with the Backlog API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// A required credential is missing or empty.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The request never produced an HTTP response.
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a non-2xx status.
    #[error("{message}")]
    Api {
        /// The HTTP status code.
        status: u16,
        /// The server-supplied message, or `HTTP <code>` when absent.
        message: String,
        /// The decoded error body, or an empty object if it was not JSON.
        raw_body: Value,
    },

    /// A successful response whose body is not the expected JSON.
    #[error("Failed to parse response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Result type for API operations.
pub type Result<T> = std::result::Result<T, ApiError>;

impl ApiError {
    /// Build an error from a non-2xx status and its raw body text.
    ///
    /// The message is taken from the body's `message` field, then from the
    /// first entry of Backlog's `errors` array, and finally falls back to
    /// `HTTP <code>`.
    pub fn from_response(status: u16, body: &str) -> Self {
        let raw_body = serde_json::from_str::<Value>(body)
            .unwrap_or_else(|_| Value::Object(serde_json::Map::new()));

        let message = raw_body
            .get("message")
            .and_then(Value::as_str)
            .or_else(|| {
                raw_body
                    .get("errors")
                    .and_then(Value::as_array)
                    .and_then(|errors| errors.first())
                    .and_then(|first| first.get("message"))
                    .and_then(Value::as_str)
            })
            .map(str::to_string)
            .unwrap_or_else(|| format!("HTTP {}", status));

        ApiError::Api {
            status,
            message,
            raw_body,
        }
    }

    /// The HTTP status code, if the server answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The `errors` field of an error response body, if present.
    pub fn details(&self) -> Option<&Value> {
        match self {
            ApiError::Api { raw_body, .. } => raw_body.get("errors"),
            _ => None,
        }
    }

    /// User-facing guidance for an error response.
    ///
    /// This never changes control flow; callers print it next to the error.
    pub fn hint(&self) -> Option<String> {
        let status = self.status()?;
        let hint = match status {
            400 => "Invalid request parameters".to_string(),
            401 => "Authentication failed - check your API key".to_string(),
            403 => "Permission denied - check project access".to_string(),
            404 => "Resource not found".to_string(),
            429 => "Rate limit exceeded - please wait and try again".to_string(),
            500 | 502 | 503 => "Backlog API server error - please try again later".to_string(),
            other => format!("HTTP {} error", other),
        };
        Some(hint)
    }
}
