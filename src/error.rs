//! Centralized error types for backlog-cli.
//!
//! This module provides a unified error hierarchy for the application with
//! user-friendly error messages. All error types use `thiserror` for
//! ergonomic error handling.

use thiserror::Error;

use crate::api::error::ApiError;
use crate::config::ConfigError;

/// The main application error type.
///
/// This enum aggregates all error types that can occur in backlog-cli,
/// providing user-friendly error messages while preserving the underlying
/// error context for debugging.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration-related errors.
    #[error("{0}")]
    Config(#[from] ConfigError),

    /// API-related errors.
    #[error("{0}")]
    Api(#[from] ApiError),

    /// IO errors (file system, etc.).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A workflow command ran without a selected project.
    #[error("No project currently set")]
    NoProject,

    /// A name given on the command line matched nothing.
    #[error("{kind} '{name}' not found")]
    NotFound {
        /// What was looked up ("User", "Priority", ...).
        kind: &'static str,
        /// The name that was given.
        name: String,
    },

    /// Generic errors with a message.
    #[error("{0}")]
    Other(String),
}

impl AppError {
    /// Create a lookup failure.
    pub fn not_found(kind: &'static str, name: impl Into<String>) -> Self {
        AppError::NotFound {
            kind,
            name: name.into(),
        }
    }

    /// Create a generic error.
    pub fn other(msg: impl Into<String>) -> Self {
        AppError::Other(msg.into())
    }

    /// Get a user-friendly message for display.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Config(e) => match e {
                ConfigError::NoConfigDir => {
                    "Could not find configuration directory. Please check your system settings."
                        .to_string()
                }
                ConfigError::ReadError(_) => {
                    "Could not read configuration file. Please check the file exists and is readable.".to_string()
                }
                ConfigError::ParseError(_) => {
                    "Configuration file is invalid. Please check the file format.".to_string()
                }
                ConfigError::ValidationError(msg) => format!("Configuration error: {}", msg),
            },
            AppError::Api(e) => match e {
                ApiError::Configuration(msg) => {
                    format!("Failed to initialize Backlog API client: {}", msg)
                }
                ApiError::Transport(_) => {
                    "Connection failed. Please check your internet connection.".to_string()
                }
                ApiError::Api {
                    status, message, ..
                } => format!("Backlog returned HTTP {}: {}", status, message),
                ApiError::Decode(_) => {
                    "Unexpected response from Backlog. Please try again.".to_string()
                }
            },
            AppError::Io(_) => "A file operation failed. Please check file permissions.".to_string(),
            AppError::NoProject => "No project currently set.".to_string(),
            AppError::NotFound { .. } => self.to_string(),
            AppError::Other(msg) => msg.clone(),
        }
    }

    /// Check if this error is critical.
    ///
    /// Critical errors indicate setup problems the user has to fix before
    /// any command can work.
    pub fn is_critical(&self) -> bool {
        matches!(
            self,
            AppError::Config(_)
                | AppError::Api(ApiError::Configuration(_))
                | AppError::Api(ApiError::Api { status: 401, .. })
        )
    }

    /// Get a suggested action for the user.
    pub fn suggested_action(&self) -> Option<String> {
        match self {
            AppError::Api(ApiError::Configuration(_)) => Some(
                "Set BACKLOG_SPACE_KEY and BACKLOG_API_KEY in your environment or a .env file."
                    .to_string(),
            ),
            AppError::Api(ApiError::Transport(_)) => {
                Some("Check your internet connection and BACKLOG_API_ENDPOINT.".to_string())
            }
            AppError::Api(e @ ApiError::Api { .. }) => e.hint(),
            AppError::NoProject => Some("Use 'bl project set <key>' to set working project.".to_string()),
            AppError::Config(ConfigError::ParseError(_)) => {
                Some("Fix or remove the config.toml file.".to_string())
            }
            _ => None,
        }
    }

    /// Structured details from an error response, for display.
    pub fn details(&self) -> Option<String> {
        match self {
            AppError::Api(e) => e.details().map(|d| d.to_string()),
            _ => None,
        }
    }
}

/// Result type for application operations.
pub type Result<T> = std::result::Result<T, AppError>;
