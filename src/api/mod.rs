//! Backlog API client and types.
//!
//! This module provides the interface for communicating with the Backlog
//! REST API v2.

mod auth;
mod client;
pub mod error;
mod query;
mod rate_limit;
pub mod types;

pub use auth::{Credentials, SERVICE_DOMAIN};
pub use client::BacklogClient;
pub use error::ApiError;
pub use query::{Query, QueryValue};
pub use rate_limit::{RateLimiter, DEFAULT_RATE_LIMIT_DELAY_MS};
pub use types::{Comment, Count, Issue, NamedItem, Project, User};
