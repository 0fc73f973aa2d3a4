//! backlog-cli - a command-line client for Backlog issue tracking.
//!
//! The library holds everything behind the `bl` binary: a rate-limited API
//! client, the local project context store and the next-task scoring engine.

pub mod api;
pub mod app;
pub mod commands;
pub mod config;
pub mod context;
pub mod error;
pub mod logging;
pub mod workflow;
