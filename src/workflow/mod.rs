//! Workflow configuration and the next-task scoring engine.

mod config;
mod scoring;

pub use config::{PriorityAlgorithm, WorkflowConfig, PRIORITY_FACTOR};
pub use scoring::{priority_ordinal, rank, score, ScoredIssue, MAX_SCORE};
