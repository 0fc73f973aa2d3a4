//! Priority scoring for the `next` recommendation list.
//!
//! The score uses only the issue's priority:
//!
//! ```text
//! score = clamp(ordinal(priority) * weights["priority"], 0, 100)
//! ordinal: High = 3, Normal = 2, Low = 1, anything else = 1
//! ```
//!
//! The remaining weight factors in [`WorkflowConfig`] (due date, blocked
//! dependencies, estimated hours, age) are not part of the formula yet.

use std::cmp::Ordering;

use super::config::{WorkflowConfig, PRIORITY_FACTOR};
use crate::api::Issue;

/// Upper bound of a score.
pub const MAX_SCORE: f64 = 100.0;

/// An issue paired with its score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredIssue<'a> {
    /// The scored issue.
    pub issue: &'a Issue,
    /// The score, within `[0, 100]`.
    pub score: f64,
}

/// Ordinal weight of a priority name.
pub fn priority_ordinal(priority: Option<&str>) -> u8 {
    match priority {
        Some("High") => 3,
        Some("Normal") => 2,
        _ => 1,
    }
}

/// Score a single issue.
pub fn score(issue: &Issue, config: &WorkflowConfig) -> f64 {
    let ordinal = f64::from(priority_ordinal(issue.priority()));
    let weight = config.priority_algorithm.weight(PRIORITY_FACTOR);

    (ordinal * weight).clamp(0.0, MAX_SCORE)
}

/// Score every issue and return the best `limit`, highest first.
///
/// The sort is stable, so equal scores keep their input order.
pub fn rank<'a>(issues: &'a [Issue], config: &WorkflowConfig, limit: usize) -> Vec<ScoredIssue<'a>> {
    let mut scored: Vec<ScoredIssue<'a>> = issues
        .iter()
        .map(|issue| ScoredIssue {
            issue,
            score: score(issue, config),
        })
        .collect();

    scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    scored.truncate(limit);
    scored
}
