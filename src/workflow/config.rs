//! Local workflow configuration.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Weight factor used by the scoring engine.
pub const PRIORITY_FACTOR: &str = "priority";

/// Drives the `next` ranking and status-transition checks.
///
/// An on-disk document replaces this value as a whole; there is no merge
/// with [`WorkflowConfig::default`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowConfig {
    /// Scoring weights and rules.
    pub priority_algorithm: PriorityAlgorithm,
    /// Allowed next statuses, keyed by current status name.
    #[serde(default)]
    pub status_transitions: BTreeMap<String, Vec<String>>,
    /// Automation toggles.
    #[serde(default)]
    pub automation: BTreeMap<String, bool>,
}

/// Weights for the priority score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriorityAlgorithm {
    /// Factor name to weight.
    ///
    /// Only `priority` is read by the scoring engine. `dueDate`,
    /// `blockedDependencies`, `estimatedHours` and `ageInDays` are accepted
    /// and preserved for a future formula.
    pub weights: BTreeMap<String, f64>,
    /// Custom rules. Not read by the scoring engine.
    #[serde(default)]
    pub custom_rules: Vec<Value>,
}

impl PriorityAlgorithm {
    /// The weight of a factor, 0 when absent.
    pub fn weight(&self, factor: &str) -> f64 {
        self.weights.get(factor).copied().unwrap_or(0.0)
    }
}

impl WorkflowConfig {
    /// Statuses reachable from `status`, in configured order.
    pub fn allowed_transitions(&self, status: &str) -> &[String] {
        self.status_transitions
            .get(status)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Whether the workflow permits moving from `from` to `to`.
    ///
    /// A status with no configured transitions permits nothing.
    pub fn can_transition(&self, from: &str, to: &str) -> bool {
        self.allowed_transitions(from).iter().any(|s| s == to)
    }

    /// Whether an automation toggle is on. Unknown toggles are off.
    pub fn automation(&self, toggle: &str) -> bool {
        self.automation.get(toggle).copied().unwrap_or(false)
    }
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        let weights = [
            (PRIORITY_FACTOR, 10.0),
            ("dueDate", 5.0),
            ("blockedDependencies", 3.0),
            ("estimatedHours", -0.1),
            ("ageInDays", 0.5),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();

        let transitions =
            |next: &[&str]| -> Vec<String> { next.iter().map(|s| s.to_string()).collect() };
        let status_transitions = BTreeMap::from([
            ("Open".to_string(), transitions(&["In Progress", "Closed"])),
            (
                "In Progress".to_string(),
                transitions(&["Resolved", "Open", "Closed"]),
            ),
            ("Resolved".to_string(), transitions(&["Closed", "In Progress"])),
            ("Closed".to_string(), transitions(&["Open"])),
        ]);

        let automation = [
            "autoCommentOnStart",
            "autoCommentOnClose",
            "autoAssignOnStart",
            "notifyAssigneeOnUpdate",
        ]
        .into_iter()
        .map(|k| (k.to_string(), true))
        .collect();

        Self {
            priority_algorithm: PriorityAlgorithm {
                weights,
                custom_rules: Vec::new(),
            },
            status_transitions,
            automation,
        }
    }
}
