//! Backlog API response types.
//!
//! These model the parts of Backlog API v2 responses that the command layer
//! reads. Unknown fields are ignored, or kept in `extra` where the value is
//! written back to disk.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A Backlog user.
///
/// Returned by `GET /users/myself` and `GET /users`, and embedded in issues.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// The numeric user ID.
    pub id: i64,
    /// The login ID. Absent for some bot users.
    #[serde(default)]
    pub user_id: Option<String>,
    /// The display name.
    pub name: String,
    /// The user's role.
    #[serde(default)]
    pub role_type: Option<i64>,
    /// The user's email address.
    #[serde(default)]
    pub mail_address: Option<String>,
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// A Backlog project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// The numeric project ID.
    pub id: i64,
    /// The project key (e.g., "PROJ").
    pub project_key: String,
    /// The project name.
    pub name: String,
    /// Whether the project is archived.
    #[serde(default)]
    pub archived: bool,
}

/// An `{id, name, ...}` entry: issue types, priorities, statuses,
/// categories, versions and resolutions all share this shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedItem {
    /// The numeric ID.
    pub id: i64,
    /// The display name.
    pub name: String,
    /// Remaining fields, preserved verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl NamedItem {
    /// Create an item with no extra fields.
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            extra: Map::new(),
        }
    }

    /// Whether the item is archived. Only versions carry this flag.
    pub fn is_archived(&self) -> bool {
        self.extra
            .get("archived")
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }
}

impl fmt::Display for NamedItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// A Backlog issue.
///
/// Returned by `GET /issues/{issueIdOrKey}` and as elements of `GET /issues`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    /// The numeric issue ID.
    pub id: i64,
    /// The project the issue belongs to.
    #[serde(default)]
    pub project_id: Option<i64>,
    /// The issue key (e.g., "PROJ-123").
    pub issue_key: String,
    /// The issue summary/title.
    pub summary: String,
    /// The issue description.
    #[serde(default)]
    pub description: Option<String>,
    /// The issue type.
    #[serde(default)]
    pub issue_type: Option<NamedItem>,
    /// The issue priority.
    #[serde(default)]
    pub priority: Option<NamedItem>,
    /// The issue status.
    #[serde(default)]
    pub status: Option<NamedItem>,
    /// The issue assignee.
    #[serde(default)]
    pub assignee: Option<User>,
    /// The due date, if set.
    #[serde(default)]
    pub due_date: Option<String>,
    /// The estimated hours, if set.
    #[serde(default)]
    pub estimated_hours: Option<f64>,
    /// When the issue was created.
    #[serde(default)]
    pub created: Option<String>,
}

impl Issue {
    /// Get the issue type name, or "-" if not set.
    pub fn issue_type_name(&self) -> &str {
        self.issue_type.as_ref().map(|t| t.name.as_str()).unwrap_or("-")
    }

    /// Get the priority name, if set.
    pub fn priority(&self) -> Option<&str> {
        self.priority.as_ref().map(|p| p.name.as_str())
    }

    /// Get the priority name, or "-" if not set.
    pub fn priority_name(&self) -> &str {
        self.priority().unwrap_or("-")
    }

    /// Get the status name, or "-" if not set.
    pub fn status_name(&self) -> &str {
        self.status.as_ref().map(|s| s.name.as_str()).unwrap_or("-")
    }

    /// Get the assignee name, or "(none)" if unassigned.
    pub fn assignee_name(&self) -> &str {
        self.assignee
            .as_ref()
            .map(|u| u.name.as_str())
            .unwrap_or("(none)")
    }
}

/// An issue comment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    /// The numeric comment ID.
    pub id: i64,
    /// The comment body. Empty for change-log-only comments.
    #[serde(default)]
    pub content: Option<String>,
    /// The author.
    #[serde(default)]
    pub created_user: Option<User>,
    /// When the comment was created.
    #[serde(default)]
    pub created: Option<String>,
}

/// Result of the `/count` endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Count {
    /// The number of matching items.
    pub count: u64,
}
