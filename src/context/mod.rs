//! Local working-project state.
//!
//! The store keeps two JSON documents in one directory:
//! - `backlog-project.json`: the selected project and its metadata snapshot
//! - `workflow-config.json`: an optional override of the workflow config
//!
//! Both are read and written as whole documents. Unreadable or malformed
//! documents are treated as absent and logged as warnings.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, warn};

use crate::api::{NamedItem, Project};
use crate::workflow::WorkflowConfig;

/// File name of the project context document.
pub const PROJECT_CONTEXT_FILE: &str = "backlog-project.json";

/// File name of the workflow config document.
pub const WORKFLOW_CONFIG_FILE: &str = "workflow-config.json";

/// Metadata lists captured when a project is selected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectMetadata {
    /// Issue types of the project.
    pub issue_types: Vec<NamedItem>,
    /// Space-wide priorities.
    pub priorities: Vec<NamedItem>,
    /// Categories of the project.
    pub categories: Vec<NamedItem>,
    /// Versions (milestones) of the project.
    pub versions: Vec<NamedItem>,
}

/// The currently selected project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectContext {
    /// The numeric project ID.
    pub project_id: i64,
    /// The project key.
    pub project_key: String,
    /// The project name.
    pub project_name: String,
    /// Browser URL of the space.
    pub space_url: String,
    /// Metadata snapshot taken at selection time.
    pub metadata: ProjectMetadata,
    /// When the project was selected.
    pub set_at: DateTime<Utc>,
}

impl ProjectContext {
    /// Build a context for a freshly fetched project, stamped with the
    /// current time.
    pub fn new(project: &Project, space_url: &str, metadata: ProjectMetadata) -> Self {
        Self {
            project_id: project.id,
            project_key: project.project_key.clone(),
            project_name: project.name.clone(),
            space_url: space_url.to_string(),
            metadata,
            set_at: Utc::now(),
        }
    }

    /// Browser URL of the project.
    pub fn project_url(&self) -> String {
        format!("{}/projects/{}", self.space_url, self.project_key)
    }

    /// Browser URL of an issue.
    pub fn issue_url(&self, issue_key: &str) -> String {
        format!("{}/view/{}", self.space_url, issue_key)
    }
}

/// Reads and writes context documents in one directory.
#[derive(Debug, Clone)]
pub struct ContextStore {
    dir: PathBuf,
}

impl ContextStore {
    /// Create a store rooted at `dir`. Nothing is touched until a write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The directory holding the documents.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Load the current project, or `None` if none has been saved or the
    /// document cannot be parsed.
    pub fn load(&self) -> Option<ProjectContext> {
        self.read_document(PROJECT_CONTEXT_FILE)
    }

    /// Replace the current project.
    pub fn save(&self, context: &ProjectContext) -> io::Result<()> {
        self.write_document(PROJECT_CONTEXT_FILE, context)?;
        debug!(project = %context.project_key, "Saved project context");
        Ok(())
    }

    /// Load the workflow config, falling back to the built-in default when
    /// no override exists or it cannot be parsed.
    pub fn load_workflow_config(&self) -> WorkflowConfig {
        self.read_document(WORKFLOW_CONFIG_FILE)
            .unwrap_or_default()
    }

    /// Replace the workflow config override.
    pub fn save_workflow_config(&self, config: &WorkflowConfig) -> io::Result<()> {
        self.write_document(WORKFLOW_CONFIG_FILE, config)
    }

    /// Read a document from disk.
    fn read_document<T: DeserializeOwned>(&self, name: &str) -> Option<T> {
        let path = self.dir.join(name);
        let content = match fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) => {
                if e.kind() != io::ErrorKind::NotFound {
                    warn!("Failed to read {}: {}", path.display(), e);
                }
                return None;
            }
        };

        match serde_json::from_str(&content) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Failed to load {}: {}", name, e);
                None
            }
        }
    }

    /// Write a document to disk, creating the directory if needed.
    fn write_document<T: Serialize>(&self, name: &str, value: &T) -> io::Result<()> {
        fs::create_dir_all(&self.dir)?;

        let content = serde_json::to_string_pretty(value)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        fs::write(self.dir.join(name), content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::PRIORITY_FACTOR;
    use tempfile::tempdir;

    fn test_context(key: &str) -> ProjectContext {
        let project = Project {
            id: 42,
            project_key: key.to_string(),
            name: format!("{} project", key),
            archived: false,
        };
        let metadata = ProjectMetadata {
            issue_types: vec![NamedItem::new(1, "Bug"), NamedItem::new(2, "Task")],
            priorities: vec![
                NamedItem::new(2, "High"),
                NamedItem::new(3, "Normal"),
                NamedItem::new(4, "Low"),
            ],
            categories: vec![],
            versions: vec![NamedItem::new(7, "v1.0")],
        };
        ProjectContext::new(&project, "https://acme.backlog.com", metadata)
    }

    #[test]
    fn test_load_without_save_is_absent() {
        let dir = tempdir().unwrap();
        let store = ContextStore::new(dir.path().join("context"));
        assert!(store.load().is_none());
    }

    #[test]
    fn test_load_invalid_json_is_absent() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(PROJECT_CONTEXT_FILE), "{ not json").unwrap();

        let store = ContextStore::new(dir.path());
        assert!(store.load().is_none());
    }

    #[test]
    fn test_load_wrong_shape_is_absent() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(PROJECT_CONTEXT_FILE), r#"{"projectId": "x"}"#).unwrap();

        let store = ContextStore::new(dir.path());
        assert!(store.load().is_none());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempdir().unwrap();
        let store = ContextStore::new(dir.path().join("nested").join("context"));
        let context = test_context("PROJ");

        store.save(&context).unwrap();
        assert_eq!(store.load(), Some(context));
    }

    #[test]
    fn test_save_replaces_previous_snapshot() {
        let dir = tempdir().unwrap();
        let store = ContextStore::new(dir.path());

        store.save(&test_context("OLD")).unwrap();
        let mut replacement = test_context("NEW");
        replacement.metadata = ProjectMetadata::default();
        store.save(&replacement).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded.project_key, "NEW");
        assert!(loaded.metadata.issue_types.is_empty());
        assert!(loaded.metadata.versions.is_empty());
    }

    #[test]
    fn test_document_uses_camel_case_keys() {
        let dir = tempdir().unwrap();
        let store = ContextStore::new(dir.path());
        store.save(&test_context("PROJ")).unwrap();

        let raw = fs::read_to_string(dir.path().join(PROJECT_CONTEXT_FILE)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["projectKey"], "PROJ");
        assert_eq!(value["metadata"]["issueTypes"][0]["name"], "Bug");
        assert!(value["setAt"].is_string());
    }

    #[test]
    fn test_urls() {
        let context = test_context("PROJ");
        assert_eq!(
            context.project_url(),
            "https://acme.backlog.com/projects/PROJ"
        );
        assert_eq!(
            context.issue_url("PROJ-1"),
            "https://acme.backlog.com/view/PROJ-1"
        );
    }

    #[test]
    fn test_workflow_config_defaults_when_absent() {
        let dir = tempdir().unwrap();
        let store = ContextStore::new(dir.path());
        assert_eq!(store.load_workflow_config(), WorkflowConfig::default());
    }

    #[test]
    fn test_workflow_config_defaults_when_invalid() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(WORKFLOW_CONFIG_FILE), "[]").unwrap();

        let store = ContextStore::new(dir.path());
        assert_eq!(store.load_workflow_config(), WorkflowConfig::default());
    }

    #[test]
    fn test_workflow_config_override_replaces_default() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join(WORKFLOW_CONFIG_FILE),
            r#"{"priorityAlgorithm":{"weights":{"priority":25}}}"#,
        )
        .unwrap();

        let store = ContextStore::new(dir.path());
        let config = store.load_workflow_config();
        assert_eq!(config.priority_algorithm.weight(PRIORITY_FACTOR), 25.0);
        // No deep merge: defaults for other factors and sections are gone.
        assert_eq!(config.priority_algorithm.weight("dueDate"), 0.0);
        assert!(config.status_transitions.is_empty());
    }

    #[test]
    fn test_workflow_config_save_then_load() {
        let dir = tempdir().unwrap();
        let store = ContextStore::new(dir.path());
        let mut config = WorkflowConfig::default();
        config
            .priority_algorithm
            .weights
            .insert(PRIORITY_FACTOR.to_string(), 7.0);

        store.save_workflow_config(&config).unwrap();
        assert_eq!(store.load_workflow_config(), config);
    }
}
