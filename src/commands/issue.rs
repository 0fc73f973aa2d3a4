//! Issue commands.

use clap::{Args, Subcommand};
use serde_json::{json, Map, Value};
use tracing::{info, warn};

use super::{output, resolve};
use crate::api::{BacklogClient, Issue, NamedItem, Query};
use crate::app::App;
use crate::context::ProjectContext;
use crate::error::{AppError, Result};

/// Status set by `issue start`.
const IN_PROGRESS_STATUS: &str = "In Progress";

/// Status set by `issue close`.
const CLOSED_STATUS: &str = "Closed";

/// Workflow automation toggle honored by `issue start`.
const AUTO_ASSIGN_ON_START: &str = "autoAssignOnStart";

/// Priority used for new issues when none is given.
const DEFAULT_PRIORITY: &str = "Normal";

#[derive(Debug, Subcommand)]
pub enum IssueAction {
    /// List issues of the working project
    List {
        /// Only issues assigned to this user (me, ID, name or login ID)
        #[arg(long)]
        assignee: Option<String>,
        /// Maximum number of issues to print
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
    /// Create an issue in the working project
    Create(NewIssue),
    /// Start working on an issue
    Start {
        /// Issue key (e.g., PROJ-123)
        key: String,
        /// Assign the issue to yourself
        #[arg(long)]
        assignee_me: bool,
    },
    /// Change the priority or status of an issue
    Update {
        /// Issue key
        key: String,
        /// New priority name
        #[arg(long)]
        priority: Option<String>,
        /// New status name
        #[arg(long)]
        status: Option<String>,
    },
    /// Add a comment to an issue
    Comment {
        /// Issue key
        key: String,
        /// Comment text
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
    /// Close an issue
    Close {
        /// Issue key
        key: String,
        /// Resolution name (e.g., Fixed)
        #[arg(long)]
        resolution: Option<String>,
    },
}

/// Fields accepted by `issue create`.
#[derive(Debug, Clone, Default, Args)]
pub struct NewIssue {
    /// Issue title
    #[arg(long)]
    pub title: String,
    /// Issue description
    #[arg(long)]
    pub description: Option<String>,
    /// Issue type name (defaults to the project's first type)
    #[arg(long = "type")]
    pub issue_type: Option<String>,
    /// Priority name (defaults to Normal)
    #[arg(long)]
    pub priority: Option<String>,
    /// Assignee (me, ID, name or login ID)
    #[arg(long)]
    pub assignee: Option<String>,
}

pub async fn run(app: &App, action: IssueAction) -> Result<()> {
    match action {
        IssueAction::List { assignee, limit } => {
            let project = app.require_project()?;
            let issues = list(app, &project, assignee.as_deref()).await?;

            println!("\n📋 Issues ({} found):\n", issues.len());
            for issue in issues.iter().take(limit) {
                println!("{}\n", output::issue(issue, Some(&project)));
            }
            if issues.len() > limit {
                println!("... and {} more\n", issues.len() - limit);
            }
        }
        IssueAction::Create(new) => {
            let project = app.require_project()?;
            let issue = create(app, &project, &new).await?;

            println!("\n✅ Issue created: {} - {}", issue.issue_key, issue.summary);
            println!("🔗 {}", project.issue_url(&issue.issue_key));
            println!(
                "📊 Type: {} | Priority: {}\n",
                issue.issue_type_name(),
                issue.priority_name()
            );
        }
        IssueAction::Start { key, assignee_me } => {
            let issue = start(app, &key, assignee_me).await?;
            let project = app.store().load();

            println!("\n✅ Started working on: {} - {}", issue.issue_key, issue.summary);
            println!("{}\n", output::issue(&issue, project.as_ref()));
        }
        IssueAction::Update {
            key,
            priority,
            status,
        } => {
            let issue = update(app, &key, priority.as_deref(), status.as_deref()).await?;
            println!("\n✅ Issue updated: {} - {}\n", issue.issue_key, issue.summary);
        }
        IssueAction::Comment { key, text } => {
            app.client()
                .add_issue_comment(&key, &json!({ "content": text.join(" ") }))
                .await?;
            println!("\n✅ Comment added to {}\n", key);
        }
        IssueAction::Close { key, resolution } => {
            close(app, &key, resolution.as_deref()).await?;
            println!("\n✅ Issue closed: {}\n", key);
        }
    }
    Ok(())
}

/// Issues of `project`, optionally filtered by assignee.
pub async fn list(app: &App, project: &ProjectContext, assignee: Option<&str>) -> Result<Vec<Issue>> {
    let mut query = Query::new().param("projectId[]", vec![project.project_id]);
    if let Some(assignee) = assignee {
        let assignee_id = resolve::user(app.client(), assignee).await?;
        query.push("assigneeId[]", vec![assignee_id]);
    }

    Ok(app.client().get_issues(&query).await?)
}

/// Create an issue, resolving type and priority names against the project
/// metadata snapshot.
pub async fn create(app: &App, project: &ProjectContext, new: &NewIssue) -> Result<Issue> {
    let mut body = create_body(project, new)?;
    if let Some(assignee) = &new.assignee {
        let assignee_id = resolve::user(app.client(), assignee).await?;
        body.insert("assigneeId".to_string(), json!(assignee_id));
    }

    let issue = app.client().add_issue(&Value::Object(body)).await?;
    info!(issue = %issue.issue_key, "Issue created");
    Ok(issue)
}

/// The request body for a new issue, without the assignee.
pub fn create_body(project: &ProjectContext, new: &NewIssue) -> Result<Map<String, Value>> {
    let metadata = &project.metadata;

    let issue_type_id = match &new.issue_type {
        Some(name) => resolve::by_name_ignore_case("Issue type", name, &metadata.issue_types)?,
        None => metadata
            .issue_types
            .first()
            .map(|t| t.id)
            .ok_or_else(|| AppError::other("The project has no issue types"))?,
    };

    let priority_id = match &new.priority {
        Some(name) => resolve::by_name_ignore_case("Priority", name, &metadata.priorities)?,
        None => metadata
            .priorities
            .iter()
            .find(|p| p.name == DEFAULT_PRIORITY)
            .or_else(|| metadata.priorities.first())
            .map(|p| p.id)
            .ok_or_else(|| AppError::other("No priorities are available"))?,
    };

    let mut body = Map::new();
    body.insert("projectId".to_string(), json!(project.project_id));
    body.insert("summary".to_string(), json!(new.title));
    body.insert("issueTypeId".to_string(), json!(issue_type_id));
    body.insert("priorityId".to_string(), json!(priority_id));
    if let Some(description) = &new.description {
        body.insert("description".to_string(), json!(description));
    }
    Ok(body)
}

/// Move an issue to "In Progress". The issue is assigned to the caller when
/// asked to or when the workflow's `autoAssignOnStart` toggle is on.
pub async fn start(app: &App, key: &str, assignee_me: bool) -> Result<Issue> {
    let client = app.client();
    let config = app.store().load_workflow_config();
    let current = client.get_issue(key).await?;
    let mut body = Map::new();

    if assignee_me || config.automation(AUTO_ASSIGN_ON_START) {
        let me = client.get_myself().await?;
        body.insert("assigneeId".to_string(), json!(me.id));
    }
    if let Some(status_id) = find_status(client, &current, IN_PROGRESS_STATUS).await? {
        body.insert("statusId".to_string(), json!(status_id));
    }

    let issue = client.update_issue(key, &Value::Object(body)).await?;
    info!(issue = %issue.issue_key, "Issue started");
    Ok(issue)
}

/// Change priority and/or status.
///
/// A status change the workflow config does not list is still sent, with a
/// warning.
pub async fn update(
    app: &App,
    key: &str,
    priority: Option<&str>,
    status: Option<&str>,
) -> Result<Issue> {
    let client = app.client();
    let mut body = Map::new();

    if let Some(priority) = priority {
        let priorities = client.get_priorities().await?;
        let priority_id = resolve::by_name_ignore_case("Priority", priority, &priorities)?;
        body.insert("priorityId".to_string(), json!(priority_id));
    }

    if let Some(status) = status {
        let current = client.get_issue(key).await?;
        let statuses = statuses_of(client, &current).await?;
        let target = statuses
            .iter()
            .find(|s| s.name.eq_ignore_ascii_case(status))
            .ok_or_else(|| AppError::not_found("Status", status))?;

        let config = app.store().load_workflow_config();
        let from = current.status_name();
        if !config.can_transition(from, &target.name) {
            warn!(issue = %key, from = %from, to = %target.name, "Transition not allowed by workflow config");
            eprintln!(
                "⚠️  Workflow does not allow '{}' -> '{}'. Sending anyway.",
                from, target.name
            );
        }
        body.insert("statusId".to_string(), json!(target.id));
    }

    Ok(client.update_issue(key, &Value::Object(body)).await?)
}

/// Close an issue with an optional resolution.
pub async fn close(app: &App, key: &str, resolution: Option<&str>) -> Result<Issue> {
    let client = app.client();
    let current = client.get_issue(key).await?;
    let mut body = Map::new();

    if let Some(status_id) = find_status(client, &current, CLOSED_STATUS).await? {
        body.insert("statusId".to_string(), json!(status_id));
    }
    if let Some(resolution) = resolution {
        let resolutions = client.get_resolutions().await?;
        match resolve::by_name("Resolution", resolution, &resolutions) {
            Ok(id) => {
                body.insert("resolutionId".to_string(), json!(id));
            }
            Err(e) => warn!("{}, closing without a resolution", e),
        }
    }

    let issue = client.update_issue(key, &Value::Object(body)).await?;
    info!(issue = %issue.issue_key, "Issue closed");
    Ok(issue)
}

/// Statuses of the project `issue` belongs to.
async fn statuses_of(client: &BacklogClient, issue: &Issue) -> Result<Vec<NamedItem>> {
    let project_id = issue
        .project_id
        .ok_or_else(|| AppError::other(format!("Issue {} has no project", issue.issue_key)))?;
    Ok(client.get_statuses(project_id).await?)
}

/// ID of the status called `name` in the issue's project, if it exists.
async fn find_status(client: &BacklogClient, issue: &Issue, name: &str) -> Result<Option<i64>> {
    let statuses = statuses_of(client, issue).await?;
    let found = statuses.iter().find(|s| s.name == name).map(|s| s.id);
    if found.is_none() {
        warn!(issue = %issue.issue_key, status = %name, "Status not found, leaving status unchanged");
    }
    Ok(found)
}
