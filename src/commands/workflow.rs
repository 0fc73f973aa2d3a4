//! `next` and `status`.

use crate::api::{Issue, Query};
use crate::app::App;
use crate::context::ProjectContext;
use crate::error::Result;
use crate::workflow;

use super::{output, resolve};

/// Assignee used by `next` when none is given.
pub const DEFAULT_ASSIGNEE: &str = "me";

/// Print the top-ranked issues assigned to `assignee` in the working project.
pub async fn next(app: &App, count: Option<usize>, assignee: Option<&str>) -> Result<()> {
    let project = app.require_project()?;
    let count = count.unwrap_or(app.settings().next_count);
    let issues = assigned_issues(app, &project, assignee.unwrap_or(DEFAULT_ASSIGNEE)).await?;

    let config = app.store().load_workflow_config();
    let ranked = workflow::rank(&issues, &config, count);

    println!("\n🎯 Recommended next tasks (by priority):\n");
    if !ranked.is_empty() {
        println!("{}\n", output::recommendations(&ranked));
    }
    println!("Use 'bl issue start <key>' to begin work\n");
    Ok(())
}

/// Issues of the project assigned to the resolved user.
pub async fn assigned_issues(app: &App, project: &ProjectContext, assignee: &str) -> Result<Vec<Issue>> {
    let assignee_id = resolve::user(app.client(), assignee).await?;
    let query = Query::new()
        .param("projectId[]", vec![project.project_id])
        .param("assigneeId[]", vec![assignee_id]);

    Ok(app.client().get_issues(&query).await?)
}

/// Counts for `status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProjectStatus {
    /// Issues matching the project filter on the server.
    pub total: u64,
    /// Issues returned by one list request.
    pub fetched: usize,
}

pub async fn project_status(app: &App, project: &ProjectContext) -> Result<ProjectStatus> {
    let query = Query::new().param("projectId[]", vec![project.project_id]);
    let client = app.client();

    let issues = client.get_issues(&query).await?;
    let count = client.count_issues(&query).await?;

    Ok(ProjectStatus {
        total: count.count,
        fetched: issues.len(),
    })
}

pub async fn status(app: &App) -> Result<()> {
    let project = app.require_project()?;
    let status = project_status(app, &project).await?;

    println!("\n📊 Project Status: {}\n", project.project_name);
    println!("Total Issues: {}", status.total);
    println!("Fetched: {}\n", status.fetched);
    Ok(())
}
