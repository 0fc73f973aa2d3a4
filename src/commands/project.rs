//! Project commands.

use clap::Subcommand;
use tracing::info;

use super::output;
use crate::api::{ApiError, NamedItem, Query};
use crate::app::App;
use crate::context::{ProjectContext, ProjectMetadata};
use crate::error::Result;

#[derive(Debug, Subcommand)]
pub enum ProjectAction {
    /// List projects in the space
    List {
        /// Only show projects that are not archived
        #[arg(long)]
        active_only: bool,
        /// Print raw JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Set the working project and cache its metadata
    Set {
        /// Project key or ID
        key: String,
    },
    /// Show the working project
    Info,
}

pub async fn run(app: &App, action: ProjectAction) -> Result<()> {
    match action {
        ProjectAction::List { active_only, json } => list(app, active_only, json).await,
        ProjectAction::Set { key } => {
            let context = select(app, &key).await?;
            println!(
                "\n✅ Project set: {} - {}",
                context.project_key, context.project_name
            );
            println!("🔗 {}\n", context.project_url());
            Ok(())
        }
        ProjectAction::Info => {
            let context = app.require_project()?;
            println!("{}", describe(&context));
            Ok(())
        }
    }
}

async fn list(app: &App, active_only: bool, json: bool) -> Result<()> {
    let query = Query::new().param("archived", active_only.then_some(false));
    let projects = app.client().get_projects(&query).await?;

    if json {
        let json = serde_json::to_string_pretty(&projects).map_err(ApiError::from)?;
        println!("{}", json);
        return Ok(());
    }

    let rows: Vec<Vec<String>> = projects
        .iter()
        .map(|p| {
            let status = if p.archived { "Archived" } else { "Active" };
            vec![p.project_key.clone(), p.name.clone(), status.to_string()]
        })
        .collect();

    println!("\nAvailable Projects:");
    println!("{}", output::table(&["Key", "Name", "Status"], &rows));
    println!("\n💡 Use 'bl project set <key>' to set working project\n");
    Ok(())
}

/// Fetch a project with its metadata and make it the working project.
///
/// The previous snapshot, if any, is replaced as a whole.
pub async fn select(app: &App, key: &str) -> Result<ProjectContext> {
    let client = app.client();
    let project = client.get_project(key).await?;

    let (issue_types, priorities, categories, versions) = tokio::try_join!(
        client.get_issue_types(key),
        client.get_priorities(),
        client.get_categories(key),
        client.get_versions(key),
    )?;

    let metadata = ProjectMetadata {
        issue_types,
        priorities,
        categories,
        versions,
    };
    let space_url = client.credentials().space_url();
    let context = ProjectContext::new(&project, &space_url, metadata);

    app.store().save(&context)?;
    info!(project = %context.project_key, "Working project set");
    Ok(context)
}

/// Human-readable summary of the working project.
pub fn describe(context: &ProjectContext) -> String {
    let names = |items: &[NamedItem]| {
        items
            .iter()
            .map(|i| i.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    };
    let metadata = &context.metadata;

    format!(
        "\n📋 Current Project: {} - {}\n🔗 {}\n\n📊 Issue Types: {}\n📈 Priorities: {}\n🏷️  Categories: {}\n📅 Versions: {}\n",
        context.project_key,
        context.project_name,
        context.project_url(),
        names(&metadata.issue_types),
        names(&metadata.priorities),
        names(&metadata.categories),
        names(&metadata.versions),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::{app_for, mock_json};
    use crate::error::AppError;
    use mockito::Server;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_select_saves_full_snapshot() {
        let mut server = Server::new_async().await;
        let _project = mock_json(
            &mut server,
            "GET",
            "/api/v2/projects/PROJ",
            r#"{"id":42,"projectKey":"PROJ","name":"Project","archived":false}"#,
        )
        .await;
        let _types = mock_json(
            &mut server,
            "GET",
            "/api/v2/projects/PROJ/issueTypes",
            r##"[{"id":1,"projectId":42,"name":"Bug","color":"#990000"},{"id":2,"name":"Task"}]"##,
        )
        .await;
        let _priorities = mock_json(
            &mut server,
            "GET",
            "/api/v2/priorities",
            r#"[{"id":2,"name":"High"},{"id":3,"name":"Normal"},{"id":4,"name":"Low"}]"#,
        )
        .await;
        let _categories = mock_json(&mut server, "GET", "/api/v2/projects/PROJ/categories", "[]").await;
        let _versions = mock_json(
            &mut server,
            "GET",
            "/api/v2/projects/PROJ/versions",
            r#"[{"id":7,"name":"v1.0","archived":false}]"#,
        )
        .await;

        let dir = tempdir().unwrap();
        let app = app_for(&server, dir.path());
        let context = select(&app, "PROJ").await.unwrap();

        assert_eq!(context.project_id, 42);
        assert_eq!(context.project_key, "PROJ");
        assert_eq!(context.space_url, "https://test-space.backlog.com");
        assert_eq!(context.metadata.issue_types.len(), 2);
        assert_eq!(
            context.metadata.issue_types[0].extra.get("color"),
            Some(&serde_json::json!("#990000"))
        );
        assert_eq!(context.metadata.priorities[1].name, "Normal");
        assert_eq!(app.store().load(), Some(context));
    }

    #[tokio::test]
    async fn test_select_failure_saves_nothing() {
        let mut server = Server::new_async().await;
        let _project = server
            .mock("GET", "/api/v2/projects/NOPE")
            .match_query(mockito::Matcher::Any)
            .with_status(404)
            .with_body(r#"{"errors":[{"message":"No project.","code":6}]}"#)
            .create_async()
            .await;

        let dir = tempdir().unwrap();
        let app = app_for(&server, dir.path());
        let err = select(&app, "NOPE").await.unwrap_err();

        assert!(matches!(err, AppError::Api(_)));
        assert_eq!(err.to_string(), "No project.");
        assert!(app.store().load().is_none());
    }

    #[test]
    fn test_describe_lists_metadata_names() {
        let context: ProjectContext = serde_json::from_value(serde_json::json!({
            "projectId": 1,
            "projectKey": "PROJ",
            "projectName": "Project",
            "spaceUrl": "https://acme.backlog.com",
            "metadata": {
                "issueTypes": [{"id": 1, "name": "Bug"}, {"id": 2, "name": "Task"}],
                "priorities": [{"id": 2, "name": "High"}],
                "categories": [],
                "versions": [{"id": 3, "name": "v1"}]
            },
            "setAt": "2024-01-01T00:00:00Z"
        }))
        .unwrap();

        let text = describe(&context);
        assert!(text.contains("Current Project: PROJ - Project"));
        assert!(text.contains("https://acme.backlog.com/projects/PROJ"));
        assert!(text.contains("Issue Types: Bug, Task"));
        assert!(text.contains("Versions: v1"));
    }
}
