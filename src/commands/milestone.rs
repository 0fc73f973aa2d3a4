//! Milestone commands. Backlog calls milestones "versions".

use clap::Subcommand;

use super::output;
use crate::api::NamedItem;
use crate::app::App;
use crate::error::Result;

#[derive(Debug, Subcommand)]
pub enum MilestoneAction {
    /// List milestones of the working project
    List,
}

pub async fn run(app: &App, action: MilestoneAction) -> Result<()> {
    match action {
        MilestoneAction::List => {
            let project = app.require_project()?;
            let versions = app.client().get_versions(&project.project_key).await?;

            println!("\n📅 Milestones:\n");
            println!("{}\n", output::table(&["Name", "Status"], &rows(&versions)));
            Ok(())
        }
    }
}

fn rows(versions: &[NamedItem]) -> Vec<Vec<String>> {
    versions
        .iter()
        .map(|v| {
            let status = if v.is_archived() { "Archived" } else { "Active" };
            vec![v.name.clone(), status.to_string()]
        })
        .collect()
}
