//! bl - Backlog issue tracking from the terminal.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::error;

use backlog_cli::app::App;
use backlog_cli::commands::{
    self, IssueAction, MilestoneAction, NotificationAction, ProjectAction, WatchingAction,
};
use backlog_cli::error::{AppError, Result};
use backlog_cli::logging;

#[derive(Parser)]
#[command(name = "bl", version, about = "Backlog issue tracking from the terminal")]
struct Cli {
    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Project selection and info
    Project {
        #[command(subcommand)]
        action: ProjectAction,
    },
    /// Issue management
    Issue {
        #[command(subcommand)]
        action: IssueAction,
    },
    /// Recommend what to work on next
    Next {
        /// Number of recommendations
        #[arg(long)]
        count: Option<usize>,
        /// Whose issues to rank (me, ID, name or login ID)
        #[arg(long)]
        assignee: Option<String>,
    },
    /// Issue counts for the working project
    Status,
    /// Milestones of the working project
    Milestone {
        #[command(subcommand)]
        action: MilestoneAction,
    },
    /// Notifications
    Notifications {
        #[command(subcommand)]
        action: NotificationAction,
    },
    /// Watched issues
    Watching {
        #[command(subcommand)]
        action: WatchingAction,
    },
}

impl Commands {
    /// Short name used in failure messages.
    fn name(&self) -> &'static str {
        match self {
            Commands::Project { .. } => "project",
            Commands::Issue { .. } => "issue",
            Commands::Next { .. } => "next",
            Commands::Status => "status",
            Commands::Milestone { .. } => "milestone",
            Commands::Notifications { .. } => "notifications",
            Commands::Watching { .. } => "watching",
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = logging::init(cli.verbose) {
        eprintln!("Warning: logging disabled: {:#}", e);
    }

    let name = cli.command.name();
    match run(cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(command = name, critical = e.is_critical(), "Command failed: {}", e);
            report(name, &e);
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Commands) -> Result<()> {
    let app = App::from_environment()?;

    match command {
        Commands::Project { action } => commands::project::run(&app, action).await,
        Commands::Issue { action } => commands::issue::run(&app, action).await,
        Commands::Next { count, assignee } => {
            commands::workflow::next(&app, count, assignee.as_deref()).await
        }
        Commands::Status => commands::workflow::status(&app).await,
        Commands::Milestone { action } => commands::milestone::run(&app, action).await,
        Commands::Notifications { action } => commands::notification::run(&app, action).await,
        Commands::Watching { action } => commands::notification::run_watching(&app, action).await,
    }
}

fn report(name: &str, e: &AppError) {
    eprintln!("\n❌ Error: {} failed", name);
    eprintln!("{}", e.user_message());
    if let Some(action) = e.suggested_action() {
        eprintln!("💡 {}", action);
    }
    if let Some(details) = e.details() {
        eprintln!("Details: {}", details);
    }
    eprintln!();
}
