//! Command-line commands.
//!
//! Each module exposes a clap action enum and an async `run` that prints to
//! stdout. The work behind each command lives in separate functions so it
//! can be tested without capturing output.

pub mod issue;
pub mod milestone;
pub mod notification;
pub mod output;
pub mod project;
pub mod resolve;
pub mod workflow;

pub use issue::IssueAction;
pub use milestone::MilestoneAction;
pub use notification::{NotificationAction, WatchingAction};
pub use project::ProjectAction;
