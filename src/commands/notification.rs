//! Notification and watch-list commands.

use clap::Subcommand;
use serde_json::Value;

use super::{output, resolve};
use crate::api::{ApiError, Query};
use crate::app::App;
use crate::error::Result;

#[derive(Debug, Subcommand)]
pub enum NotificationAction {
    /// List recent notifications
    List {
        /// Only unread notifications
        #[arg(long)]
        unread: bool,
    },
    /// Count notifications
    Count {
        /// Only unread notifications
        #[arg(long)]
        unread: bool,
    },
    /// Mark one notification as read
    Read {
        /// Notification ID
        id: i64,
    },
    /// Reset the unread notification count
    Reset,
}

#[derive(Debug, Subcommand)]
pub enum WatchingAction {
    /// List watched issues
    List {
        /// User (me, ID, name or login ID)
        #[arg(default_value = "me")]
        user: String,
    },
    /// Count watched issues
    Count {
        /// User (me, ID, name or login ID)
        #[arg(default_value = "me")]
        user: String,
    },
}

pub async fn run(app: &App, action: NotificationAction) -> Result<()> {
    let client = app.client();
    match action {
        NotificationAction::List { unread } => {
            let notifications = client.get_notifications(&Query::new()).await?;
            let rows = notification_rows(&notifications, unread);

            println!("\n🔔 Notifications ({}):\n", rows.len());
            println!(
                "{}\n",
                output::table(&["ID", "Issue", "From", "Read"], &rows)
            );
        }
        NotificationAction::Count { unread } => {
            let query = Query::new().param("alreadyRead", unread.then_some(false));
            let count = client.count_notifications(&query).await?;
            println!("\n🔔 Notifications: {}\n", count.count);
        }
        NotificationAction::Read { id } => {
            client.mark_notification_as_read(id).await?;
            println!("\n✅ Notification {} marked as read\n", id);
        }
        NotificationAction::Reset => {
            let count = client.reset_unread_notification_count().await?;
            println!("\n✅ Unread notifications reset ({} remaining)\n", count.count);
        }
    }
    Ok(())
}

pub async fn run_watching(app: &App, action: WatchingAction) -> Result<()> {
    let client = app.client();
    match action {
        WatchingAction::List { user } => {
            let user_id = resolve::user(client, &user).await?;
            let watchings = client.get_watching_list(user_id).await?;
            println!(
                "{}",
                serde_json::to_string_pretty(&watchings).map_err(ApiError::from)?
            );
        }
        WatchingAction::Count { user } => {
            let user_id = resolve::user(client, &user).await?;
            let count = client.get_watching_count(user_id).await?;
            println!("\n👀 Watching: {}\n", count.count);
        }
    }
    Ok(())
}

/// Table rows for a notification list response. Entries missing an ID are
/// skipped.
fn notification_rows(notifications: &Value, unread_only: bool) -> Vec<Vec<String>> {
    let text = |v: Option<&Value>| v.and_then(Value::as_str).unwrap_or("-").to_string();

    notifications
        .as_array()
        .map(Vec::as_slice)
        .unwrap_or(&[])
        .iter()
        .filter_map(|n| {
            let id = n.get("id").and_then(Value::as_i64)?;
            let read = n.get("alreadyRead").and_then(Value::as_bool).unwrap_or(false);
            if unread_only && read {
                return None;
            }
            Some(vec![
                id.to_string(),
                text(n.pointer("/issue/issueKey")),
                text(n.pointer("/sender/name")),
                if read { "yes" } else { "no" }.to_string(),
            ])
        })
        .collect()
}
