//! Turning command-line names into Backlog IDs.

use crate::api::{BacklogClient, NamedItem};
use crate::error::{AppError, Result};

/// Resolve a user given as a numeric ID, `me`, a display name or a login ID.
pub async fn user(client: &BacklogClient, identifier: &str) -> Result<i64> {
    if identifier.chars().all(|c| c.is_ascii_digit()) {
        if let Ok(id) = identifier.parse::<i64>() {
            return Ok(id);
        }
    }

    if identifier == "me" {
        return Ok(client.get_myself().await?.id);
    }

    let users = client.get_users().await?;
    users
        .iter()
        .find(|u| u.name == identifier || u.user_id.as_deref() == Some(identifier))
        .map(|u| u.id)
        .ok_or_else(|| AppError::not_found("User", identifier))
}

/// Find an item by name, ignoring ASCII case.
pub fn by_name_ignore_case(kind: &'static str, name: &str, items: &[NamedItem]) -> Result<i64> {
    items
        .iter()
        .find(|item| item.name.eq_ignore_ascii_case(name))
        .map(|item| item.id)
        .ok_or_else(|| AppError::not_found(kind, name))
}

/// Find an item by exact name.
pub fn by_name(kind: &'static str, name: &str, items: &[NamedItem]) -> Result<i64> {
    items
        .iter()
        .find(|item| item.name == name)
        .map(|item| item.id)
        .ok_or_else(|| AppError::not_found(kind, name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Credentials;
    use mockito::{Matcher, Server};
    use std::time::Duration;

    fn items() -> Vec<NamedItem> {
        vec![
            NamedItem::new(2, "High"),
            NamedItem::new(3, "Normal"),
            NamedItem::new(4, "Low"),
        ]
    }

    #[test]
    fn test_by_name_ignore_case() {
        assert_eq!(by_name_ignore_case("Priority", "high", &items()).unwrap(), 2);
        assert_eq!(by_name_ignore_case("Priority", "LOW", &items()).unwrap(), 4);
    }

    #[test]
    fn test_by_name_is_exact() {
        assert_eq!(by_name("Version", "Normal", &items()).unwrap(), 3);
        let err = by_name("Version", "normal", &items()).unwrap_err();
        assert_eq!(err.to_string(), "Version 'normal' not found");
    }

    #[tokio::test]
    async fn test_user_numeric_needs_no_request() {
        let creds = Credentials::new("space", "k", Some("http://127.0.0.1:1/api/v2")).unwrap();
        let client = BacklogClient::with_rate_limit(creds, Duration::ZERO).unwrap();
        assert_eq!(user(&client, "123").await.unwrap(), 123);
    }

    #[tokio::test]
    async fn test_user_signed_number_is_a_name() {
        let mut server = Server::new_async().await;
        let _users = server
            .mock("GET", "/api/v2/users")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"[{"id":7,"userId":"-5","name":"Minus Five"}]"#)
            .create_async()
            .await;

        let endpoint = format!("{}/api/v2", server.url());
        let creds = Credentials::new("space", "k", Some(&endpoint)).unwrap();
        let client = BacklogClient::with_rate_limit(creds, Duration::ZERO).unwrap();

        assert_eq!(user(&client, "-5").await.unwrap(), 7);
        assert!(matches!(
            user(&client, "+5").await,
            Err(AppError::NotFound { kind: "User", .. })
        ));
    }

    #[tokio::test]
    async fn test_user_me_and_names() {
        let mut server = Server::new_async().await;
        let _myself = server
            .mock("GET", "/api/v2/users/myself")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"id":5,"userId":"alice","name":"Alice"}"#)
            .create_async()
            .await;
        let _users = server
            .mock("GET", "/api/v2/users")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"[{"id":5,"userId":"alice","name":"Alice"},{"id":6,"userId":"bob","name":"Bob Smith"}]"#)
            .create_async()
            .await;

        let endpoint = format!("{}/api/v2", server.url());
        let creds = Credentials::new("space", "k", Some(&endpoint)).unwrap();
        let client = BacklogClient::with_rate_limit(creds, Duration::ZERO).unwrap();

        assert_eq!(user(&client, "me").await.unwrap(), 5);
        assert_eq!(user(&client, "Bob Smith").await.unwrap(), 6);
        assert_eq!(user(&client, "bob").await.unwrap(), 6);
        assert!(matches!(
            user(&client, "carol").await,
            Err(AppError::NotFound { kind: "User", .. })
        ));
    }
}
