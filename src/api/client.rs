//! Backlog API client implementation.
//!
//! This module provides the main client for interacting with the Backlog REST
//! API v2. It handles authentication, rate limiting, and mapping of HTTP
//! outcomes to typed errors. Failures are never retried here.

use std::fmt;
use std::time::Duration;

use reqwest::{header, Client, Method, Response, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use super::auth::Credentials;
use super::error::{ApiError, Result};
use super::query::Query;
use super::rate_limit::{RateLimiter, DEFAULT_RATE_LIMIT_DELAY_MS};
use super::types::{Comment, Count, Issue, NamedItem, Project, User};

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Client identifier sent with every request.
const USER_AGENT: &str = concat!("backlog-cli/", env!("CARGO_PKG_VERSION"));

/// The Backlog API client.
///
/// All requests made through one instance share a rate limiter, so their
/// dispatches are spaced by at least the configured delay.
#[derive(Debug)]
pub struct BacklogClient {
    /// The HTTP client.
    client: Client,
    /// Space key, API key and endpoint.
    credentials: Credentials,
    /// Spacing between dispatches of this instance.
    limiter: RateLimiter,
}

impl BacklogClient {
    /// Create a client with the default 100ms request spacing.
    pub fn new(credentials: Credentials) -> Result<Self> {
        Self::with_rate_limit(
            credentials,
            Duration::from_millis(DEFAULT_RATE_LIMIT_DELAY_MS),
        )
    }

    /// Create a client with an explicit request spacing.
    pub fn with_rate_limit(credentials: Credentials, delay: Duration) -> Result<Self> {
        let client = Self::build_http_client()?;
        let limiter = RateLimiter::new(delay);
        debug!(
            endpoint = %credentials.api_endpoint(),
            delay_ms = limiter.delay().as_millis() as u64,
            "Creating Backlog client"
        );

        Ok(Self {
            client,
            credentials,
            limiter,
        })
    }

    /// Build the HTTP client with appropriate settings.
    fn build_http_client() -> Result<Client> {
        Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()
            .map_err(ApiError::Transport)
    }

    /// The credentials this client was built with.
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Build the full URL for a path: the API key first, then the caller's
    /// parameters in order.
    pub fn build_url(&self, path: &str, query: &Query) -> Result<Url> {
        let raw = format!("{}{}", self.credentials.api_endpoint(), path);
        let mut url = Url::parse(&raw)
            .map_err(|e| ApiError::Configuration(format!("invalid API URL '{}': {}", raw, e)))?;

        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("apiKey", self.credentials.api_key());
            for (key, value) in query.pairs() {
                pairs.append_pair(key, value);
            }
        }

        Ok(url)
    }

    /// Perform a request and decode the JSON response.
    ///
    /// An empty successful body decodes to `Value::Null`.
    #[instrument(skip_all, fields(method = %method, path = %path))]
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        query: &Query,
    ) -> Result<Value> {
        let url = self.build_url(path, query)?;

        self.limiter.acquire().await;
        debug!("Dispatching request");

        let mut request = self
            .client
            .request(method, url)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(body) = body {
            request = request.json(body);
        }

        // The URL carries the API key; strip it before the error is logged.
        let response = request.send().await.map_err(|e| {
            let e = e.without_url();
            warn!("Request failed: {}", e);
            ApiError::Transport(e)
        })?;

        Self::handle_response(response).await
    }

    /// Perform a request and decode the response into `T`.
    async fn request_as<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        query: &Query,
    ) -> Result<T> {
        let value = self.request(method, path, body, query).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Handle the HTTP response, checking for errors and parsing JSON.
    async fn handle_response(response: Response) -> Result<Value> {
        let status = response.status();

        if status.is_success() {
            let body = response
                .text()
                .await
                .map_err(|e| ApiError::Transport(e.without_url()))?;
            if body.trim().is_empty() {
                return Ok(Value::Null);
            }
            Ok(serde_json::from_str(&body)?)
        } else {
            let body = response.text().await.unwrap_or_default();
            debug!("Error response body: {}", body);

            let err = ApiError::from_response(status.as_u16(), &body);
            warn!(status = status.as_u16(), "Backlog returned an error: {}", err);
            Err(err)
        }
    }

    // Projects

    /// `GET /projects`
    pub async fn get_projects(&self, query: &Query) -> Result<Vec<Project>> {
        self.request_as(Method::GET, "/projects", None, query).await
    }

    /// `GET /projects/{projectIdOrKey}`
    #[instrument(skip_all, fields(project = %project))]
    pub async fn get_project(&self, project: impl fmt::Display) -> Result<Project> {
        let path = format!("/projects/{}", project);
        self.request_as(Method::GET, &path, None, &Query::new()).await
    }

    /// `POST /projects`
    pub async fn add_project(&self, body: &Value) -> Result<Value> {
        self.request(Method::POST, "/projects", Some(body), &Query::new())
            .await
    }

    /// `PATCH /projects/{projectIdOrKey}`
    pub async fn update_project(&self, project: impl fmt::Display, body: &Value) -> Result<Value> {
        let path = format!("/projects/{}", project);
        self.request(Method::PATCH, &path, Some(body), &Query::new())
            .await
    }

    /// `DELETE /projects/{projectIdOrKey}`
    pub async fn delete_project(&self, project: impl fmt::Display) -> Result<Value> {
        let path = format!("/projects/{}", project);
        self.request(Method::DELETE, &path, None, &Query::new())
            .await
    }

    // Issues

    /// `GET /issues`
    pub async fn get_issues(&self, query: &Query) -> Result<Vec<Issue>> {
        let issues: Vec<Issue> = self.request_as(Method::GET, "/issues", None, query).await?;
        debug!("Fetched {} issues", issues.len());
        Ok(issues)
    }

    /// `GET /issues/count`
    pub async fn count_issues(&self, query: &Query) -> Result<Count> {
        self.request_as(Method::GET, "/issues/count", None, query)
            .await
    }

    /// `GET /issues/{issueIdOrKey}`
    #[instrument(skip_all, fields(issue = %issue))]
    pub async fn get_issue(&self, issue: impl fmt::Display) -> Result<Issue> {
        let path = format!("/issues/{}", issue);
        self.request_as(Method::GET, &path, None, &Query::new()).await
    }

    /// `POST /issues`
    pub async fn add_issue(&self, body: &Value) -> Result<Issue> {
        self.request_as(Method::POST, "/issues", Some(body), &Query::new())
            .await
    }

    /// `PATCH /issues/{issueIdOrKey}`
    #[instrument(skip_all, fields(issue = %issue))]
    pub async fn update_issue(&self, issue: impl fmt::Display, body: &Value) -> Result<Issue> {
        let path = format!("/issues/{}", issue);
        self.request_as(Method::PATCH, &path, Some(body), &Query::new())
            .await
    }

    /// `DELETE /issues/{issueIdOrKey}`
    pub async fn delete_issue(&self, issue: impl fmt::Display) -> Result<Value> {
        let path = format!("/issues/{}", issue);
        self.request(Method::DELETE, &path, None, &Query::new())
            .await
    }

    // Comments

    /// `GET /issues/{issueIdOrKey}/comments`
    pub async fn get_issue_comments(
        &self,
        issue: impl fmt::Display,
        query: &Query,
    ) -> Result<Vec<Comment>> {
        let path = format!("/issues/{}/comments", issue);
        self.request_as(Method::GET, &path, None, query).await
    }

    /// `GET /issues/{issueIdOrKey}/comments/{commentId}`
    pub async fn get_issue_comment(
        &self,
        issue: impl fmt::Display,
        comment_id: i64,
    ) -> Result<Comment> {
        let path = format!("/issues/{}/comments/{}", issue, comment_id);
        self.request_as(Method::GET, &path, None, &Query::new()).await
    }

    /// `POST /issues/{issueIdOrKey}/comments`
    pub async fn add_issue_comment(&self, issue: impl fmt::Display, body: &Value) -> Result<Comment> {
        let path = format!("/issues/{}/comments", issue);
        self.request_as(Method::POST, &path, Some(body), &Query::new())
            .await
    }

    /// `PATCH /issues/{issueIdOrKey}/comments/{commentId}`
    pub async fn update_issue_comment(
        &self,
        issue: impl fmt::Display,
        comment_id: i64,
        body: &Value,
    ) -> Result<Value> {
        let path = format!("/issues/{}/comments/{}", issue, comment_id);
        self.request(Method::PATCH, &path, Some(body), &Query::new())
            .await
    }

    /// `DELETE /issues/{issueIdOrKey}/comments/{commentId}`
    pub async fn delete_issue_comment(
        &self,
        issue: impl fmt::Display,
        comment_id: i64,
    ) -> Result<Value> {
        let path = format!("/issues/{}/comments/{}", issue, comment_id);
        self.request(Method::DELETE, &path, None, &Query::new())
            .await
    }

    // Space and project metadata

    /// `GET /priorities`
    pub async fn get_priorities(&self) -> Result<Vec<NamedItem>> {
        self.request_as(Method::GET, "/priorities", None, &Query::new())
            .await
    }

    /// `GET /resolutions`
    pub async fn get_resolutions(&self) -> Result<Vec<NamedItem>> {
        self.request_as(Method::GET, "/resolutions", None, &Query::new())
            .await
    }

    /// `GET /projects/{projectIdOrKey}/categories`
    pub async fn get_categories(&self, project: impl fmt::Display) -> Result<Vec<NamedItem>> {
        let path = format!("/projects/{}/categories", project);
        self.request_as(Method::GET, &path, None, &Query::new()).await
    }

    /// `GET /projects/{projectIdOrKey}/customFields`
    pub async fn get_custom_fields(&self, project: impl fmt::Display) -> Result<Value> {
        let path = format!("/projects/{}/customFields", project);
        self.request(Method::GET, &path, None, &Query::new()).await
    }

    /// `GET /projects/{projectIdOrKey}/issueTypes`
    pub async fn get_issue_types(&self, project: impl fmt::Display) -> Result<Vec<NamedItem>> {
        let path = format!("/projects/{}/issueTypes", project);
        self.request_as(Method::GET, &path, None, &Query::new()).await
    }

    /// `GET /projects/{projectIdOrKey}/statuses`
    pub async fn get_statuses(&self, project: impl fmt::Display) -> Result<Vec<NamedItem>> {
        let path = format!("/projects/{}/statuses", project);
        self.request_as(Method::GET, &path, None, &Query::new()).await
    }

    // Versions (milestones)

    /// `GET /projects/{projectIdOrKey}/versions`
    pub async fn get_versions(&self, project: impl fmt::Display) -> Result<Vec<NamedItem>> {
        let path = format!("/projects/{}/versions", project);
        self.request_as(Method::GET, &path, None, &Query::new()).await
    }

    /// `POST /projects/{projectIdOrKey}/versions`
    pub async fn add_version(&self, project: impl fmt::Display, body: &Value) -> Result<Value> {
        let path = format!("/projects/{}/versions", project);
        self.request(Method::POST, &path, Some(body), &Query::new())
            .await
    }

    /// `PATCH /projects/{projectIdOrKey}/versions/{versionId}`
    pub async fn update_version(
        &self,
        project: impl fmt::Display,
        version_id: i64,
        body: &Value,
    ) -> Result<Value> {
        let path = format!("/projects/{}/versions/{}", project, version_id);
        self.request(Method::PATCH, &path, Some(body), &Query::new())
            .await
    }

    /// `DELETE /projects/{projectIdOrKey}/versions/{versionId}`
    pub async fn delete_version(
        &self,
        project: impl fmt::Display,
        version_id: i64,
    ) -> Result<Value> {
        let path = format!("/projects/{}/versions/{}", project, version_id);
        self.request(Method::DELETE, &path, None, &Query::new())
            .await
    }

    // Notifications

    /// `GET /notifications`
    pub async fn get_notifications(&self, query: &Query) -> Result<Value> {
        self.request(Method::GET, "/notifications", None, query).await
    }

    /// `GET /notifications/count`
    pub async fn count_notifications(&self, query: &Query) -> Result<Count> {
        self.request_as(Method::GET, "/notifications/count", None, query)
            .await
    }

    /// `POST /notifications/{id}/markAsRead`
    pub async fn mark_notification_as_read(&self, notification_id: i64) -> Result<Value> {
        let path = format!("/notifications/{}/markAsRead", notification_id);
        self.request(Method::POST, &path, None, &Query::new()).await
    }

    /// `POST /notifications/markAsRead`
    pub async fn reset_unread_notification_count(&self) -> Result<Count> {
        self.request_as(Method::POST, "/notifications/markAsRead", None, &Query::new())
            .await
    }

    // Users

    /// `GET /users/myself`
    pub async fn get_myself(&self) -> Result<User> {
        self.request_as(Method::GET, "/users/myself", None, &Query::new())
            .await
    }

    /// `GET /users`
    pub async fn get_users(&self) -> Result<Vec<User>> {
        self.request_as(Method::GET, "/users", None, &Query::new())
            .await
    }

    /// `GET /users/{userId}/watchings`
    pub async fn get_watching_list(&self, user_id: i64) -> Result<Value> {
        let path = format!("/users/{}/watchings", user_id);
        self.request(Method::GET, &path, None, &Query::new()).await
    }

    /// `GET /users/{userId}/watchings/count`
    pub async fn get_watching_count(&self, user_id: i64) -> Result<Count> {
        let path = format!("/users/{}/watchings/count", user_id);
        self.request_as(Method::GET, &path, None, &Query::new()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server, ServerGuard};
    use serde_json::json;

    const API_KEY: &str = "test-key";

    fn client_for(server: &ServerGuard) -> BacklogClient {
        let endpoint = format!("{}/api/v2", server.url());
        let creds = Credentials::new("test-space", API_KEY, Some(&endpoint)).unwrap();
        BacklogClient::with_rate_limit(creds, Duration::ZERO).unwrap()
    }

    fn api_key_matcher() -> Matcher {
        Matcher::UrlEncoded("apiKey".into(), API_KEY.into())
    }

    #[test]
    fn test_build_url_api_key_first_then_query_in_order() {
        let creds = Credentials::new("space", "k", None).unwrap();
        let client = BacklogClient::new(creds).unwrap();
        let query = Query::new()
            .param("projectId[]", vec![7])
            .param("assigneeId[]", vec![1, 2, 3])
            .param("keyword", None::<&str>);

        let url = client.build_url("/issues", &query).unwrap();
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();

        assert_eq!(url.path(), "/api/v2/issues");
        assert_eq!(
            pairs,
            vec![
                ("apiKey".to_string(), "k".to_string()),
                ("projectId[]".to_string(), "7".to_string()),
                ("assigneeId[]".to_string(), "1".to_string()),
                ("assigneeId[]".to_string(), "2".to_string()),
                ("assigneeId[]".to_string(), "3".to_string()),
            ]
        );
    }

    #[test]
    fn test_build_url_uses_key_verbatim_in_path() {
        let creds = Credentials::new("space", "k", None).unwrap();
        let client = BacklogClient::new(creds).unwrap();

        let url = client.build_url("/issues/PROJ-12/comments", &Query::new()).unwrap();
        assert_eq!(url.host_str(), Some("space.backlog.com"));
        assert_eq!(url.path(), "/api/v2/issues/PROJ-12/comments");
    }

    #[tokio::test]
    async fn test_request_success_decodes_json() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/api/v2/projects/PROJ")
            .match_query(api_key_matcher())
            .match_header("content-type", "application/json")
            .match_header("user-agent", Matcher::Regex("^backlog-cli/".into()))
            .with_status(200)
            .with_body(r#"{"id":1,"projectKey":"PROJ","name":"Project","nested":{"a":[1,2]}}"#)
            .create_async()
            .await;

        let client = client_for(&server);
        let value = client
            .request(Method::GET, "/projects/PROJ", None, &Query::new())
            .await
            .unwrap();

        assert_eq!(
            value,
            json!({"id":1,"projectKey":"PROJ","name":"Project","nested":{"a":[1,2]}})
        );
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_request_empty_success_body_is_null() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/v2/notifications/5/markAsRead")
            .match_query(api_key_matcher())
            .with_status(204)
            .create_async()
            .await;

        let client = client_for(&server);
        let value = client.mark_notification_as_read(5).await.unwrap();
        assert_eq!(value, Value::Null);
    }

    #[tokio::test]
    async fn test_mutation_with_empty_body_is_null() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("DELETE", "/api/v2/projects/PROJ/versions/3")
            .match_query(api_key_matcher())
            .with_status(200)
            .create_async()
            .await;

        let client = client_for(&server);
        let value = client.delete_version("PROJ", 3).await.unwrap();
        assert_eq!(value, Value::Null);
    }

    #[tokio::test]
    async fn test_request_404_carries_server_message() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/v2/issues/PROJ-404")
            .match_query(Matcher::Any)
            .with_status(404)
            .with_body(r#"{"message":"Issue not found"}"#)
            .create_async()
            .await;

        let client = client_for(&server);
        let err = client.get_issue("PROJ-404").await.unwrap_err();

        match err {
            ApiError::Api {
                status,
                message,
                raw_body,
            } => {
                assert_eq!(status, 404);
                assert_eq!(message, "Issue not found");
                assert_eq!(raw_body, json!({"message":"Issue not found"}));
            }
            other => panic!("Expected Api error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_request_500_unparseable_body() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/v2/priorities")
            .match_query(Matcher::Any)
            .with_status(500)
            .with_body("Internal Server Error")
            .create_async()
            .await;

        let client = client_for(&server);
        let err = client.get_priorities().await.unwrap_err();

        match err {
            ApiError::Api {
                status,
                message,
                raw_body,
            } => {
                assert_eq!(status, 500);
                assert_eq!(message, "HTTP 500");
                assert_eq!(raw_body, json!({}));
            }
            other => panic!("Expected Api error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_request_invalid_json_on_success_is_decode_error() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/v2/users")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("{not json")
            .create_async()
            .await;

        let client = client_for(&server);
        let err = client.get_users().await.unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
    }

    #[tokio::test]
    async fn test_connection_failure_is_transport_error() {
        let creds = Credentials::new("space", "k", Some("http://127.0.0.1:1/api/v2")).unwrap();
        let client = BacklogClient::with_rate_limit(creds, Duration::ZERO).unwrap();

        let err = client.get_myself().await.unwrap_err();
        assert!(matches!(err, ApiError::Transport(_)));
    }

    #[tokio::test]
    async fn test_body_sent_as_json() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/api/v2/issues/PROJ-1/comments")
            .match_query(api_key_matcher())
            .match_body(Matcher::Json(json!({"content": "Looks good"})))
            .with_status(201)
            .with_body(r#"{"id":42,"content":"Looks good"}"#)
            .create_async()
            .await;

        let client = client_for(&server);
        let comment = client
            .add_issue_comment("PROJ-1", &json!({"content": "Looks good"}))
            .await
            .unwrap();

        assert_eq!(comment.id, 42);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_get_issues_sends_repeated_array_params() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/api/v2/issues")
            .match_query(Matcher::Regex(
                r"^apiKey=test-key&assigneeId(%5B%5D|\[\])=1&assigneeId(%5B%5D|\[\])=2&assigneeId(%5B%5D|\[\])=3$"
                    .into(),
            ))
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;

        let client = client_for(&server);
        let issues = client
            .get_issues(&Query::new().param("assigneeId[]", vec![1, 2, 3]))
            .await
            .unwrap();

        assert!(issues.is_empty());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_bound_paths_and_methods() {
        let mut server = Server::new_async().await;
        let cases = [
            ("PATCH", "/api/v2/projects/12/versions/3", r#"{"id":3,"name":"v1"}"#),
            ("DELETE", "/api/v2/issues/PROJ-1/comments/9", r#"{"id":9}"#),
            ("GET", "/api/v2/users/5/watchings/count", r#"{"count":4}"#),
            ("POST", "/api/v2/notifications/markAsRead", r#"{"count":0}"#),
        ];
        let mut mocks = Vec::new();
        for (method, path, body) in cases {
            mocks.push(
                server
                    .mock(method, path)
                    .match_query(api_key_matcher())
                    .with_status(200)
                    .with_body(body)
                    .create_async()
                    .await,
            );
        }

        let client = client_for(&server);
        let version = client
            .update_version(12, 3, &json!({"name": "v1"}))
            .await
            .unwrap();
        assert_eq!(version["name"], "v1");
        let comment = client.delete_issue_comment("PROJ-1", 9).await.unwrap();
        assert_eq!(comment["id"], 9);
        assert_eq!(client.get_watching_count(5).await.unwrap().count, 4);
        assert_eq!(
            client.reset_unread_notification_count().await.unwrap().count,
            0
        );

        for mock in mocks {
            mock.assert_async().await;
        }
    }

    #[tokio::test]
    async fn test_consecutive_requests_are_spaced() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/v2/priorities")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("[]")
            .expect(3)
            .create_async()
            .await;

        let endpoint = format!("{}/api/v2", server.url());
        let creds = Credentials::new("space", API_KEY, Some(&endpoint)).unwrap();
        let client = BacklogClient::with_rate_limit(creds, Duration::from_millis(50)).unwrap();

        let start = std::time::Instant::now();
        for _ in 0..3 {
            client.get_priorities().await.unwrap();
        }
        assert!(start.elapsed() >= Duration::from_millis(100));
    }
}
