//! HTTP client for the group-messaging provider.
//!
//! The provider exposes an ad hoc REST shape: `POST {base}/groups` creates a
//! group and returns its id, `POST {base}/groups/{id}/participants` adds
//! numbers to it, reporting per-number rejections in an optional `failed`
//! list. Both calls carry a bearer token. The shape is consumed here, not
//! owned; nothing is retried automatically.

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use serde_json::{json, Value};
use std::fmt;
use thiserror::Error;
use tracing::debug;

/// Maximum response-body length carried inside error messages.
const MAX_ERROR_BODY_LENGTH: usize = 500;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("unauthorized - check the API key")]
    Unauthorized,

    #[error("access denied: {0}")]
    AccessDenied(String),

    #[error("resource not found: {0}")]
    NotFound(String),

    #[error("rate limited - wait before retrying")]
    RateLimited,

    #[error("server error: {0}")]
    ServerError(String),

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl ApiError {
    fn truncate_body(body: &str) -> String {
        if body.chars().count() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let head: String = body.chars().take(MAX_ERROR_BODY_LENGTH).collect();
            format!("{}... (truncated, {} total bytes)", head, body.len())
        }
    }

    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let truncated = Self::truncate_body(body);
        match status.as_u16() {
            401 => ApiError::Unauthorized,
            403 => ApiError::AccessDenied(truncated),
            404 => ApiError::NotFound(truncated),
            429 => ApiError::RateLimited,
            500..=599 => ApiError::ServerError(truncated),
            _ => ApiError::InvalidResponse(format!("status {}: {}", status, truncated)),
        }
    }
}

/// Outcome of an overall-successful add-participants call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddOutcome {
    /// Normalized numbers the provider rejected individually.
    pub failed: Vec<String>,
}

/// Seam between the flow layer and the HTTP client, so flows can be driven
/// against a scripted service in tests.
#[async_trait]
pub trait GroupService: Send + Sync {
    /// Create a group named `subject` with the admin as its first member and
    /// return the provider's group id.
    async fn create_group(&self, subject: &str, admin_phone: &str) -> Result<String, ApiError>;

    /// Add `phones` to an existing group.
    async fn add_participants(
        &self,
        group_id: &str,
        phones: &[String],
    ) -> Result<AddOutcome, ApiError>;
}

#[derive(Clone)]
pub struct GroupClient {
    http: Client,
    base_url: Url,
    token: String,
}

impl fmt::Debug for GroupClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GroupClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl GroupClient {
    pub fn new(base_url: Url, token: String) -> Self {
        let http = Client::builder()
            .user_agent("grupeta/0.1")
            .build()
            .expect("reqwest client");
        Self {
            http,
            base_url,
            token,
        }
    }

    /// Append path segments to the base URL; segments are percent-encoded, so
    /// an opaque group id is safe to pass through.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidResponse("provider URL cannot be a base".into()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    pub fn build_request(
        &self,
        segments: &[&str],
        body: &Value,
    ) -> Result<reqwest::Request, ApiError> {
        let endpoint = self.endpoint(segments)?;
        self.http
            .post(endpoint)
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
            .json(body)
            .build()
            .map_err(ApiError::from)
    }

    async fn execute(&self, segments: &[&str], body: Value) -> Result<String, ApiError> {
        let request = self.build_request(segments, &body)?;
        debug!(url = %request.url(), payload = %body, "sending provider request");
        let res = self.http.execute(request).await?;

        let status = res.status();
        let text = res.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(ApiError::from_status(status, &text));
        }
        Ok(text)
    }
}

#[async_trait]
impl GroupService for GroupClient {
    async fn create_group(&self, subject: &str, admin_phone: &str) -> Result<String, ApiError> {
        let body = build_create_group_body(subject, admin_phone);
        let text = self.execute(&["groups"], body).await?;

        let payload: CreateGroupResponse = serde_json::from_str(&text)
            .map_err(|_| ApiError::InvalidResponse(ApiError::truncate_body(&text)))?;
        if payload.id.trim().is_empty() {
            return Err(ApiError::InvalidResponse("response carried no group id".into()));
        }
        Ok(payload.id)
    }

    async fn add_participants(
        &self,
        group_id: &str,
        phones: &[String],
    ) -> Result<AddOutcome, ApiError> {
        let body = build_add_participants_body(phones);
        let text = self
            .execute(&["groups", group_id, "participants"], body)
            .await?;

        // The success body is optional; absent or unparsable means no
        // per-number failures.
        let failed = serde_json::from_str::<AddResponse>(&text)
            .map(|r| r.failed)
            .unwrap_or_default();
        Ok(AddOutcome { failed })
    }
}

pub fn build_create_group_body(subject: &str, admin_phone: &str) -> Value {
    json!({
        "participants": [admin_phone],
        "subject": subject,
    })
}

pub fn build_add_participants_body(phones: &[String]) -> Value {
    json!({ "participants": phones })
}

#[derive(Deserialize)]
struct CreateGroupResponse {
    id: String,
}

#[derive(Deserialize, Default)]
struct AddResponse {
    #[serde(default)]
    failed: Vec<String>,
}
