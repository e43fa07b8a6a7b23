// cli/client.rs - Typed HTTP client for the user and goal API
//
// Mirrors the pre-flight checks a browser front end performs before calling
// the API: no request leaves without a user id, and goals need a title.

use reqwest::{Method, RequestBuilder};
use serde_json::{json, Value};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Unauthorized")]
    Unauthorized,

    #[error("Invalid goal: {0}")]
    InvalidGoal(String),

    #[error("Invalid server URL: {0}")]
    InvalidServer(String),

    #[error("{message} (HTTP {status})")]
    Api { status: u16, message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> Result<Self, ClientError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        url::Url::parse(&base_url).map_err(|e| ClientError::InvalidServer(format!("{}: {}", base_url, e)))?;

        Ok(Self {
            http: reqwest::Client::new(),
            base_url,
            token: token.filter(|t| !t.trim().is_empty()),
        })
    }

    /// `{base}/api{path}`, adding the leading slash when missing
    pub fn build_api_url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}/api{}", self.base_url, path)
        } else {
            format!("{}/api/{}", self.base_url, path)
        }
    }

    pub async fn fetch_user_profile(&self, user_id: &str) -> Result<Value, ClientError> {
        let user_id = require_user_id(user_id)?;
        let query: String = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("userId", user_id)
            .finish();

        self.send(Method::GET, &format!("/user?{}", query), None).await
    }

    pub async fn provision_user(
        &self,
        user_id: &str,
        email: &str,
        first_name: Option<&str>,
        last_name: Option<&str>,
    ) -> Result<Value, ClientError> {
        let user_id = require_user_id(user_id)?;
        let mut body = json!({ "email": email });
        if let Some(first_name) = first_name {
            body["firstName"] = json!(first_name);
        }
        if let Some(last_name) = last_name {
            body["lastName"] = json!(last_name);
        }

        self.send(Method::PUT, &user_path(user_id, ""), Some(body)).await
    }

    pub async fn update_profile(&self, user_id: &str, changes: Value) -> Result<Value, ClientError> {
        let user_id = require_user_id(user_id)?;
        self.send(Method::PATCH, &user_path(user_id, ""), Some(changes)).await
    }

    /// Create a goal; `goal` must be a JSON object with a non-blank `title`
    pub async fn post_goal(&self, user_id: &str, goal: Value) -> Result<Value, ClientError> {
        let user_id = require_user_id(user_id)?;
        let has_title = goal
            .get("title")
            .and_then(Value::as_str)
            .is_some_and(|title| !title.trim().is_empty());
        if !goal.is_object() || !has_title {
            return Err(ClientError::InvalidGoal("title is required".to_string()));
        }

        let body = json!({ "userId": user_id, "goal": goal });
        self.send(Method::POST, &user_path(user_id, "/goals"), Some(body)).await
    }

    pub async fn list_goals(&self, user_id: &str) -> Result<Vec<Value>, ClientError> {
        let user_id = require_user_id(user_id)?;
        match self.send(Method::GET, &user_path(user_id, "/goals"), None).await? {
            Value::Array(goals) => Ok(goals),
            other => Err(ClientError::Api {
                status: 200,
                message: format!("expected a goal array, got {}", other),
            }),
        }
    }

    pub async fn goal_summary(&self, user_id: &str) -> Result<Value, ClientError> {
        let user_id = require_user_id(user_id)?;
        self.send(Method::GET, &user_path(user_id, "/goals/summary"), None).await
    }

    async fn send(&self, method: Method, path: &str, body: Option<Value>) -> Result<Value, ClientError> {
        let url = self.build_api_url(path);
        tracing::debug!("{} {}", method, url);

        let mut request: RequestBuilder = self.http.request(method, &url);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await?;
        let status = response.status();
        let payload: Value = response.json().await.unwrap_or(Value::Null);

        if status.is_success() {
            return Ok(payload);
        }

        let message = payload
            .get("error")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("Request failed").to_string());
        Err(ClientError::Api { status: status.as_u16(), message })
    }
}

fn require_user_id(user_id: &str) -> Result<&str, ClientError> {
    match user_id.trim() {
        "" => Err(ClientError::Unauthorized),
        id => Ok(id),
    }
}

fn user_path(user_id: &str, suffix: &str) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(user_id.as_bytes()).collect();
    format!("/user/{}{}", encoded, suffix)
}
