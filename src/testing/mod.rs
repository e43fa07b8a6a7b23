// testing/mod.rs - In-process router harness for unit tests
//
// Builds the real router over a MemoryStore and drives it with
// tower::ServiceExt::oneshot, so no port or database is needed.

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Map, Value};
use tower::ServiceExt;

use crate::auth::{generate_jwt, Claims};
use crate::config::AppConfig;
use crate::database::{DocPath, Document, DocumentStore, MemoryStore, StoreError};
use crate::server::app;
use crate::state::AppState;

pub struct TestApp {
    pub router: Router,
    pub store: MemoryStore,
    pub config: AppConfig,
}

/// Development config with a missing asset dir, so the fallback always reaches the page handler
pub fn test_config() -> AppConfig {
    let mut config = AppConfig::development();
    config.site.asset_dir = "target/no-such-asset-dir".to_string();
    config.api.enable_request_logging = false;
    config
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    pub fn with_config(config: AppConfig) -> Self {
        let store = MemoryStore::new();
        let state = AppState::new(Arc::new(store.clone()), config.clone());
        Self {
            router: app(state),
            store,
            config,
        }
    }

    /// Caller-match enforcement on, as in staging and production
    pub fn enforcing() -> Self {
        let mut config = test_config();
        config.security.enforce_caller_match = true;
        Self::with_config(config)
    }

    pub fn token_for(&self, user_id: &str) -> String {
        let claims = Claims::new(user_id, Some(format!("{}@example.com", user_id)), 1);
        generate_jwt(&claims, &self.config.security).expect("test token")
    }

    pub async fn seed_user(&self, user_id: &str, email: &str) {
        let mut data = Map::new();
        data.insert("id".into(), json!(user_id));
        data.insert("email".into(), json!(email));
        data.insert("createdAt".into(), json!("2024-01-01T00:00:00Z"));
        self.store
            .set(&DocPath::user(user_id).unwrap(), data)
            .await
            .unwrap();
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        send(self.router.clone(), request).await
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.request(Method::GET, uri, None, None).await
    }
}

pub async fn send(router: Router, request: Request<Body>) -> TestResponse {
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let location = response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

    TestResponse { status, location, body }
}

#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub location: Option<String>,
    pub body: Value,
}

/// Store whose every operation fails, for 500/503 paths
pub struct FailingStore;

#[async_trait]
impl DocumentStore for FailingStore {
    fn name(&self) -> &'static str {
        "failing"
    }

    async fn get(&self, _path: &DocPath) -> Result<Option<Document>, StoreError> {
        Err(StoreError::Backend("connection refused".to_string()))
    }

    async fn set(&self, _path: &DocPath, _data: Map<String, Value>) -> Result<(), StoreError> {
        Err(StoreError::Backend("connection refused".to_string()))
    }

    async fn list(&self, _collection: &DocPath) -> Result<Vec<Document>, StoreError> {
        Err(StoreError::Backend("connection refused".to_string()))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Err(StoreError::Backend("connection refused".to_string()))
    }
}

pub fn failing_router() -> Router {
    app(AppState::new(Arc::new(FailingStore), test_config()))
}
