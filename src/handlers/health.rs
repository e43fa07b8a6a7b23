use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;

use crate::error::ApiError;
use crate::state::AppState;

/// GET /health - liveness plus a store connectivity probe
pub async fn health(State(state): State<AppState>) -> Response {
    let now = chrono::Utc::now();

    match state.store.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "timestamp": now,
                "store": "ok",
                "backend": state.store.name(),
            })),
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Health check failed for {} store: {}", state.store.name(), e);
            let err = ApiError::service_unavailable("Document store unavailable");
            (
                err.status_code(),
                Json(json!({
                    "status": "degraded",
                    "timestamp": now,
                    "store": "unavailable",
                    "backend": state.store.name(),
                    "error": err.message(),
                    "code": err.error_code(),
                })),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use crate::testing::{failing_router, send, TestApp};

    #[tokio::test]
    async fn healthy_store_reports_ok() {
        let res = TestApp::new().get("/health").await;
        assert_eq!(res.status, StatusCode::OK);
        assert_eq!(res.body["status"], "ok");
        assert_eq!(res.body["store"], "ok");
        assert_eq!(res.body["backend"], "memory");
    }

    #[tokio::test]
    async fn failing_store_reports_unavailable() {
        let request = axum::http::Request::builder()
            .uri("/health")
            .body(axum::body::Body::empty())
            .unwrap();

        let res = send(failing_router(), request).await;
        assert_eq!(res.status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(res.body["status"], "degraded");
        assert_eq!(res.body["code"], "SERVICE_UNAVAILABLE");
    }
}
