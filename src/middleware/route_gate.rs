use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use super::auth::{resolve_session, AuthSession};
use crate::config::SiteConfig;
use crate::routing::RouteClass;
use crate::state::AppState;

/// Request-time gate applied to the whole router.
///
/// Excluded paths skip the gate entirely. Every other request gets an
/// `AuthSession` extension; protected pages additionally require it to be
/// authenticated and are challenged with a sign-in redirect otherwise.
pub async fn route_gate_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let raw_path = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());

    let class = state.classifier.classify(&raw_path);
    if class == RouteClass::Excluded {
        return next.run(request).await;
    }

    let session = resolve_session(request.headers(), &state.config.security);

    if class.is_protected() && !session.is_authenticated() {
        tracing::warn!("Unauthenticated request for protected page {}, challenging", raw_path);
        return sign_in_challenge(&state.config.site, &raw_path);
    }

    tracing::debug!(
        "Gate passed {} ({}, authenticated: {})",
        raw_path,
        class.label(),
        session.is_authenticated()
    );

    request.extensions_mut().insert::<AuthSession>(session);
    next.run(request).await
}

/// Redirect to the sign-in flow, remembering where the caller was headed
pub fn sign_in_challenge(site: &SiteConfig, raw_path: &str) -> Response {
    Redirect::temporary(&sign_in_location(site, raw_path)).into_response()
}

pub fn sign_in_location(site: &SiteConfig, raw_path: &str) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(raw_path.as_bytes()).collect();
    format!("{}?redirect_url={}", site.sign_in_path, encoded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{send, TestApp};
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};

    #[test]
    fn sign_in_location_encodes_original_path_and_query() {
        let site = SiteConfig::default();
        assert_eq!(
            sign_in_location(&site, "/application/dashboard?tab=goals"),
            "/sign-in?redirect_url=%2Fapplication%2Fdashboard%3Ftab%3Dgoals"
        );
    }

    #[tokio::test]
    async fn protected_page_without_session_is_challenged() {
        let app = TestApp::new();
        let res = app.get("/application/dashboard?tab=goals").await;

        assert_eq!(res.status, StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(
            res.location.as_deref(),
            Some("/sign-in?redirect_url=%2Fapplication%2Fdashboard%3Ftab%3Dgoals")
        );
    }

    #[tokio::test]
    async fn protected_page_with_bearer_session_proceeds() {
        let app = TestApp::new();
        let token = app.token_for("u1");
        let res = app
            .request(axum::http::Method::GET, "/application/dashboard", Some(&token), None)
            .await;

        assert_eq!(res.status, StatusCode::OK);
        assert_eq!(res.body["path"], "/application/dashboard");
        assert_eq!(res.body["protected"], true);
    }

    #[tokio::test]
    async fn protected_page_with_session_cookie_proceeds() {
        let app = TestApp::new();
        let cookie = format!("{}={}", app.config.security.session_cookie, app.token_for("u1"));
        let request = Request::builder()
            .uri("/application/user-page")
            .header(header::COOKIE, cookie)
            .body(Body::empty())
            .unwrap();

        let res = send(app.router.clone(), request).await;
        assert_eq!(res.status, StatusCode::OK);
    }

    #[tokio::test]
    async fn forged_token_is_challenged() {
        let app = TestApp::new();
        let res = app
            .request(axum::http::Method::GET, "/application", Some("not-a-jwt"), None)
            .await;
        assert_eq!(res.status, StatusCode::TEMPORARY_REDIRECT);
    }

    #[tokio::test]
    async fn prefix_match_is_literal_and_case_sensitive() {
        let app = TestApp::new();

        let res = app.get("/applications").await;
        assert_eq!(res.status, StatusCode::TEMPORARY_REDIRECT);

        // Public page route that simply does not exist
        let res = app.get("/Application").await;
        assert_eq!(res.status, StatusCode::NOT_FOUND);
        assert!(res.location.is_none());
    }

    #[tokio::test]
    async fn public_pages_never_challenge() {
        let app = TestApp::new();
        let res = app.get("/public/app-info").await;
        assert_eq!(res.status, StatusCode::OK);
        assert_eq!(res.body["protected"], false);

        assert_eq!(app.get("/").await.status, StatusCode::OK);
    }

    #[tokio::test]
    async fn excluded_assets_bypass_the_gate() {
        let app = TestApp::new();

        for path in ["/application/logo.png", "/_next/static/chunks/main.js", "/application/site.webmanifest"] {
            let res = app.get(path).await;
            assert_eq!(res.status, StatusCode::NOT_FOUND, "{}", path);
            assert!(res.location.is_none(), "{} was challenged", path);
        }
    }

    #[tokio::test]
    async fn image_endpoint_is_gated_like_a_page() {
        let app = TestApp::new();
        let res = app.get("/_next/image?url=%2Flogo.png").await;
        assert_eq!(res.status, StatusCode::NOT_FOUND);
        assert!(res.location.is_none());
    }

    #[tokio::test]
    async fn api_routes_are_never_challenged() {
        let app = TestApp::new();
        let res = app.get("/api/user/u1").await;

        assert_eq!(res.status, StatusCode::NOT_FOUND);
        assert!(res.location.is_none());
        assert_eq!(res.body["error"], "User not found");
    }
}
