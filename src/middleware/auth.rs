use axum::http::{header, HeaderMap};
use axum_extra::extract::cookie::CookieJar;

use crate::auth::{validate_jwt, Claims};
use crate::config::SecurityConfig;
use crate::error::ApiError;

/// Authenticated caller context extracted from the session token
#[derive(Clone, Debug, PartialEq)]
pub struct SessionUser {
    pub user_id: String,
    pub email: Option<String>,
}

impl From<Claims> for SessionUser {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.sub,
            email: claims.email,
        }
    }
}

/// Request extension attached by the route gate for every non-excluded request.
/// `None` means the caller is not signed in.
#[derive(Clone, Debug, Default)]
pub struct AuthSession(pub Option<SessionUser>);

impl AuthSession {
    pub fn user(&self) -> Option<&SessionUser> {
        self.0.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.0.is_some()
    }
}

/// Resolve the caller's session from the Authorization header or session cookie.
/// Any missing, malformed, or unverifiable token yields an anonymous session.
pub fn resolve_session(headers: &HeaderMap, security: &SecurityConfig) -> AuthSession {
    let token = match extract_jwt_from_headers(headers, &security.session_cookie) {
        Ok(token) => token,
        Err(msg) => {
            tracing::trace!("No session token: {}", msg);
            return AuthSession(None);
        }
    };

    match validate_jwt(&token, security) {
        Ok(claims) => AuthSession(Some(SessionUser::from(claims))),
        Err(e) => {
            tracing::debug!("Rejected session token: {}", e);
            AuthSession(None)
        }
    }
}

/// Extract JWT token from the Authorization header, falling back to the session cookie
fn extract_jwt_from_headers(headers: &HeaderMap, cookie_name: &str) -> Result<String, String> {
    if let Some(auth_header) = headers.get(header::AUTHORIZATION) {
        let auth_str = auth_header
            .to_str()
            .map_err(|_| "Invalid Authorization header format".to_string())?;

        return match auth_str.strip_prefix("Bearer ") {
            Some(token) if !token.trim().is_empty() => Ok(token.trim().to_string()),
            Some(_) => Err("Empty JWT token".to_string()),
            None => Err("Authorization header must use Bearer token format".to_string()),
        };
    }

    let jar = CookieJar::from_headers(headers);
    match jar.get(cookie_name).map(|c| c.value().trim()) {
        Some(token) if !token.is_empty() => Ok(token.to_string()),
        _ => Err("Missing Authorization header and session cookie".to_string()),
    }
}

/// Check that the caller may act on `user_id`.
///
/// With `enforce_caller_match` off, any caller naming a user id is trusted.
pub fn authorize_caller(
    security: &SecurityConfig,
    session: Option<&AuthSession>,
    user_id: &str,
) -> Result<(), ApiError> {
    if !security.enforce_caller_match {
        return Ok(());
    }

    match session.and_then(AuthSession::user) {
        None => Err(ApiError::unauthorized("Unauthorized")),
        Some(user) if user.user_id == user_id => Ok(()),
        Some(user) => {
            tracing::warn!("Caller '{}' attempted to access user '{}'", user.user_id, user_id);
            Err(ApiError::forbidden("Forbidden"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::generate_jwt;
    use crate::config::AppConfig;
    use axum::http::HeaderValue;

    fn token_for(user_id: &str, security: &SecurityConfig) -> String {
        generate_jwt(&Claims::new(user_id, None, 1), security).unwrap()
    }

    #[test]
    fn bearer_header_resolves_session() {
        let security = AppConfig::development().security;
        let mut headers = HeaderMap::new();
        let value = format!("Bearer {}", token_for("u1", &security));
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(&value).unwrap());

        let session = resolve_session(&headers, &security);
        assert_eq!(session.user().map(|u| u.user_id.as_str()), Some("u1"));
    }

    #[test]
    fn session_cookie_resolves_session() {
        let security = AppConfig::development().security;
        let mut headers = HeaderMap::new();
        let value = format!("theme=dark; {}={}", security.session_cookie, token_for("u2", &security));
        headers.insert(header::COOKIE, HeaderValue::from_str(&value).unwrap());

        assert!(resolve_session(&headers, &security).is_authenticated());
    }

    #[test]
    fn malformed_header_is_anonymous() {
        let security = AppConfig::development().security;
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert!(!resolve_session(&headers, &security).is_authenticated());

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer not-a-jwt"));
        assert!(!resolve_session(&headers, &security).is_authenticated());

        assert!(!resolve_session(&HeaderMap::new(), &security).is_authenticated());
    }

    #[test]
    fn caller_match_is_only_enforced_when_enabled() {
        let mut security = AppConfig::development().security;
        let alice = AuthSession(Some(SessionUser { user_id: "alice".into(), email: None }));

        assert!(authorize_caller(&security, None, "bob").is_ok());

        security.enforce_caller_match = true;
        assert!(authorize_caller(&security, Some(&alice), "alice").is_ok());
        assert!(matches!(authorize_caller(&security, Some(&alice), "bob"), Err(ApiError::Forbidden(_))));
        assert!(matches!(authorize_caller(&security, None, "alice"), Err(ApiError::Unauthorized(_))));
        assert!(matches!(
            authorize_caller(&security, Some(&AuthSession(None)), "alice"),
            Err(ApiError::Unauthorized(_))
        ));
    }
}
