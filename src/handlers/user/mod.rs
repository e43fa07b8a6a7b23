// handlers/user/mod.rs - User profile and goal resource handlers
//
// Every handler validates the caller-supplied user id itself, independent of
// the route gate, which never forces authentication on /api paths.

pub mod goals;
pub mod profile;

use axum::Extension;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::database::StoreError;
use crate::error::ApiError;
use crate::middleware::AuthSession;

// Re-export handler functions for use in routing
pub use goals::create as goals_create;
pub use goals::list as goals_list;
pub use goals::summary as goals_summary;

pub use profile::get as profile_get;
pub use profile::get_by_query as profile_get_by_query;
pub use profile::patch as profile_patch;
pub use profile::put as profile_put;

/// Trimmed caller id, or 401 when absent
pub(crate) fn require_user_id(raw: Option<&str>) -> Result<&str, ApiError> {
    match raw.map(str::trim) {
        Some(id) if !id.is_empty() => Ok(id),
        _ => {
            tracing::warn!("Unauthorized access attempt without userId");
            Err(ApiError::unauthorized("Unauthorized"))
        }
    }
}

pub(crate) fn session_ref(session: &Option<Extension<AuthSession>>) -> Option<&AuthSession> {
    session.as_ref().map(|Extension(session)| session)
}

/// Serialize a model into the JSON object body the store expects
pub(crate) fn to_document<T: Serialize>(value: &T) -> Result<Map<String, Value>, ApiError> {
    match serde_json::to_value(value).map_err(StoreError::from)? {
        Value::Object(map) => Ok(map),
        _ => Err(StoreError::NotAnObject("response model".to_string()).into()),
    }
}
