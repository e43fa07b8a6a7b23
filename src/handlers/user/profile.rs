use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::database::models::{ProfileUpdate, ProvisionProfile, UserProfile};
use crate::database::DocPath;
use crate::error::ApiError;
use crate::middleware::{authorize_caller, ApiJson, ApiResponse, ApiResult, AuthSession};
use crate::state::AppState;

use super::{require_user_id, session_ref, to_document};

#[derive(Debug, Deserialize)]
pub struct UserQuery {
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
}

/// GET /api/user?userId=<id> - fetch a profile by query parameter
pub async fn get_by_query(
    State(state): State<AppState>,
    session: Option<Extension<AuthSession>>,
    Query(query): Query<UserQuery>,
) -> ApiResult<Value> {
    fetch_profile(&state, session_ref(&session), query.user_id.as_deref()).await
}

/// GET /api/user/:user_id - fetch a profile by path
pub async fn get(
    State(state): State<AppState>,
    session: Option<Extension<AuthSession>>,
    Path(user_id): Path<String>,
) -> ApiResult<Value> {
    fetch_profile(&state, session_ref(&session), Some(&user_id)).await
}

async fn fetch_profile(
    state: &AppState,
    session: Option<&AuthSession>,
    user_id: Option<&str>,
) -> ApiResult<Value> {
    let user_id = require_user_id(user_id)?;
    authorize_caller(&state.config.security, session, user_id)?;

    let path = DocPath::user(user_id)?;
    match state.store.get(&path).await? {
        Some(doc) => Ok(ApiResponse::success(doc.into_value())),
        None => Err(ApiError::not_found("User not found")),
    }
}

/// PUT /api/user/:user_id - create or replace a profile (identity provider sync)
pub async fn put(
    State(state): State<AppState>,
    session: Option<Extension<AuthSession>>,
    Path(user_id): Path<String>,
    ApiJson(body): ApiJson<ProvisionProfile>,
) -> ApiResult<Value> {
    let user_id = require_user_id(Some(&user_id))?;
    authorize_caller(&state.config.security, session_ref(&session), user_id)?;

    if body.email.trim().is_empty() {
        return Err(ApiError::bad_request("Email is required"));
    }

    let path = DocPath::user(user_id)?;
    let existing = state.store.get(&path).await?;
    let now = Utc::now();

    // Keep the original creation time across re-provisioning
    let created_at = existing
        .as_ref()
        .and_then(|doc| doc.data.get("createdAt"))
        .and_then(Value::as_str)
        .and_then(|s| s.parse::<DateTime<Utc>>().ok())
        .unwrap_or(now);

    let mut profile = UserProfile::provisioned(user_id, body, created_at);
    if existing.is_some() {
        profile.updated_at = Some(now);
    }

    let mut doc = to_document(&profile)?;
    // Embedded goals belong to the user, not the identity provider
    if let Some(goals) = existing.as_ref().and_then(|doc| doc.data.get("goals")) {
        doc.insert("goals".into(), goals.clone());
    }

    state.store.set(&path, doc.clone()).await?;
    tracing::info!("Provisioned user profile: {}", user_id);

    let body = Value::Object(doc);
    if existing.is_some() {
        Ok(ApiResponse::success(body))
    } else {
        Ok(ApiResponse::with_status(body, StatusCode::CREATED))
    }
}

/// PATCH /api/user/:user_id - merge profile fields into an existing document
pub async fn patch(
    State(state): State<AppState>,
    session: Option<Extension<AuthSession>>,
    Path(user_id): Path<String>,
    ApiJson(update): ApiJson<ProfileUpdate>,
) -> ApiResult<Value> {
    let user_id = require_user_id(Some(&user_id))?;
    authorize_caller(&state.config.security, session_ref(&session), user_id)?;

    if update.is_empty() {
        return Err(ApiError::bad_request("No profile fields to update"));
    }
    if update.email.as_deref().is_some_and(|email| email.trim().is_empty()) {
        return Err(ApiError::bad_request("Email cannot be empty"));
    }

    let path = DocPath::user(user_id)?;
    let mut doc = state
        .store
        .get(&path)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    if let Some(email) = update.email {
        doc.data.insert("email".into(), Value::String(email));
    }
    if let Some(first_name) = update.first_name {
        doc.data.insert("firstName".into(), Value::String(first_name));
    }
    if let Some(last_name) = update.last_name {
        doc.data.insert("lastName".into(), Value::String(last_name));
    }
    doc.data.insert("updatedAt".into(), json!(Utc::now()));

    state.store.set(&path, doc.data.clone()).await?;
    Ok(ApiResponse::success(doc.into_value()))
}
