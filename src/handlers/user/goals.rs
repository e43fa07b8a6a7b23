use axum::{
    extract::{Path, State},
    Extension,
};
use serde_json::Value;

use crate::database::models::{CreateGoalRequest, Goal, GoalStatus, GoalSummary};
use crate::database::DocPath;
use crate::error::ApiError;
use crate::middleware::{authorize_caller, ApiJson, ApiResponse, ApiResult, AuthSession};
use crate::state::AppState;

use super::{require_user_id, session_ref, to_document};

/// POST /api/user/:user_id/goals - create one goal, body `{ userId, goal: { title, ... } }`
///
/// Not idempotent: a retried request creates a second goal.
pub async fn create(
    State(state): State<AppState>,
    session: Option<Extension<AuthSession>>,
    Path(path_user_id): Path<String>,
    ApiJson(body): ApiJson<CreateGoalRequest>,
) -> ApiResult<Goal> {
    let user_id = body
        .user_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ApiError::bad_request("Invalid request"))?;
    let new_goal = body.goal.ok_or_else(|| ApiError::bad_request("Invalid request"))?;

    if user_id != path_user_id.trim() {
        return Err(ApiError::bad_request("userId does not match the request path"));
    }
    authorize_caller(&state.config.security, session_ref(&session), user_id)?;

    let collection = DocPath::goals(user_id)?;
    let doc_path = state.store.new_doc(&collection)?;
    let goal = new_goal
        .into_goal(doc_path.id().to_string())
        .ok_or_else(|| ApiError::bad_request("Goal title is required"))?;

    tracing::info!("Creating goal for user: {} Goal: {}", user_id, goal.title);
    state.store.set(&doc_path, to_document(&goal)?).await?;
    tracing::info!("Goal created: {}", goal.id);

    Ok(ApiResponse::created(goal))
}

/// GET /api/user/:user_id/goals - every goal owned by the user, order not guaranteed
pub async fn list(
    State(state): State<AppState>,
    session: Option<Extension<AuthSession>>,
    Path(user_id): Path<String>,
) -> ApiResult<Vec<Value>> {
    let user_id = require_user_id(Some(&user_id))?;
    authorize_caller(&state.config.security, session_ref(&session), user_id)?;

    let documents = state.store.list(&DocPath::goals(user_id)?).await?;
    let goals = documents
        .into_iter()
        .map(|doc| {
            let mut data = doc.data;
            data.insert("id".into(), Value::String(doc.id));
            Value::Object(data)
        })
        .collect();

    Ok(ApiResponse::success(goals))
}

/// GET /api/user/:user_id/goals/summary - goal counts by status
pub async fn summary(
    State(state): State<AppState>,
    session: Option<Extension<AuthSession>>,
    Path(user_id): Path<String>,
) -> ApiResult<GoalSummary> {
    let user_id = require_user_id(Some(&user_id))?;
    authorize_caller(&state.config.security, session_ref(&session), user_id)?;

    let documents = state.store.list(&DocPath::goals(user_id)?).await?;
    let statuses = documents.iter().filter_map(|doc| match doc.data.get("status") {
        None | Some(Value::Null) => Some(GoalStatus::default()),
        Some(value) => {
            let status = value.as_str().and_then(GoalStatus::from_label);
            if status.is_none() {
                tracing::warn!("Goal {} for user {} has unrecognized status {}", doc.id, user_id, value);
            }
            status
        }
    });

    Ok(ApiResponse::success(GoalSummary::from_statuses(statuses)))
}
