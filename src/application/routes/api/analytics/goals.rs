use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::application::auth::AuthenticatedUser;
use crate::application::errors::ApiError;
use crate::application::routes::support::JsonPayload;
use crate::application::state::AppState;
use crate::domain::goals::GoalTargets;

#[tracing::instrument(skip(state, auth_user))]
pub(crate) async fn get_goal(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(year): Path<i32>,
) -> Result<Response, ApiError> {
    let progress = state.goal_service.progress(auth_user.id(), year).await?;
    Ok(Json(progress).into_response())
}

#[tracing::instrument(skip(state, auth_user, payload))]
pub(crate) async fn put_goal(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(year): Path<i32>,
    JsonPayload(payload): JsonPayload<GoalTargets>,
) -> Result<Response, ApiError> {
    let goal = state
        .goal_service
        .upsert(auth_user.id(), year, payload)
        .await?;
    Ok(Json(goal).into_response())
}

#[tracing::instrument(skip(state, auth_user))]
pub(crate) async fn delete_goal(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(year): Path<i32>,
) -> Result<StatusCode, ApiError> {
    state.goal_service.delete(auth_user.id(), year).await?;
    Ok(StatusCode::NO_CONTENT)
}
