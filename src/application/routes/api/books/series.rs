use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::application::auth::AuthenticatedUser;
use crate::application::errors::ApiError;
use crate::application::routes::support::JsonPayload;
use crate::application::state::AppState;
use crate::domain::ids::SeriesId;
use crate::domain::series::NewSeries;

#[tracing::instrument(skip(state, auth_user))]
pub(crate) async fn list_series(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
) -> Result<Response, ApiError> {
    let series = state.series_service.list(auth_user.id()).await?;
    Ok(Json(series).into_response())
}

#[tracing::instrument(skip(state, auth_user, payload))]
pub(crate) async fn create_series(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    JsonPayload(payload): JsonPayload<NewSeries>,
) -> Result<Response, ApiError> {
    let series = state.series_service.create(auth_user.id(), payload).await?;
    Ok((StatusCode::CREATED, Json(series)).into_response())
}

#[tracing::instrument(skip(state, auth_user))]
pub(crate) async fn delete_series(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(id): Path<SeriesId>,
) -> Result<StatusCode, ApiError> {
    state.series_service.delete(auth_user.id(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}
