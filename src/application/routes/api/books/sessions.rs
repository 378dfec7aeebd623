use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use crate::application::auth::AuthenticatedUser;
use crate::application::errors::ApiError;
use crate::application::routes::support::{JsonPayload, QueryPayload};
use crate::application::state::AppState;
use crate::domain::ids::{BookId, SessionId};
use crate::domain::sessions::NewSession;

#[derive(Debug, Default, Deserialize)]
pub(crate) struct SessionListQuery {
    #[serde(default)]
    book_id: Option<BookId>,
}

#[tracing::instrument(skip(state, auth_user))]
pub(crate) async fn list_sessions(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    QueryPayload(query): QueryPayload<SessionListQuery>,
) -> Result<Response, ApiError> {
    let sessions = state
        .session_service
        .list(auth_user.id(), query.book_id)
        .await?;
    Ok(Json(sessions).into_response())
}

/// Sessions for one book. An unknown book is a 404 rather than an empty list.
#[tracing::instrument(skip(state, auth_user))]
pub(crate) async fn list_book_sessions(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(book_id): Path<BookId>,
) -> Result<Response, ApiError> {
    state.book_service.get(auth_user.id(), book_id).await?;
    let sessions = state
        .session_service
        .list(auth_user.id(), Some(book_id))
        .await?;
    Ok(Json(sessions).into_response())
}

#[tracing::instrument(skip(state, auth_user, payload))]
pub(crate) async fn create_session(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    JsonPayload(payload): JsonPayload<NewSession>,
) -> Result<Response, ApiError> {
    let result = state
        .session_service
        .record(auth_user.id(), payload)
        .await?;
    Ok((StatusCode::CREATED, Json(result)).into_response())
}

#[tracing::instrument(skip(state, auth_user))]
pub(crate) async fn get_session(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(id): Path<SessionId>,
) -> Result<Response, ApiError> {
    let session = state.session_service.get(auth_user.id(), id).await?;
    Ok(Json(session).into_response())
}

#[tracing::instrument(skip(state, auth_user))]
pub(crate) async fn delete_session(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(id): Path<SessionId>,
) -> Result<StatusCode, ApiError> {
    state.session_service.delete(auth_user.id(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}
