use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use crate::application::auth::AuthenticatedUser;
use crate::application::errors::{ApiError, AppError};
use crate::application::routes::support::{JsonPayload, QueryPayload};
use crate::application::state::AppState;
use crate::domain::book_items::{BookFilter, BookStatus, NewBook, UpdateBook};
use crate::domain::ids::BookId;

#[derive(Debug, Default, Deserialize)]
pub(crate) struct BookListQuery {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    search: Option<String>,
    #[serde(default)]
    genre: Option<String>,
    #[serde(default)]
    topic: Option<String>,
}

#[tracing::instrument(skip(state, auth_user))]
pub(crate) async fn list_books(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    QueryPayload(query): QueryPayload<BookListQuery>,
) -> Result<Response, ApiError> {
    let status = match query.status.as_deref().filter(|s| !s.is_empty()) {
        Some(raw) => Some(
            raw.parse::<BookStatus>()
                .map_err(|()| AppError::validation(format!("unknown status: {raw}")))?,
        ),
        None => None,
    };
    let filter = BookFilter {
        status,
        search: query.search,
        genre: query.genre,
        topic: query.topic,
    };
    let books = state.book_service.list(auth_user.id(), filter).await?;
    Ok(Json(books).into_response())
}

#[tracing::instrument(skip(state, auth_user))]
pub(crate) async fn list_tags(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
) -> Result<Response, ApiError> {
    let tags = state.book_service.tags(auth_user.id()).await?;
    Ok(Json(tags).into_response())
}

#[tracing::instrument(skip(state, auth_user, payload))]
pub(crate) async fn create_book(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    JsonPayload(payload): JsonPayload<NewBook>,
) -> Result<Response, ApiError> {
    let book = state.book_service.create(auth_user.id(), payload).await?;
    Ok((StatusCode::CREATED, Json(book)).into_response())
}

#[tracing::instrument(skip(state, auth_user))]
pub(crate) async fn get_book(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(id): Path<BookId>,
) -> Result<Response, ApiError> {
    let book = state.book_service.get(auth_user.id(), id).await?;
    Ok(Json(book).into_response())
}

#[tracing::instrument(skip(state, auth_user, payload))]
pub(crate) async fn update_book(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(id): Path<BookId>,
    JsonPayload(payload): JsonPayload<UpdateBook>,
) -> Result<Response, ApiError> {
    let book = state
        .book_service
        .update(auth_user.id(), id, payload)
        .await?;
    Ok(Json(book).into_response())
}

#[tracing::instrument(skip(state, auth_user))]
pub(crate) async fn delete_book(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(id): Path<BookId>,
) -> Result<StatusCode, ApiError> {
    state.book_service.delete(auth_user.id(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}
