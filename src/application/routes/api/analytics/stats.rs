use axum::Json;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use chrono::{Datelike, NaiveDate};
use serde::Deserialize;

use crate::application::auth::AuthenticatedUser;
use crate::application::errors::ApiError;
use crate::application::routes::support::QueryPayload;
use crate::application::state::AppState;
use crate::domain::streak::DEFAULT_RECENT_DAYS;
use crate::domain::today;

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RangeQuery {
    #[serde(default)]
    from: Option<NaiveDate>,
    #[serde(default)]
    to: Option<NaiveDate>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct StreakQuery {
    #[serde(default)]
    days: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct YearlyQuery {
    #[serde(default)]
    year: Option<i32>,
    #[serde(default)]
    compare: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct CalendarQuery {
    #[serde(default)]
    year: Option<i32>,
    #[serde(default)]
    month: Option<u32>,
}

#[tracing::instrument(skip(state, auth_user))]
pub(crate) async fn period_stats(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    QueryPayload(query): QueryPayload<RangeQuery>,
) -> Result<Response, ApiError> {
    let stats = state
        .stats_service
        .period_stats(auth_user.id(), query.from, query.to)
        .await?;
    Ok(Json(stats).into_response())
}

#[tracing::instrument(skip(state, auth_user))]
pub(crate) async fn streak(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    QueryPayload(query): QueryPayload<StreakQuery>,
) -> Result<Response, ApiError> {
    let overview = state
        .stats_service
        .streak_overview(auth_user.id(), query.days.unwrap_or(DEFAULT_RECENT_DAYS))
        .await?;
    Ok(Json(overview).into_response())
}

#[tracing::instrument(skip(state, auth_user))]
pub(crate) async fn daily(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    QueryPayload(query): QueryPayload<RangeQuery>,
) -> Result<Response, ApiError> {
    let days = state
        .stats_service
        .daily_breakdown(auth_user.id(), query.from, query.to)
        .await?;
    Ok(Json(days).into_response())
}

#[tracing::instrument(skip(state, auth_user))]
pub(crate) async fn genres(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    QueryPayload(query): QueryPayload<RangeQuery>,
) -> Result<Response, ApiError> {
    let breakdown = state
        .stats_service
        .genres(auth_user.id(), query.from, query.to)
        .await?;
    Ok(Json(breakdown).into_response())
}

#[tracing::instrument(skip(state, auth_user))]
pub(crate) async fn yearly(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    QueryPayload(query): QueryPayload<YearlyQuery>,
) -> Result<Response, ApiError> {
    let year = query.year.unwrap_or_else(|| today().year());
    let breakdown = state
        .stats_service
        .yearly(auth_user.id(), year, query.compare.unwrap_or(false))
        .await?;
    Ok(Json(breakdown).into_response())
}

#[tracing::instrument(skip(state, auth_user))]
pub(crate) async fn calendar(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    QueryPayload(query): QueryPayload<CalendarQuery>,
) -> Result<Response, ApiError> {
    let today = today();
    let calendar = state
        .stats_service
        .calendar(
            auth_user.id(),
            query.year.unwrap_or_else(|| today.year()),
            query.month.unwrap_or_else(|| today.month()),
        )
        .await?;
    Ok(Json(calendar).into_response())
}
