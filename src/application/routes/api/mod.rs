pub(crate) mod analytics;
pub(crate) mod books;

// Re-exports
pub(crate) use analytics::{goals, stats};
pub(crate) use books::{books as book_routes, series, sessions};

use axum::Json;
use axum::response::IntoResponse;
use axum::routing::{delete, get};
use serde_json::json;

use crate::application::state::AppState;

pub(super) fn router() -> axum::Router<AppState> {
    entity_routes()
        .merge(stats_routes())
        .route("/health", get(health))
}

fn entity_routes() -> axum::Router<AppState> {
    axum::Router::new()
        .route(
            "/books",
            get(book_routes::list_books).post(book_routes::create_book),
        )
        .route("/books/tags", get(book_routes::list_tags))
        .route(
            "/books/{id}",
            get(book_routes::get_book)
                .put(book_routes::update_book)
                .delete(book_routes::delete_book),
        )
        .route("/books/{id}/sessions", get(sessions::list_book_sessions))
        .route(
            "/sessions",
            get(sessions::list_sessions).post(sessions::create_session),
        )
        .route(
            "/sessions/{id}",
            get(sessions::get_session).delete(sessions::delete_session),
        )
        .route(
            "/series",
            get(series::list_series).post(series::create_series),
        )
        .route("/series/{id}", delete(series::delete_series))
}

fn stats_routes() -> axum::Router<AppState> {
    axum::Router::new()
        .route("/stats", get(stats::period_stats))
        .route("/stats/streak", get(stats::streak))
        .route("/stats/genres", get(stats::genres))
        .route("/stats/daily", get(stats::daily))
        .route("/stats/yearly", get(stats::yearly))
        .route("/stats/calendar", get(stats::calendar))
        .route(
            "/goals/{year}",
            get(goals::get_goal)
                .put(goals::put_goal)
                .delete(goals::delete_goal),
        )
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}
