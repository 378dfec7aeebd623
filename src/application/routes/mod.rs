pub mod api;
pub mod support;

use axum::http::Request;
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::{DefaultOnResponse, MakeSpan, TraceLayer};
use tracing::{Level, Span};

use crate::application::state::AppState;

/// 1 MB request body limit.
const BODY_LIMIT_BYTES: usize = 1024 * 1024;

pub fn app_router(state: AppState) -> axum::Router {
    axum::Router::new()
        .nest("/api/v1", api::router())
        .layer(
            ServiceBuilder::new()
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(BokbadMakeSpan)
                        .on_response(DefaultOnResponse::new().level(Level::INFO)),
                )
                .layer(RequestBodyLimitLayer::new(BODY_LIMIT_BYTES))
                .layer(CompressionLayer::new().gzip(true)),
        )
        .with_state(state)
}

#[derive(Clone)]
struct BokbadMakeSpan;

impl<B> MakeSpan<B> for BokbadMakeSpan {
    fn make_span(&mut self, request: &Request<B>) -> Span {
        tracing::info_span!(
            "request",
            method = %request.method(),
            uri = %request.uri(),
            version = ?request.version(),
            user.id = tracing::field::Empty,
        )
    }
}
