pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::analysis::documents::MAX_DOCUMENT_BYTES;
use crate::analysis::handlers;
use crate::state::AppState;

/// Two maximal uploads plus room for multipart framing or base64 expansion.
const MAX_BODY_BYTES: usize = MAX_DOCUMENT_BYTES * 3;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/analyze", post(handlers::handle_analyze_upload))
        .route(
            "/api/v1/analyze/encoded",
            post(handlers::handle_analyze_encoded),
        )
        .route("/api/v1/analyze/text", post(handlers::handle_analyze_text))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(state)
}
