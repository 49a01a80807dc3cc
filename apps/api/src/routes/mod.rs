pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::ranking::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        // Browser flow
        .route("/", get(handlers::handle_index))
        .route("/upload", post(handlers::handle_upload))
        // Ranking API
        .route("/api/v1/evaluate", post(handlers::handle_evaluate))
        .route("/api/v1/evaluate/text", post(handlers::handle_evaluate_text))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
