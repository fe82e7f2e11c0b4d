pub mod health;

use axum::{extract::DefaultBodyLimit, routing::get, routing::post, Router};

use crate::generation::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let upload_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        .route(
            "/api/v1/cold-email",
            post(handlers::handle_generate).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route(
            "/api/v1/cold-email/download",
            post(handlers::handle_download),
        )
        .with_state(state)
}
