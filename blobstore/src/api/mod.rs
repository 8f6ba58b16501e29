pub mod middleware;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Router, middleware as axum_middleware};
use tower_http::trace::TraceLayer;

use crate::api::middleware::authenticate;
use crate::service::file::{
    get_file_handler, head_file_handler, missing_hash_handler, post_file_handler,
};
use crate::utils::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(|| async { StatusCode::OK }))
        .nest("/api/v1", file_router(state.clone()))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn file_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/files", post(post_file_handler))
        .route("/files/", get(missing_hash_handler))
        .route("/files/{hash}", get(get_file_handler).head(head_file_handler))
        // The upload ceiling is enforced by the bounded reader.
        .layer(DefaultBodyLimit::disable())
        .layer(axum_middleware::from_fn_with_state(state, authenticate))
}
