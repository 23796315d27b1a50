//! Potato Blight Server
//!
//! HTTP API around the leaf decision pipeline. The router is built here so
//! integration tests can drive it without binding a socket.

pub mod routes;
pub mod state;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use state::{AppState, ServerConfig, SharedState};

/// Build the application router
pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/config", get(routes::config::get_config))
        .route("/predict", post(routes::predict::predict))
        .with_state(Arc::new(state))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}
