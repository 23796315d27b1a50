//! Health check endpoint

use axum::{extract::State, Json};
use serde::Serialize;

use crate::state::SharedState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub uptime_seconds: u64,
    pub started_at: String,
    pub version: String,
    pub classifier: String,
    pub backend: String,
}

/// GET /health - Health check endpoint
pub async fn health_check(State(state): State<SharedState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        uptime_seconds: state.uptime_seconds(),
        started_at: state.started_at_utc.to_rfc3339(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        classifier: state.pipeline.classifier_name().to_string(),
        backend: state.config.backend.clone(),
    })
}
