//! Configuration endpoint

use axum::{extract::State, Json};

use potato_blight::PipelineConfig;

use crate::state::SharedState;

/// GET /config - Active pipeline thresholds and crop settings
pub async fn get_config(State(state): State<SharedState>) -> Json<PipelineConfig> {
    Json(state.pipeline.config().clone())
}
