//! Prediction endpoint - multipart image upload in, decision record out

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{
        multipart::{MultipartError, MultipartRejection},
        Multipart, State,
    },
    Json,
};
use tracing::{debug, info_span};
use uuid::Uuid;

use potato_blight::{BlightError, Decision};

use super::ApiError;
use crate::state::SharedState;

/// Multipart field carrying the image
pub const IMAGE_FIELD: &str = "image";

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        ApiError::new(err.status(), err.body_text())
    }
}

/// POST /predict - Classify an uploaded leaf image
///
/// Rejections ("not_leaf") are successful responses; only missing or
/// unreadable uploads (400) and classifier faults (500) are errors.
pub async fn predict(
    State(state): State<SharedState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Decision>, ApiError> {
    let request_id = Uuid::new_v4();
    let span = info_span!("predict", %request_id);

    let mut multipart = multipart.map_err(|e| {
        debug!(parent: &span, "Not a multipart request: {}", e);
        ApiError::from(BlightError::MissingImage)
    })?;

    let bytes = read_image_field(&mut multipart)
        .await?
        .ok_or(BlightError::MissingImage)?;

    debug!(parent: &span, bytes = bytes.len(), "Received upload");

    let pipeline = Arc::clone(&state.pipeline);
    let decision = tokio::task::spawn_blocking(move || span.in_scope(|| pipeline.run_bytes(&bytes)))
        .await
        .map_err(|e| ApiError::internal(format!("Prediction task failed: {}", e)))??;

    Ok(Json(decision))
}

/// Bytes of the first `image` field, skipping any other fields
async fn read_image_field(multipart: &mut Multipart) -> Result<Option<Bytes>, ApiError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some(IMAGE_FIELD) {
            return Ok(Some(field.bytes().await?));
        }
    }
    Ok(None)
}
