//! Application state for the potato blight server
//!
//! Holds the pipeline (and with it the classifier) loaded once at startup.
//! Everything here is read-only after construction.

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use potato_blight::preprocess::DEFAULT_MAX_UPLOAD_BYTES;
use potato_blight::LeafPipeline;

/// Server configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Maximum accepted request body, in bytes
    pub max_upload_bytes: usize,
    /// Name of the compute backend, reported by /health
    pub backend: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            backend: potato_blight::backend::backend_name().to_string(),
        }
    }
}

/// Shared application state
pub struct AppState {
    /// Server configuration
    pub config: ServerConfig,
    /// Decision pipeline with its loaded classifier
    pub pipeline: Arc<LeafPipeline>,
    /// Server start time
    pub started_at: Instant,
    /// Wall-clock start time, reported by /health
    pub started_at_utc: DateTime<Utc>,
}

impl AppState {
    pub fn new(config: ServerConfig, pipeline: LeafPipeline) -> Self {
        Self {
            config,
            pipeline: Arc::new(pipeline),
            started_at: Instant::now(),
            started_at_utc: Utc::now(),
        }
    }

    /// Get uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}

pub type SharedState = Arc<AppState>;
