//! Pipeline Configuration Module
//!
//! Tunable constants of the decision pipeline. Loaded once at startup and
//! read-only afterwards; nothing mutates a config while a request is running.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::utils::error::{BlightError, Result};

/// Below this averaged top-class probability the image is rejected as not a leaf
pub const NOT_LEAF_THRESHOLD: f64 = 0.42;

/// A "healthy" call weaker than this is demoted to the stronger disease class
pub const HEALTHY_CLASS_THRESHOLD: f64 = 0.75;

/// Minimum fraction of green-dominant pixels before the classifier is consulted
pub const MIN_GREEN_RATIO: f64 = 0.12;

/// Side length of the square classifier input
pub const TARGET_SIZE: u32 = 224;

/// Full frame plus three progressively tighter centered crops
pub const DEFAULT_ZOOM_FACTORS: [f64; 4] = [1.0, 0.9, 0.8, 0.7];

/// The CNN halves the resolution four times
const MIN_TARGET_SIZE: u32 = 16;

/// Configuration of the leaf decision pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Confidence gate applied after inference
    pub not_leaf_threshold: f64,

    /// Minimum healthy probability for a healthy verdict to stand
    pub healthy_class_threshold: f64,

    /// Green-content gate applied before inference
    pub min_green_ratio: f64,

    /// Crops are resized to `target_size` x `target_size`
    pub target_size: u32,

    /// Zoom factors in (0, 1]; others are skipped when sampling
    pub zoom_factors: Vec<f64>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            not_leaf_threshold: NOT_LEAF_THRESHOLD,
            healthy_class_threshold: HEALTHY_CLASS_THRESHOLD,
            min_green_ratio: MIN_GREEN_RATIO,
            target_size: TARGET_SIZE,
            zoom_factors: DEFAULT_ZOOM_FACTORS.to_vec(),
        }
    }
}

impl PipelineConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.not_leaf_threshold) {
            return Err(BlightError::Config(format!(
                "not_leaf_threshold must be in [0, 1], got {}",
                self.not_leaf_threshold
            )));
        }

        if !(0.0..=1.0).contains(&self.healthy_class_threshold) {
            return Err(BlightError::Config(format!(
                "healthy_class_threshold must be in [0, 1], got {}",
                self.healthy_class_threshold
            )));
        }

        if !(0.0..=1.0).contains(&self.min_green_ratio) {
            return Err(BlightError::Config(format!(
                "min_green_ratio must be in [0, 1], got {}",
                self.min_green_ratio
            )));
        }

        if self.target_size < MIN_TARGET_SIZE {
            return Err(BlightError::Config(format!(
                "target_size must be at least {}, got {}",
                MIN_TARGET_SIZE, self.target_size
            )));
        }

        if self.valid_zoom_factors().next().is_none() {
            return Err(BlightError::Config(
                "zoom_factors must contain at least one value in (0, 1]".to_string(),
            ));
        }

        Ok(())
    }

    /// Zoom factors that will actually produce a crop
    pub fn valid_zoom_factors(&self) -> impl Iterator<Item = f64> + '_ {
        self.zoom_factors
            .iter()
            .copied()
            .filter(|&z| is_valid_zoom(z))
    }

    /// Load configuration from a TOML file and validate it
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            BlightError::Config(format!("Failed to read config {}: {e}", path.display()))
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| {
            BlightError::Config(format!("Failed to parse config {}: {e}", path.display()))
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Save configuration as TOML
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| BlightError::Config(format!("Failed to serialize config: {e}")))?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Load from an optional path, falling back to defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}

/// Whether a zoom factor lies in (0, 1]
pub fn is_valid_zoom(z: f64) -> bool {
    z > 0.0 && z <= 1.0
}
