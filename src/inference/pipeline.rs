//! Leaf decision pipeline
//!
//! `image -> green gate -> zoom crops -> ensemble -> policy -> Decision`
//!
//! Every stage is a single-shot pure computation apart from the classifier
//! call. A rejection at either gate is a normal [`Decision`]; only client
//! input errors and classifier faults come back as `Err`.

use std::time::Instant;

use image::DynamicImage;
use tracing::{debug, info};

use crate::config::PipelineConfig;
use crate::preprocess::{decode_image, green_ratio_rgb, zoom_crops};
use crate::utils::error::Result;

use super::classifier::Classifier;
use super::decision::Decision;
use super::ensemble::ensemble;
use super::policy::DecisionPolicy;

/// The decision pipeline with its injected classifier
pub struct LeafPipeline {
    config: PipelineConfig,
    policy: DecisionPolicy,
    classifier: Box<dyn Classifier>,
}

impl LeafPipeline {
    /// Validate `config` and bind it to a loaded classifier
    pub fn new(config: PipelineConfig, classifier: Box<dyn Classifier>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            policy: DecisionPolicy::from(&config),
            config,
            classifier,
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn classifier_name(&self) -> &str {
        self.classifier.name()
    }

    /// Decide on a decoded image
    ///
    /// Any colour type is accepted; the image is flattened to 8-bit RGB once
    /// and that buffer feeds both the green gate and the crops.
    pub fn run(&self, image: &DynamicImage) -> Result<Decision> {
        let start = Instant::now();

        let rgb = image.to_rgb8();
        let ratio = green_ratio_rgb(&rgb);
        if ratio < self.config.min_green_ratio {
            debug!(green_ratio = ratio, "Rejected by green gate");
            let decision = Decision::InsufficientGreen { green_ratio: ratio };
            log_decision(&decision, start);
            return Ok(decision);
        }

        let batch = zoom_crops(&rgb, &self.config.zoom_factors, self.config.target_size);
        let output = ensemble(self.classifier.as_ref(), &batch)?;
        let decision = self.policy.decide(&output, ratio);

        if let Some(diagnosis) = decision.diagnosis().filter(|d| d.overridden()) {
            debug!(
                from = %diagnosis.raw_top_class,
                to = %diagnosis.label,
                "Weak healthy prediction overridden"
            );
        }

        log_decision(&decision, start);
        Ok(decision)
    }

    /// Decode raw upload bytes, then decide
    pub fn run_bytes(&self, bytes: &[u8]) -> Result<Decision> {
        let image = decode_image(bytes)?;
        self.run(&image)
    }
}

fn log_decision(decision: &Decision, start: Instant) {
    info!(
        outcome = decision.outcome_key(),
        confidence = decision.confidence(),
        green_ratio = decision.green_ratio(),
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
        "Leaf decision"
    );
}
