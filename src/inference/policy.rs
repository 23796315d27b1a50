//! Decision policy
//!
//! Turns an ensemble result into a [`Decision`]:
//!
//! 1. averaged top-class probability below `not_leaf_threshold` -> not a leaf
//! 2. otherwise the label is the top class
//! 3. a top "healthy" below `healthy_class_threshold` is demoted to whichever
//!    blight is more probable (early blight on a tie)
//!
//! The reported confidence is always the probability of the model's original
//! top class, also when step 3 changed the label.
//!
//! Probabilities are widened to `f64` before they meet a threshold, so a mean
//! of `0.42f32` (just under 0.42) is rejected.

use crate::classes::DiseaseClass;
use crate::config::{PipelineConfig, HEALTHY_CLASS_THRESHOLD, NOT_LEAF_THRESHOLD};

use super::decision::{Decision, Diagnosis};
use super::ensemble::EnsembleOutput;
use super::probabilities::ProbabilityVector;

/// Post-inference rejection and healthy override thresholds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecisionPolicy {
    pub not_leaf_threshold: f64,
    pub healthy_class_threshold: f64,
}

impl Default for DecisionPolicy {
    fn default() -> Self {
        Self {
            not_leaf_threshold: NOT_LEAF_THRESHOLD,
            healthy_class_threshold: HEALTHY_CLASS_THRESHOLD,
        }
    }
}

impl From<&PipelineConfig> for DecisionPolicy {
    fn from(config: &PipelineConfig) -> Self {
        Self {
            not_leaf_threshold: config.not_leaf_threshold,
            healthy_class_threshold: config.healthy_class_threshold,
        }
    }
}

impl DecisionPolicy {
    /// Decide on an ensemble result
    pub fn decide(&self, ensemble: &EnsembleOutput, green_ratio: f64) -> Decision {
        let confidence = ensemble.top_probability;

        if f64::from(confidence) < self.not_leaf_threshold {
            return Decision::LowConfidence {
                confidence,
                green_ratio,
            };
        }

        let label = self.final_label(ensemble.raw_top_class, &ensemble.mean);

        Decision::Diagnosed(Diagnosis {
            label,
            raw_top_class: ensemble.raw_top_class,
            confidence,
            probabilities: ensemble.mean,
            green_ratio,
        })
    }

    /// Apply the healthy override to the model's top class
    pub fn final_label(
        &self,
        raw_top_class: DiseaseClass,
        probs: &ProbabilityVector,
    ) -> DiseaseClass {
        if raw_top_class != DiseaseClass::Healthy
            || f64::from(probs.get(DiseaseClass::Healthy)) >= self.healthy_class_threshold
        {
            return raw_top_class;
        }

        if probs.get(DiseaseClass::EarlyBlight) >= probs.get(DiseaseClass::LateBlight) {
            DiseaseClass::EarlyBlight
        } else {
            DiseaseClass::LateBlight
        }
    }
}
