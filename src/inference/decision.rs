//! Decision records
//!
//! A [`Decision`] is the final, immutable outcome of one pipeline run. Both
//! rejections serialize with `"prediction": "not_leaf"`; a diagnosis carries
//! the class key, its readable name and the confidence.

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::classes::{DiseaseClass, NOT_LEAF};

use super::probabilities::ProbabilityVector;

pub const LOW_GREEN_MESSAGE: &str =
    "Image has too little green content. Possibly NOT a potato leaf.";

pub const LOW_CONFIDENCE_MESSAGE: &str = "Model not confident this is a potato leaf.";

/// Outcome of the decision pipeline for one image
#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    /// Rejected before inference by the green-content gate
    InsufficientGreen { green_ratio: f64 },

    /// Rejected after inference: the ensemble's top class was too weak
    LowConfidence { confidence: f32, green_ratio: f64 },

    /// Classified as one of the three disease states
    Diagnosed(Diagnosis),
}

/// A successful classification
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnosis {
    /// Reported label, after the healthy override
    pub label: DiseaseClass,
    /// Arg-max of the averaged probabilities, before any override
    pub raw_top_class: DiseaseClass,
    /// Averaged probability of `raw_top_class`
    pub confidence: f32,
    /// Averaged probabilities over all crops
    pub probabilities: ProbabilityVector,
    /// Green ratio measured by the pre-inference gate
    pub green_ratio: f64,
}

impl Diagnosis {
    /// Whether the healthy override replaced the model's top class
    pub fn overridden(&self) -> bool {
        self.label != self.raw_top_class
    }
}

impl Decision {
    /// Whether the image was rejected as not a leaf
    pub fn is_not_leaf(&self) -> bool {
        !matches!(self, Decision::Diagnosed(_))
    }

    /// Wire value of the outcome: a class key or `not_leaf`
    pub fn outcome_key(&self) -> &'static str {
        match self {
            Decision::Diagnosed(d) => d.label.key(),
            _ => NOT_LEAF,
        }
    }

    /// Human-readable outcome
    pub fn readable(&self) -> &'static str {
        match self {
            Decision::Diagnosed(d) => d.label.readable(),
            _ => "Not a leaf",
        }
    }

    /// Reported confidence, absent for green-gate rejections
    pub fn confidence(&self) -> Option<f32> {
        match self {
            Decision::InsufficientGreen { .. } => None,
            Decision::LowConfidence { confidence, .. } => Some(*confidence),
            Decision::Diagnosed(d) => Some(d.confidence),
        }
    }

    pub fn green_ratio(&self) -> f64 {
        match self {
            Decision::InsufficientGreen { green_ratio } => *green_ratio,
            Decision::LowConfidence { green_ratio, .. } => *green_ratio,
            Decision::Diagnosed(d) => d.green_ratio,
        }
    }

    /// Explanation attached to rejections
    pub fn message(&self) -> Option<&'static str> {
        match self {
            Decision::InsufficientGreen { .. } => Some(LOW_GREEN_MESSAGE),
            Decision::LowConfidence { .. } => Some(LOW_CONFIDENCE_MESSAGE),
            Decision::Diagnosed(_) => None,
        }
    }

    pub fn diagnosis(&self) -> Option<&Diagnosis> {
        match self {
            Decision::Diagnosed(d) => Some(d),
            _ => None,
        }
    }
}

impl Serialize for Decision {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(3))?;
        match self {
            Decision::InsufficientGreen { green_ratio } => {
                map.serialize_entry("prediction", NOT_LEAF)?;
                map.serialize_entry("message", LOW_GREEN_MESSAGE)?;
                map.serialize_entry("green_ratio", green_ratio)?;
            }
            Decision::LowConfidence { confidence, .. } => {
                map.serialize_entry("prediction", NOT_LEAF)?;
                map.serialize_entry("message", LOW_CONFIDENCE_MESSAGE)?;
                map.serialize_entry("confidence", confidence)?;
            }
            Decision::Diagnosed(d) => {
                map.serialize_entry("final_prediction", &d.label)?;
                map.serialize_entry("readable_prediction", d.label.readable())?;
                map.serialize_entry("confidence", &d.confidence)?;
            }
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn diagnosis(label: DiseaseClass, raw: DiseaseClass, confidence: f32) -> Decision {
        Decision::Diagnosed(Diagnosis {
            label,
            raw_top_class: raw,
            confidence,
            probabilities: ProbabilityVector::new([0.1, 0.3, 0.6]).unwrap(),
            green_ratio: 0.5,
        })
    }

    #[test]
    fn test_green_rejection_json() {
        let decision = Decision::InsufficientGreen { green_ratio: 0.05 };
        assert_eq!(
            serde_json::to_value(&decision).unwrap(),
            json!({
                "prediction": "not_leaf",
                "message": LOW_GREEN_MESSAGE,
                "green_ratio": 0.05
            })
        );
        assert_eq!(decision.confidence(), None);
    }

    #[test]
    fn test_low_confidence_json() {
        let decision = Decision::LowConfidence {
            confidence: 0.25,
            green_ratio: 0.4,
        };
        assert_eq!(
            serde_json::to_value(&decision).unwrap(),
            json!({
                "prediction": "not_leaf",
                "message": LOW_CONFIDENCE_MESSAGE,
                "confidence": 0.25
            })
        );
        assert!(decision.is_not_leaf());
    }

    #[test]
    fn test_diagnosis_json() {
        let decision = diagnosis(DiseaseClass::LateBlight, DiseaseClass::LateBlight, 0.5);
        assert_eq!(
            serde_json::to_value(&decision).unwrap(),
            json!({
                "final_prediction": "potato_late_blight",
                "readable_prediction": "Late Blight",
                "confidence": 0.5
            })
        );
        assert_eq!(decision.outcome_key(), "potato_late_blight");
        assert!(!decision.is_not_leaf());
    }

    #[test]
    fn test_overridden() {
        let decision = diagnosis(DiseaseClass::EarlyBlight, DiseaseClass::Healthy, 0.6);
        assert!(decision.diagnosis().unwrap().overridden());
        assert_eq!(decision.readable(), "Early Blight");
    }
}
