//! Per-class probability vectors

use serde::{Deserialize, Serialize};

use crate::classes::{DiseaseClass, NUM_CLASSES};
use crate::utils::error::{BlightError, Result};

/// Probabilities for the three classes, indexed by [`DiseaseClass`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProbabilityVector([f32; NUM_CLASSES]);

impl ProbabilityVector {
    /// Build a vector, rejecting negative or non-finite entries
    pub fn new(values: [f32; NUM_CLASSES]) -> Result<Self> {
        if let Some(bad) = values.iter().find(|v| !v.is_finite() || **v < 0.0) {
            return Err(BlightError::Classifier(format!(
                "probability {} is not a finite non-negative number",
                bad
            )));
        }
        Ok(Self(values))
    }

    /// Build a vector from one classifier output row
    pub fn from_slice(row: &[f32]) -> Result<Self> {
        let values: [f32; NUM_CLASSES] = row.try_into().map_err(|_| {
            BlightError::Classifier(format!(
                "expected {} probabilities per crop, got {}",
                NUM_CLASSES,
                row.len()
            ))
        })?;
        Self::new(values)
    }

    /// Probability assigned to `class`
    pub fn get(&self, class: DiseaseClass) -> f32 {
        self.0[class.index()]
    }

    pub fn as_array(&self) -> &[f32; NUM_CLASSES] {
        &self.0
    }

    pub fn sum(&self) -> f32 {
        self.0.iter().sum()
    }

    /// Most probable class and its probability; the lowest index wins ties
    pub fn top(&self) -> (DiseaseClass, f32) {
        let mut best = DiseaseClass::EarlyBlight;
        for class in DiseaseClass::ALL {
            if self.get(class) > self.get(best) {
                best = class;
            }
        }
        (best, self.get(best))
    }

    /// Element-wise arithmetic mean of `vectors`, `None` when empty
    pub fn mean(vectors: &[ProbabilityVector]) -> Option<Self> {
        if vectors.is_empty() {
            return None;
        }

        let mut sum = [0.0f64; NUM_CLASSES];
        for vector in vectors {
            for (acc, &p) in sum.iter_mut().zip(vector.0.iter()) {
                *acc += p as f64;
            }
        }

        let n = vectors.len() as f64;
        Some(Self(sum.map(|s| (s / n) as f32)))
    }
}
