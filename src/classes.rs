//! Potato disease classes
//!
//! The classifier emits probabilities in the fixed order
//! `[early_blight, healthy, late_blight]`. Lookups are exhaustive matches, so
//! adding a class without a key or a readable name does not compile.

use serde::{Deserialize, Serialize};

/// Number of classes the classifier predicts
pub const NUM_CLASSES: usize = 3;

/// Wire value used for both rejection outcomes
pub const NOT_LEAF: &str = "not_leaf";

/// One of the three potato leaf states the model knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiseaseClass {
    #[serde(rename = "potato_early_blight")]
    EarlyBlight,
    #[serde(rename = "potato_healthy")]
    Healthy,
    #[serde(rename = "potato_late_blight")]
    LateBlight,
}

impl DiseaseClass {
    /// All classes in classifier output order
    pub const ALL: [DiseaseClass; NUM_CLASSES] = [
        DiseaseClass::EarlyBlight,
        DiseaseClass::Healthy,
        DiseaseClass::LateBlight,
    ];

    /// Position of this class in a probability vector
    pub fn index(self) -> usize {
        match self {
            DiseaseClass::EarlyBlight => 0,
            DiseaseClass::Healthy => 1,
            DiseaseClass::LateBlight => 2,
        }
    }

    /// Machine-readable key, e.g. `potato_late_blight`
    pub fn key(self) -> &'static str {
        match self {
            DiseaseClass::EarlyBlight => "potato_early_blight",
            DiseaseClass::Healthy => "potato_healthy",
            DiseaseClass::LateBlight => "potato_late_blight",
        }
    }

    /// Human-readable name shown to users
    pub fn readable(self) -> &'static str {
        match self {
            DiseaseClass::EarlyBlight => "Early Blight",
            DiseaseClass::Healthy => "Healthy",
            DiseaseClass::LateBlight => "Late Blight",
        }
    }

    pub fn is_disease(self) -> bool {
        !matches!(self, DiseaseClass::Healthy)
    }
}

impl std::fmt::Display for DiseaseClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}
