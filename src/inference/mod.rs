//! Inference module: classifier seam, ensembling and the decision pipeline
//!
//! This module provides:
//! - The [`Classifier`] capability and its burn-backed implementation
//! - Multi-crop ensemble averaging
//! - The decision policy (confidence gate and healthy override)
//! - [`LeafPipeline`], which wires the stages together
//!
//! ## Request flow
//!
//! ```text
//! image -> green gate -> zoom crops -> classifier -> mean -> policy -> Decision
//!              |                                               |
//!              +------------- not_leaf -----------+----- not_leaf
//! ```

pub mod classifier;
pub mod decision;
pub mod ensemble;
pub mod pipeline;
pub mod policy;
pub mod probabilities;

pub use classifier::{BurnClassifier, Classifier};
pub use decision::{Decision, Diagnosis};
pub use ensemble::{ensemble, EnsembleOutput};
pub use pipeline::LeafPipeline;
pub use policy::DecisionPolicy;
pub use probabilities::ProbabilityVector;
