//! # Potato Blight
//!
//! Classifies potato leaf photos as early blight, late blight or healthy, or
//! rejects them as "not a leaf".
//!
//! ## Pipeline
//!
//! 1. **Green gate**: too few green-dominant pixels means no classifier call
//! 2. **Zoom crops**: the full frame plus centered 0.9, 0.8 and 0.7 crops,
//!    resized to 224x224
//! 3. **Ensemble**: one classifier call for the batch, probabilities averaged
//! 4. **Policy**: low confidence is rejected, weak "healthy" is demoted to the
//!    stronger blight
//!
//! ## Modules
//!
//! - `preprocess`: upload decoding, green ratio, zoom crops
//! - `inference`: classifier seam, ensembling, decision policy, pipeline
//! - `model`: the BlightNet CNN built with Burn
//! - `config`: tunable thresholds
//! - `utils`: errors and logging
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use potato_blight::backend::{default_device, InferenceBackend};
//! use potato_blight::{BlightNetConfig, BurnClassifier, LeafPipeline, PipelineConfig};
//!
//! let classifier = BurnClassifier::<InferenceBackend>::load(
//!     "models/blightnet.mpk".as_ref(),
//!     &BlightNetConfig::new(),
//!     default_device(),
//! )?;
//! let pipeline = LeafPipeline::new(PipelineConfig::default(), Box::new(classifier))?;
//! let decision = pipeline.run(&image::open("leaf.jpg")?)?;
//! println!("{}", serde_json::to_string(&decision)?);
//! ```

pub mod backend;
pub mod classes;
pub mod config;
pub mod inference;
pub mod model;
pub mod preprocess;
pub mod utils;

pub use classes::DiseaseClass;
pub use config::PipelineConfig;
pub use inference::{
    BurnClassifier, Classifier, Decision, DecisionPolicy, Diagnosis, LeafPipeline,
    ProbabilityVector,
};
pub use model::{BlightNet, BlightNetConfig};
pub use utils::error::{BlightError, Result};
