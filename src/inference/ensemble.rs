//! Multi-crop ensemble averaging

use serde::Serialize;

use crate::classes::DiseaseClass;
use crate::preprocess::zoom::CropBatch;
use crate::utils::error::{BlightError, Result};

use super::classifier::Classifier;
use super::probabilities::ProbabilityVector;

/// Averaged classifier output over a crop batch
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnsembleOutput {
    /// Element-wise mean over crops
    pub mean: ProbabilityVector,
    /// Arg-max of `mean`
    pub raw_top_class: DiseaseClass,
    /// `mean[raw_top_class]`
    pub top_probability: f32,
    /// Per-crop vectors, in batch order
    pub per_crop: Vec<ProbabilityVector>,
}

impl EnsembleOutput {
    /// Summarize per-crop vectors; `None` when there are none
    pub fn from_crops(per_crop: Vec<ProbabilityVector>) -> Option<Self> {
        let mean = ProbabilityVector::mean(&per_crop)?;
        let (raw_top_class, top_probability) = mean.top();
        Some(Self {
            mean,
            raw_top_class,
            top_probability,
            per_crop,
        })
    }
}

/// Run the classifier once on the whole batch and average the results
///
/// Classifier faults are returned unchanged; nothing is retried.
pub fn ensemble(classifier: &dyn Classifier, batch: &CropBatch) -> Result<EnsembleOutput> {
    if batch.is_empty() {
        return Err(BlightError::InvalidInput(
            "crop batch is empty, no valid zoom factors".to_string(),
        ));
    }

    let per_crop = classifier.predict(batch)?;
    if per_crop.len() != batch.len() {
        return Err(BlightError::Classifier(format!(
            "{} returned {} probability vectors for {} crops",
            classifier.name(),
            per_crop.len(),
            batch.len()
        )));
    }

    let output = EnsembleOutput::from_crops(per_crop).ok_or_else(|| {
        BlightError::Classifier("classifier returned no probability vectors".to_string())
    })?;

    tracing::debug!(
        crops = batch.len(),
        early = output.mean.get(DiseaseClass::EarlyBlight),
        healthy = output.mean.get(DiseaseClass::Healthy),
        late = output.mean.get(DiseaseClass::LateBlight),
        top = %output.raw_top_class,
        "Ensembled crop predictions"
    );

    Ok(output)
}
