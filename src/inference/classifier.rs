//! Classifier capability
//!
//! The pipeline only needs "crop batch in, one probability vector per crop
//! out". [`Classifier`] is that seam; [`BurnClassifier`] is the production
//! implementation backed by [`BlightNet`]. Tests substitute their own.

use std::path::Path;
use std::sync::Mutex;

use burn::module::Module;
use burn::record::CompactRecorder;
use burn::tensor::{backend::Backend, Tensor, TensorData};

use crate::model::cnn::{BlightNet, BlightNetConfig};
use crate::preprocess::zoom::CropBatch;
use crate::utils::error::{BlightError, Result};

use super::probabilities::ProbabilityVector;

/// A loaded image classifier shared read-only across requests
pub trait Classifier: Send + Sync {
    /// One probability vector per crop, in batch order
    fn predict(&self, batch: &CropBatch) -> Result<Vec<ProbabilityVector>>;

    /// Short description for logs and health checks
    fn name(&self) -> &str {
        "classifier"
    }
}

/// Classifier running [`BlightNet`] on a burn backend
///
/// The forward pass is serialized behind a mutex; cropping and decoding in
/// concurrent requests are not.
pub struct BurnClassifier<B: Backend> {
    model: Mutex<BlightNet<B>>,
    device: B::Device,
    name: String,
}

impl<B: Backend> BurnClassifier<B> {
    /// Wrap an already constructed network
    pub fn from_model(model: BlightNet<B>, device: B::Device) -> Self {
        Self {
            model: Mutex::new(model),
            device,
            name: "blightnet".to_string(),
        }
    }

    /// Load trained weights saved with burn's `CompactRecorder`
    ///
    /// `path` may omit the `.mpk` extension the recorder appends.
    pub fn load(path: &Path, config: &BlightNetConfig, device: B::Device) -> Result<Self> {
        let path = if path.exists() {
            path.to_path_buf()
        } else {
            path.with_extension("mpk")
        };
        if !path.exists() {
            return Err(BlightError::ModelLoad(path, "file not found".to_string()));
        }

        let model = BlightNet::<B>::new(config, &device)
            .load_file(path.as_path(), &CompactRecorder::new(), &device)
            .map_err(|e| BlightError::ModelLoad(path.clone(), format!("{:?}", e)))?;

        tracing::info!(
            path = %path.display(),
            num_classes = model.num_classes(),
            "Loaded BlightNet weights"
        );

        let mut classifier = Self::from_model(model, device);
        classifier.name = format!(
            "blightnet ({})",
            path.file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default()
        );
        Ok(classifier)
    }

    /// NHWC crop data to an NCHW tensor on this classifier's device
    fn to_tensor(&self, batch: &CropBatch) -> Tensor<B, 4> {
        let data = TensorData::new(batch.data().to_vec(), batch.shape());
        Tensor::<B, 4>::from_data(data, &self.device).permute([0, 3, 1, 2])
    }
}

impl<B: Backend> Classifier for BurnClassifier<B>
where
    BlightNet<B>: Send,
{
    fn predict(&self, batch: &CropBatch) -> Result<Vec<ProbabilityVector>> {
        let input = self.to_tensor(batch);

        let output = {
            let model = self
                .model
                .lock()
                .map_err(|_| BlightError::Classifier("model lock poisoned".to_string()))?;
            model.forward_softmax(input)
        };

        let [rows, cols] = output.dims();
        if rows != batch.len() {
            return Err(BlightError::Classifier(format!(
                "model returned {} rows for {} crops",
                rows,
                batch.len()
            )));
        }

        let values = output
            .into_data()
            .to_vec::<f32>()
            .map_err(|e| BlightError::Classifier(format!("{:?}", e)))?;

        values
            .chunks(cols.max(1))
            .map(ProbabilityVector::from_slice)
            .collect()
    }

    fn name(&self) -> &str {
        &self.name
    }
}
