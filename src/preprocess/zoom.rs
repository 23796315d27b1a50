//! Zoom crop sampler
//!
//! Builds the ensemble batch: one centered crop per zoom factor, each resized
//! to the classifier resolution with Lanczos3 and scaled to [0, 1].

use image::{imageops, imageops::FilterType, RgbImage};

use crate::config::is_valid_zoom;

/// A batch of normalized square crops in NHWC layout
#[derive(Debug, Clone, PartialEq)]
pub struct CropBatch {
    /// `len * size * size * 3` values in [0, 1]
    data: Vec<f32>,
    /// Zoom factor each crop was taken at, in batch order
    factors: Vec<f64>,
    /// Side length of every crop
    size: u32,
}

impl CropBatch {
    /// Build a batch from raw NHWC data
    ///
    /// Returns `None` when `data` does not hold exactly one `size x size x 3`
    /// block per factor.
    pub fn from_raw(data: Vec<f32>, factors: Vec<f64>, size: u32) -> Option<Self> {
        let per_crop = crop_len(size);
        (data.len() == per_crop * factors.len()).then_some(Self {
            data,
            factors,
            size,
        })
    }

    /// Number of crops
    pub fn len(&self) -> usize {
        self.factors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factors.is_empty()
    }

    /// Side length of every crop
    pub fn size(&self) -> u32 {
        self.size
    }

    /// `[N, H, W, C]`
    pub fn shape(&self) -> [usize; 4] {
        [self.len(), self.size as usize, self.size as usize, 3]
    }

    /// Flat NHWC data
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Zoom factors in batch order
    pub fn factors(&self) -> &[f64] {
        &self.factors
    }

    /// HWC data of a single crop
    pub fn crop(&self, index: usize) -> Option<&[f32]> {
        let per_crop = crop_len(self.size);
        let start = index.checked_mul(per_crop)?;
        self.data.get(start..start + per_crop)
    }
}

fn crop_len(size: u32) -> usize {
    size as usize * size as usize * 3
}

/// Centered crop rectangle `(left, top, width, height)` for a zoom factor
///
/// The margins use integer division, so an odd leftover pixel ends up on the
/// right or bottom edge.
pub fn centered_crop_rect(width: u32, height: u32, zoom: f64) -> (u32, u32, u32, u32) {
    let new_w = ((width as f64 * zoom) as u32).clamp(1, width.max(1));
    let new_h = ((height as f64 * zoom) as u32).clamp(1, height.max(1));

    let left = width.saturating_sub(new_w) / 2;
    let top = height.saturating_sub(new_h) / 2;

    (left, top, new_w, new_h)
}

/// Produce one normalized `target_size` crop per valid zoom factor
///
/// Factors outside (0, 1] are skipped, so the batch may be shorter than
/// `factors`. Crops keep the order of the factors that produced them.
pub fn zoom_crops(image: &RgbImage, factors: &[f64], target_size: u32) -> CropBatch {
    let valid: Vec<f64> = factors.iter().copied().filter(|&z| is_valid_zoom(z)).collect();

    let mut data = Vec::with_capacity(valid.len() * crop_len(target_size));
    for &zoom in &valid {
        let (left, top, w, h) = centered_crop_rect(image.width(), image.height(), zoom);
        let crop = imageops::crop_imm(image, left, top, w, h).to_image();
        let resized = imageops::resize(&crop, target_size, target_size, FilterType::Lanczos3);
        data.extend(resized.as_raw().iter().map(|&v| v as f32 / 255.0));
    }

    tracing::debug!(
        crops = valid.len(),
        skipped = factors.len() - valid.len(),
        target_size,
        "Built zoom crop batch"
    );

    CropBatch {
        data,
        factors: valid,
        size: target_size,
    }
}
