//! Image preprocessing ahead of the classifier
//!
//! - `decode`: boundary validation of uploaded bytes
//! - `green`: green-content ratio used as a pre-classifier gate
//! - `zoom`: centered multi-scale crops forming the ensemble batch

pub mod decode;
pub mod green;
pub mod zoom;

pub use decode::{decode_image, has_supported_extension, DEFAULT_MAX_UPLOAD_BYTES};
pub use green::{green_ratio, green_ratio_rgb};
pub use zoom::{centered_crop_rect, zoom_crops, CropBatch};
