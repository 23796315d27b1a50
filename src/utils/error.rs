//! Error Handling Module
//!
//! Defines the error type shared by the pipeline, the CLI and the server.
//! Uses thiserror for ergonomic error definitions.
//!
//! Policy rejections ("not a leaf") are not errors: they are regular
//! [`Decision`](crate::inference::Decision) values. Everything here is either a
//! client input problem or a fault the caller has to surface.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for potato blight operations
#[derive(Error, Debug)]
pub enum BlightError {
    /// The request carried no image at all
    #[error("No image uploaded.")]
    MissingImage,

    /// The bytes could not be decoded as an image
    #[error("Failed to decode image: {0}")]
    ImageDecode(String),

    /// The bytes are an image format we do not accept
    #[error("Unsupported image format: {0}")]
    UnsupportedFormat(String),

    /// Invalid input handed to a pipeline stage
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Model weights could not be loaded
    #[error("Failed to load model at '{0}': {1}")]
    ModelLoad(PathBuf, String),

    /// The classifier failed or returned malformed output
    #[error("Classifier error: {0}")]
    Classifier(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BlightError {
    /// Whether the error was caused by the uploaded input rather than by us
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            BlightError::MissingImage
                | BlightError::ImageDecode(_)
                | BlightError::UnsupportedFormat(_)
        )
    }
}

impl From<image::ImageError> for BlightError {
    fn from(err: image::ImageError) -> Self {
        BlightError::ImageDecode(err.to_string())
    }
}

/// Convenience Result type for potato blight operations
pub type Result<T> = std::result::Result<T, BlightError>;
