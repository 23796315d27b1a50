//! Upload decoding
//!
//! Boundary validation for raw image bytes. Everything rejected here is a
//! client error; the pipeline itself only ever sees a decoded image.

use image::{DynamicImage, ImageFormat};

use crate::utils::error::{BlightError, Result};

/// Formats accepted from uploads
pub const SUPPORTED_FORMATS: [ImageFormat; 4] = [
    ImageFormat::Jpeg,
    ImageFormat::Png,
    ImageFormat::WebP,
    ImageFormat::Gif,
];

/// File extensions matching [`SUPPORTED_FORMATS`]
pub const SUPPORTED_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "webp", "gif"];

/// Default maximum upload size (10 MiB)
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Sniff, check and decode an uploaded image, converting it to 8-bit RGB
pub fn decode_image(bytes: &[u8]) -> Result<DynamicImage> {
    if bytes.is_empty() {
        return Err(BlightError::MissingImage);
    }

    let format = image::guess_format(bytes)
        .map_err(|_| BlightError::ImageDecode("unrecognized image data".to_string()))?;

    if !SUPPORTED_FORMATS.contains(&format) {
        return Err(BlightError::UnsupportedFormat(format!("{:?}", format)));
    }

    let image = image::load_from_memory_with_format(bytes, format)?;
    Ok(DynamicImage::ImageRgb8(image.to_rgb8()))
}

/// Whether a path has one of the supported image extensions
pub fn has_supported_extension(path: &std::path::Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| SUPPORTED_EXTENSIONS.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage, RgbaImage};
    use std::io::Cursor;
    use std::path::Path;

    fn encode(image: DynamicImage, format: ImageFormat) -> Vec<u8> {
        let mut bytes = Vec::new();
        image.write_to(&mut Cursor::new(&mut bytes), format).unwrap();
        bytes
    }

    #[test]
    fn test_decode_png() {
        let img = RgbImage::from_pixel(12, 9, Rgb([10, 200, 30]));
        let bytes = encode(DynamicImage::ImageRgb8(img), ImageFormat::Png);

        let decoded = decode_image(&bytes).unwrap();
        assert_eq!(decoded.width(), 12);
        assert_eq!(decoded.height(), 9);
        assert_eq!(decoded.color().channel_count(), 3);
    }

    #[test]
    fn test_rgba_is_converted_to_rgb() {
        let img = RgbaImage::from_pixel(4, 4, image::Rgba([0, 255, 0, 128]));
        let bytes = encode(DynamicImage::ImageRgba8(img), ImageFormat::Png);

        let decoded = decode_image(&bytes).unwrap();
        assert!(matches!(decoded, DynamicImage::ImageRgb8(_)));
    }

    #[test]
    fn test_empty_bytes() {
        assert!(matches!(decode_image(&[]), Err(BlightError::MissingImage)));
    }

    #[test]
    fn test_garbage_bytes() {
        let err = decode_image(b"definitely not an image").unwrap_err();
        assert!(err.is_client_error());
    }

    #[test]
    fn test_unsupported_format() {
        let img = RgbImage::from_pixel(4, 4, Rgb([1, 2, 3]));
        let bytes = encode(DynamicImage::ImageRgb8(img), ImageFormat::Bmp);
        assert!(matches!(
            decode_image(&bytes),
            Err(BlightError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_truncated_png() {
        let img = RgbImage::from_pixel(32, 32, Rgb([1, 2, 3]));
        let bytes = encode(DynamicImage::ImageRgb8(img), ImageFormat::Png);
        let err = decode_image(&bytes[..bytes.len() / 2]).unwrap_err();
        assert!(matches!(err, BlightError::ImageDecode(_)));
    }

    #[test]
    fn test_supported_extension() {
        assert!(has_supported_extension(Path::new("leaf.JPG")));
        assert!(has_supported_extension(Path::new("dir/leaf.webp")));
        assert!(!has_supported_extension(Path::new("leaf.bmp")));
        assert!(!has_supported_extension(Path::new("leaf")));
    }
}
