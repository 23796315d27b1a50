//! Green content filter
//!
//! Counts pixels whose green channel strictly exceeds both red and blue. A
//! photo of foliage has plenty of them; a screenshot or a face usually does not.

use image::{DynamicImage, RgbImage};

/// Fraction of green-dominant pixels in `image`
///
/// Images that do not have exactly three colour channels (grayscale, RGBA, ...)
/// report `0.0`, as does an image without pixels.
pub fn green_ratio(image: &DynamicImage) -> f64 {
    if image.color().channel_count() != 3 {
        return 0.0;
    }

    match image {
        DynamicImage::ImageRgb8(rgb) => green_ratio_rgb(rgb),
        // 16-bit and float RGB keep their channel ordering after conversion
        other => green_ratio_rgb(&other.to_rgb8()),
    }
}

/// Fraction of green-dominant pixels in an RGB buffer
pub fn green_ratio_rgb(image: &RgbImage) -> f64 {
    let total = image.width() as u64 * image.height() as u64;
    if total == 0 {
        return 0.0;
    }

    let green = image
        .pixels()
        .filter(|p| {
            let [r, g, b] = p.0;
            g > r && g > b
        })
        .count();

    green as f64 / total as f64
}
