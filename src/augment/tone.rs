// Contrast and brightness adjustments

use image::RgbImage;
use rand::Rng;

use super::to_channel;
use crate::seed::ReceiptRng;

/// Largest contrast change (factor 1 +/- this) at intensity 1.
const MAX_CONTRAST_DELTA: f32 = 0.10;
/// Largest brightness change (factor 1 +/- this) at intensity 1.
const MAX_BRIGHTNESS_DELTA: f32 = 0.15;

fn signed_factor(intensity: f32, max_delta: f32, rng: &mut ReceiptRng) -> f32 {
    let delta = intensity * max_delta;
    1.0 + rng.random_range(-delta..=delta)
}

/// Stretch channel values around the mean grey level.
pub fn contrast(image: &mut RgbImage, intensity: f32, rng: &mut ReceiptRng) {
    let factor = signed_factor(intensity, MAX_CONTRAST_DELTA, rng);
    let count = (image.width() as f64) * (image.height() as f64);
    if count == 0.0 {
        return;
    }
    let sum: f64 = image
        .pixels()
        .map(|p| 0.299 * p[0] as f64 + 0.587 * p[1] as f64 + 0.114 * p[2] as f64)
        .sum();
    let mean = (sum / count) as f32;
    for px in image.pixels_mut() {
        for c in px.0.iter_mut() {
            *c = to_channel(mean + (*c as f32 - mean) * factor);
        }
    }
}

/// Scale every channel by one factor.
pub fn brightness(image: &mut RgbImage, intensity: f32, rng: &mut ReceiptRng) {
    let factor = signed_factor(intensity, MAX_BRIGHTNESS_DELTA, rng);
    for px in image.pixels_mut() {
        for c in px.0.iter_mut() {
            *c = to_channel(*c as f32 * factor);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::receipt_rng;

    #[test]
    fn test_contrast_keeps_flat_image_flat() {
        let mut image = RgbImage::from_pixel(4, 4, image::Rgb([90, 90, 90]));
        contrast(&mut image, 1.0, &mut receipt_rng(5));
        assert!(image.pixels().all(|p| *p == image::Rgb([90, 90, 90])));
    }
}
