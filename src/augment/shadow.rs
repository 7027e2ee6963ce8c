// Shadow: soft radial darkening as if something hung over the paper

use image::{GrayImage, Luma, RgbImage};
use imageproc::filter::gaussian_blur_f32;
use rand::Rng;

use crate::seed::ReceiptRng;

/// Mask falloff per pixel of distance from the shadow centre (mask units 0..255).
const FALLOFF_PER_PX: f32 = 0.5;
/// Softening of the mask, pixels.
const MASK_SIGMA: f32 = 3.5;
/// Largest darkening at the shadow centre, at intensity 1.
const MAX_STRENGTH: f32 = 0.3;

/// Cone-shaped mask around a random centre, blurred.
fn shadow_mask(width: u32, height: u32, rng: &mut ReceiptRng) -> GrayImage {
    let cx = width as f32 * rng.random_range(0.3..=0.7);
    let cy = height as f32 * rng.random_range(0.3..=0.7);
    let mask = GrayImage::from_fn(width, height, |x, y| {
        let (dx, dy) = (x as f32 + 0.5 - cx, y as f32 + 0.5 - cy);
        let d = (dx * dx + dy * dy).sqrt();
        Luma([(255.0 - d * FALLOFF_PER_PX).clamp(0.0, 255.0) as u8])
    });
    gaussian_blur_f32(&mask, MASK_SIGMA)
}

pub fn apply(image: &mut RgbImage, intensity: f32, rng: &mut ReceiptRng) {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return;
    }
    let mask = shadow_mask(width, height, rng);
    let strength = MAX_STRENGTH * intensity;
    for (x, y, px) in image.enumerate_pixels_mut() {
        let factor = 1.0 - strength * mask.get_pixel(x, y)[0] as f32 / 255.0;
        for c in px.0.iter_mut() {
            *c = super::to_channel(*c as f32 * factor);
        }
    }
}
