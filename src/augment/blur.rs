// Mild Gaussian blur

use image::RgbImage;
use imageproc::filter::gaussian_blur_f32;

/// Blur sigma in pixels at intensity 0 and 1.
const SIGMA_RANGE: (f32, f32) = (0.3, 1.2);

pub fn apply(image: &mut RgbImage, intensity: f32) {
    let sigma = SIGMA_RANGE.0 + (SIGMA_RANGE.1 - SIGMA_RANGE.0) * intensity;
    *image = gaussian_blur_f32(image, sigma);
}
