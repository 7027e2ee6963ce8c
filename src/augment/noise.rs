// Gaussian sensor noise

use image::RgbImage;
use rand_distr::{Distribution, Normal};

use super::to_channel;
use crate::seed::ReceiptRng;

/// Standard deviation in channel units at intensity 1.
const MAX_SIGMA: f32 = 12.0;

/// Add zero-mean Gaussian noise to every channel independently.
pub fn apply(image: &mut RgbImage, intensity: f32, rng: &mut ReceiptRng) {
    let sigma = intensity * MAX_SIGMA;
    let Ok(normal) = Normal::new(0.0f32, sigma) else {
        return;
    };
    for px in image.pixels_mut() {
        for c in px.0.iter_mut() {
            *c = to_channel(*c as f32 + normal.sample(rng));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::receipt_rng;

    #[test]
    fn test_noise_changes_pixels_deterministically() {
        let base = RgbImage::from_pixel(16, 16, image::Rgb([128, 128, 128]));
        let mut a = base.clone();
        let mut b = base.clone();
        apply(&mut a, 0.5, &mut receipt_rng(3));
        apply(&mut b, 0.5, &mut receipt_rng(3));
        assert_eq!(a, b);
        assert_ne!(a, base);
    }
}
