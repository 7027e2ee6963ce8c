// Stains: irregular translucent brown blobs with a darker rim

use std::f32::consts::TAU;

use image::RgbImage;
use rand::Rng;

use super::to_channel;
use crate::seed::ReceiptRng;

const STAIN_COLOR: [f32; 3] = [139.0, 90.0, 43.0];

/// Blob outline `r(theta) = radius * (1 + sum a_k sin(k theta + phi_k))`.
struct Blob {
    cx: f32,
    cy: f32,
    radius: f32,
    harmonics: [(f32, f32); 3],
    opacity: f32,
}

impl Blob {
    fn sample(width: u32, height: u32, intensity: f32, rng: &mut ReceiptRng) -> Self {
        let (w, h) = (width as f32, height as f32);
        let base = w.min(h) * rng.random_range(0.08..=0.2);
        let mut harmonics = [(0.0, 0.0); 3];
        for hm in harmonics.iter_mut() {
            *hm = (rng.random_range(0.0..=0.12), rng.random_range(0.0..TAU));
        }
        Self {
            cx: rng.random_range(0.1..=0.9) * w,
            cy: rng.random_range(0.1..=0.9) * h,
            radius: base.max(4.0),
            harmonics,
            opacity: 0.15 + 0.25 * intensity,
        }
    }

    fn edge(&self, theta: f32) -> f32 {
        let wobble: f32 = self
            .harmonics
            .iter()
            .enumerate()
            .map(|(k, (a, phi))| a * ((k as f32 + 2.0) * theta + phi).sin())
            .sum();
        self.radius * (1.0 + wobble)
    }

    /// Coverage at `(x, y)`: soft edge plus a rim where liquid dried.
    fn alpha(&self, x: f32, y: f32) -> f32 {
        let (dx, dy) = (x - self.cx, y - self.cy);
        let d = (dx * dx + dy * dy).sqrt();
        let rel = d / self.edge(dy.atan2(dx));
        if rel >= 1.0 {
            return 0.0;
        }
        let soft = if rel > 0.85 { (1.0 - rel) / 0.15 } else { 1.0 };
        let rim = (-((rel - 0.92) / 0.05).powi(2)).exp();
        (self.opacity * soft * (1.0 + 0.6 * rim)).min(1.0)
    }
}

pub fn apply(image: &mut RgbImage, intensity: f32, rng: &mut ReceiptRng) {
    let count = if intensity > 0.7 { 2 } else { 1 };
    let blobs: Vec<Blob> = (0..count)
        .map(|_| Blob::sample(image.width(), image.height(), intensity, rng))
        .collect();

    for (x, y, px) in image.enumerate_pixels_mut() {
        let (fx, fy) = (x as f32 + 0.5, y as f32 + 0.5);
        for blob in &blobs {
            let a = blob.alpha(fx, fy);
            if a <= 0.0 {
                continue;
            }
            // 乗算合成: 下の文字が透けて見える
            for (c, tint) in px.0.iter_mut().zip(STAIN_COLOR) {
                let v = *c as f32;
                *c = to_channel(v * (1.0 - a) + (v * tint / 255.0) * a);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::receipt_rng;

    #[test]
    fn test_stain_tints_towards_brown() {
        let mut image = RgbImage::from_pixel(100, 100, image::Rgb([255, 255, 255]));
        apply(&mut image, 1.0, &mut receipt_rng(2));
        assert!(image.pixels().any(|p| p[2] < p[0]));
    }
}
