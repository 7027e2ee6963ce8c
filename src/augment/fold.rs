// Fold lines: thin darkened creases across the paper

use image::RgbImage;
use rand::Rng;

use super::to_channel;
use crate::seed::ReceiptRng;

/// Half-width of the darkened band around a crease, pixels.
const BAND_HALF_WIDTH: f32 = 2.5;
/// Grey the crease ridge is pulled towards.
const RIDGE_GREY: f32 = 200.0;

/// One straight crease through `(px, py)` with unit normal `(nx, ny)`.
struct Crease {
    px: f32,
    py: f32,
    nx: f32,
    ny: f32,
}

impl Crease {
    fn sample(width: u32, height: u32, rng: &mut ReceiptRng) -> Self {
        let (w, h) = (width as f32, height as f32);
        // 横折り(レシートを畳む向き)を主とし、時々縦折り
        let horizontal = rng.random_bool(0.75);
        let tilt = rng.random_range(-5.0f32..=5.0).to_radians();
        let angle = if horizontal { tilt } else { std::f32::consts::FRAC_PI_2 + tilt };
        let px = rng.random_range(0.2..=0.8) * w;
        let py = rng.random_range(0.2..=0.8) * h;
        // 直線方向 (cos, sin) に対する法線
        Self {
            px,
            py,
            nx: -angle.sin(),
            ny: angle.cos(),
        }
    }

    fn distance(&self, x: f32, y: f32) -> f32 {
        ((x - self.px) * self.nx + (y - self.py) * self.ny).abs()
    }
}

pub fn apply(image: &mut RgbImage, intensity: f32, rng: &mut ReceiptRng) {
    let count = 1 + (intensity * 2.0).round() as usize;
    let creases: Vec<Crease> = (0..count)
        .map(|_| Crease::sample(image.width(), image.height(), rng))
        .collect();
    let shade = 0.04 + 0.08 * intensity;
    let ridge = 0.35 * intensity;

    for (x, y, px) in image.enumerate_pixels_mut() {
        let (cx, cy) = (x as f32 + 0.5, y as f32 + 0.5);
        for crease in &creases {
            let d = crease.distance(cx, cy);
            if d > BAND_HALF_WIDTH {
                continue;
            }
            let falloff = 1.0 - 0.5 * d / BAND_HALF_WIDTH;
            let factor = 1.0 - shade * falloff;
            for c in px.0.iter_mut() {
                let mut v = *c as f32 * factor;
                if d < 0.5 {
                    v = v * (1.0 - ridge) + RIDGE_GREY * ridge;
                }
                *c = to_channel(v);
            }
        }
    }
}
