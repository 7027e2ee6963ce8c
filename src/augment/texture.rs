// Print texture: print-head banding, edge fade, pressure zones and grain
//
// What gets drawn is decided by the style's PrintTexture; intensity scales it.

use image::RgbImage;
use rand::Rng;
use rand_distr::{Distribution, Normal};

use super::to_channel;
use crate::seed::ReceiptRng;
use crate::style::PrintTexture;

/// Thermal print-head rows are this many pixels apart.
const BAND_PITCH: usize = 3;
/// Darkening of a light print-head row at intensity 1.
const BAND_DARKENING: f32 = 0.05;
/// Darkening at the very paper edge at intensity 1.
const EDGE_DARKENING: f32 = 0.1;
/// Pressure zone radius range, pixels.
const ZONE_RADIUS: (u32, u32) = (30, 100);
/// Darkening at a pressure zone centre at intensity 1.
const ZONE_DARKENING: f32 = 0.2;
/// Grain sigma in channel units for print quality 0.
const GRAIN_SIGMA: f32 = 20.0;

pub fn apply(image: &mut RgbImage, texture: &PrintTexture, intensity: f32, rng: &mut ReceiptRng) {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return;
    }
    if texture.banding > 0.0 {
        banding(image, texture.banding.clamp(0.0, 1.0), intensity, rng);
    }
    if texture.edge_fade_px > 0 {
        edge_fade(image, texture.edge_fade_px, intensity);
    }
    for _ in 0..texture.pressure_zones {
        pressure_zone(image, intensity, rng);
    }
    if texture.print_quality < 1.0 {
        grain(image, (1.0 - texture.print_quality) * GRAIN_SIGMA * intensity, rng);
    }
}

fn scale_pixel(px: &mut image::Rgb<u8>, factor: f32) {
    for c in px.0.iter_mut() {
        *c = to_channel(*c as f32 * factor);
    }
}

fn banding(image: &mut RgbImage, chance: f64, intensity: f32, rng: &mut ReceiptRng) {
    let factor = 1.0 - BAND_DARKENING * intensity;
    let width = image.width();
    for y in (0..image.height()).step_by(BAND_PITCH) {
        if !rng.random_bool(chance) {
            continue;
        }
        for x in 0..width {
            scale_pixel(image.get_pixel_mut(x, y), factor);
        }
    }
}

/// Darken both side strips, strongest at the outer column.
fn edge_fade(image: &mut RgbImage, fade_px: u32, intensity: f32) {
    let (width, height) = image.dimensions();
    let fade = fade_px.min(width / 2);
    for i in 0..fade {
        let factor = 1.0 - EDGE_DARKENING * intensity * (1.0 - i as f32 / fade as f32);
        for x in [i, width - 1 - i] {
            for y in 0..height {
                scale_pixel(image.get_pixel_mut(x, y), factor);
            }
        }
    }
}

fn pressure_zone(image: &mut RgbImage, intensity: f32, rng: &mut ReceiptRng) {
    let (width, height) = image.dimensions();
    let cx = rng.random_range(0..width) as f32;
    let cy = rng.random_range(0..height) as f32;
    let radius = rng.random_range(ZONE_RADIUS.0..=ZONE_RADIUS.1) as f32;

    let x0 = (cx - radius).max(0.0) as u32;
    let y0 = (cy - radius).max(0.0) as u32;
    let x1 = ((cx + radius) as u32).min(width);
    let y1 = ((cy + radius) as u32).min(height);
    for y in y0..y1 {
        for x in x0..x1 {
            let (dx, dy) = (x as f32 - cx, y as f32 - cy);
            let d = (dx * dx + dy * dy).sqrt();
            if d >= radius {
                continue;
            }
            let factor = 1.0 - ZONE_DARKENING * intensity * (1.0 - d / radius);
            scale_pixel(image.get_pixel_mut(x, y), factor);
        }
    }
}

fn grain(image: &mut RgbImage, sigma: f32, rng: &mut ReceiptRng) {
    let Ok(normal) = Normal::new(0.0f32, sigma) else {
        return;
    };
    for px in image.pixels_mut() {
        for c in px.0.iter_mut() {
            *c = to_channel(*c as f32 + normal.sample(rng));
        }
    }
}
