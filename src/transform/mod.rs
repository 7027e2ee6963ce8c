// Phase 5: Geometric transform (rotation + perspective, boxes re-derived)
//
// One homography H drives both the pixel warp and the box corners. The
// output canvas bounds the warped input corners, so nothing is cropped.

use image::{ImageBuffer, RgbImage};
use imageproc::geometric_transformations::{Interpolation, warp_into};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::ReceiptError;
use crate::geometry::{BoundingBox, Homography, Point, signed_area};
use crate::render::Canvas;
use crate::seed::ReceiptRng;

/// Warped canvases smaller than this fraction of the source area are
/// rejected as collapsing.
pub const MIN_AREA_RATIO: f64 = 0.25;

/// Warped canvases larger than this multiple of the source area are
/// rejected as exploding.
pub const MAX_AREA_RATIO: f64 = 4.0;

/// Limits sampled from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransformSettings {
    /// Rotation is sampled in `[-max_rotation_deg, +max_rotation_deg]`.
    pub max_rotation_deg: f64,
    /// Corner jitter as a fraction of the shorter canvas side; 0 disables
    /// perspective.
    pub perspective: f64,
}

impl TransformSettings {
    pub fn none() -> Self {
        Self {
            max_rotation_deg: 0.0,
            perspective: 0.0,
        }
    }
}

/// Parameters that were applied to one receipt.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransformParams {
    pub rotation_deg: f64,
    /// Offsets added to the rotated canvas corners (TL, TR, BR, BL), pixels.
    pub corner_jitter: [Point; 4],
}

impl TransformParams {
    pub fn identity() -> Self {
        Self::rotation(0.0)
    }

    pub fn rotation(degrees: f64) -> Self {
        Self {
            rotation_deg: degrees,
            corner_jitter: [Point::new(0.0, 0.0); 4],
        }
    }

    pub fn has_perspective(&self) -> bool {
        self.corner_jitter.iter().any(|p| p.x != 0.0 || p.y != 0.0)
    }

    /// Sample parameters for a `width` x `height` canvas.
    pub fn sample(settings: &TransformSettings, width: u32, height: u32, rng: &mut ReceiptRng) -> Self {
        let rotation_deg = if settings.max_rotation_deg > 0.0 {
            rng.random_range(-settings.max_rotation_deg..=settings.max_rotation_deg)
        } else {
            0.0
        };
        let mut corner_jitter = [Point::new(0.0, 0.0); 4];
        if settings.perspective > 0.0 {
            let reach = settings.perspective * width.min(height) as f64;
            for p in corner_jitter.iter_mut() {
                *p = Point::new(rng.random_range(-reach..=reach), rng.random_range(-reach..=reach));
            }
        }
        Self {
            rotation_deg,
            corner_jitter,
        }
    }
}

/// Source canvas corners in pixel-edge coordinates (TL, TR, BR, BL).
fn canvas_corners(width: u32, height: u32) -> [Point; 4] {
    let (w, h) = (width as f64, height as f64);
    [
        Point::new(0.0, 0.0),
        Point::new(w, 0.0),
        Point::new(w, h),
        Point::new(0.0, h),
    ]
}

/// Round values within floating-point noise of an integer (quarter turns
/// produce `1e-15` residues that would otherwise add a pixel row).
fn snap(v: f64) -> f64 {
    let r = v.round();
    if (v - r).abs() < 1e-7 { r } else { v }
}

/// Whether the quad keeps a consistent clockwise winding at every corner.
fn is_convex_clockwise(q: &[Point; 4]) -> bool {
    (0..4).all(|i| {
        let a = q[i];
        let b = q[(i + 1) % 4];
        let c = q[(i + 2) % 4];
        let cross = (b.x - a.x) * (c.y - b.y) - (b.y - a.y) * (c.x - b.x);
        cross > 0.0
    })
}

/// The homography for `params` and the size of the canvas it produces.
///
/// Fails with `TransformDegenerate` when the map is singular, sends part of
/// the canvas through infinity, folds it, or collapses / explodes its area.
pub fn build_homography(
    params: &TransformParams,
    width: u32,
    height: u32,
) -> crate::error::Result<(Homography, u32, u32)> {
    let corners = canvas_corners(width, height);
    let (cx, cy) = (width as f64 / 2.0, height as f64 / 2.0);

    let mut h = Homography::rotation_about(params.rotation_deg, cx, cy);
    if params.has_perspective() {
        let rotated = corners.map(|p| h.map(p));
        let mut jittered = rotated;
        for (p, d) in jittered.iter_mut().zip(params.corner_jitter.iter()) {
            p.x += d.x;
            p.y += d.y;
        }
        let perspective = Homography::from_quads(&rotated, &jittered).ok_or_else(|| {
            ReceiptError::transform_degenerate("corner jitter has no projective solution")
        })?;
        h = h.then(&perspective);
    }

    let det = h.determinant();
    if !det.is_finite() || det.abs() < 1e-9 {
        return Err(ReceiptError::transform_degenerate(format!(
            "map is not invertible (det={det:e})"
        )));
    }
    if corners.iter().any(|p| h.weight(*p) <= 1e-9) {
        return Err(ReceiptError::transform_degenerate(
            "map sends part of the canvas through infinity",
        ));
    }

    let warped = corners.map(|p| h.map(p));
    if !is_convex_clockwise(&warped) {
        return Err(ReceiptError::transform_degenerate(
            "warped canvas is folded or flipped",
        ));
    }
    let ratio = signed_area(&warped) / (width as f64 * height as f64);
    if !(MIN_AREA_RATIO..=MAX_AREA_RATIO).contains(&ratio) {
        return Err(ReceiptError::transform_degenerate(format!(
            "warped canvas area ratio {ratio:.3} outside [{MIN_AREA_RATIO}, {MAX_AREA_RATIO}]"
        )));
    }

    let min_x = snap(warped.iter().map(|p| p.x).fold(f64::INFINITY, f64::min)).floor();
    let min_y = snap(warped.iter().map(|p| p.y).fold(f64::INFINITY, f64::min)).floor();
    let max_x = snap(warped.iter().map(|p| p.x).fold(f64::NEG_INFINITY, f64::max)).ceil();
    let max_y = snap(warped.iter().map(|p| p.y).fold(f64::NEG_INFINITY, f64::max)).ceil();
    let out_w = (max_x - min_x) as u32;
    let out_h = (max_y - min_y) as u32;
    if out_w == 0 || out_h == 0 {
        return Err(ReceiptError::transform_degenerate("warped canvas is empty"));
    }

    let h = h.then(&Homography::translation(-min_x, -min_y));
    Ok((h, out_w, out_h))
}

/// Result of warping a rendered receipt.
#[derive(Debug, Clone)]
pub struct Transformed {
    pub canvas: Canvas,
    pub boxes: Vec<BoundingBox>,
    pub homography: Homography,
}

/// Warp the canvas and map every box corner through the same homography.
///
/// The source canvas is not modified. An identity map copies the pixels
/// unchanged.
pub fn apply_transform(
    canvas: &Canvas,
    boxes: &[BoundingBox],
    params: &TransformParams,
) -> crate::error::Result<Transformed> {
    let (h, out_w, out_h) = build_homography(params, canvas.width(), canvas.height())?;

    let image: RgbImage = if h.is_identity() {
        canvas.image.clone()
    } else {
        let projection = h.to_pixel_projection().ok_or_else(|| {
            ReceiptError::transform_degenerate("homography has no pixel-space inverse")
        })?;
        let mut out = ImageBuffer::from_pixel(out_w, out_h, canvas.paper);
        warp_into(
            &canvas.image,
            &projection,
            Interpolation::Bilinear,
            canvas.paper,
            &mut out,
        );
        out
    };

    let mapped: Vec<BoundingBox> = boxes.iter().map(|b| b.transformed(&h)).collect();
    if let Some(bad) = mapped.iter().find(|b| !b.within(out_w, out_h, 1e-6)) {
        return Err(ReceiptError::transform_degenerate(format!(
            "box of token '{}' leaves the warped canvas",
            bad.text
        )));
    }

    Ok(Transformed {
        canvas: Canvas {
            image,
            paper: canvas.paper,
        },
        boxes: mapped,
        homography: h,
    })
}
