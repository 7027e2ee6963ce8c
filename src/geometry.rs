// Geometric primitives: points, axis-aligned boxes, token polygons and the
// 3x3 projective map shared by the pixel warp and the polygon transform.
//
// All coordinates are continuous pixel-edge coordinates: pixel (i, j) covers
// the square [i, i+1) x [j, j+1), so a canvas of width w spans x in [0, w].

use imageproc::geometric_transformations::Projection;
use serde::{Deserialize, Serialize};

use crate::layout::Role;

/// Fixed margin added on every side of a token's measured ink extent.
///
/// Downstream consumers can rely on `box = ink ± BOX_MARGIN_PX` for every
/// token, independent of font, size or style.
pub const BOX_MARGIN_PX: f64 = 1.0;

/// A 2D point in canvas space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Point) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// 矩形領域を表す軸平行バウンディングボックス。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisBox {
    pub x_min: f64,
    pub y_min: f64,
    pub x_max: f64,
    pub y_max: f64,
}

impl AxisBox {
    pub fn new(x_min: f64, y_min: f64, x_max: f64, y_max: f64) -> Self {
        Self {
            x_min,
            y_min,
            x_max,
            y_max,
        }
    }

    pub fn width(&self) -> f64 {
        self.x_max - self.x_min
    }

    pub fn height(&self) -> f64 {
        self.y_max - self.y_min
    }

    pub fn area(&self) -> f64 {
        self.width().max(0.0) * self.height().max(0.0)
    }

    /// Grow the box by `margin` on every side.
    pub fn expanded(&self, margin: f64) -> Self {
        Self::new(
            self.x_min - margin,
            self.y_min - margin,
            self.x_max + margin,
            self.y_max + margin,
        )
    }

    /// Corners clockwise from top-left (image y axis points down).
    pub fn corners(&self) -> [Point; 4] {
        [
            Point::new(self.x_min, self.y_min),
            Point::new(self.x_max, self.y_min),
            Point::new(self.x_max, self.y_max),
            Point::new(self.x_min, self.y_max),
        ]
    }

    /// Minimal axis-aligned box enclosing all `points`.
    pub fn enclosing(points: &[Point]) -> Option<Self> {
        let first = points.first()?;
        let mut b = Self::new(first.x, first.y, first.x, first.y);
        for p in &points[1..] {
            b.x_min = b.x_min.min(p.x);
            b.y_min = b.y_min.min(p.y);
            b.x_max = b.x_max.max(p.x);
            b.y_max = b.y_max.max(p.y);
        }
        Some(b)
    }

    /// True when the horizontal extents of the two boxes overlap.
    pub fn overlaps_horizontally(&self, other: &AxisBox) -> bool {
        self.x_min < other.x_max && other.x_min < self.x_max
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x_min && p.x <= self.x_max && p.y >= self.y_min && p.y <= self.y_max
    }
}

/// Bounding polygon of one token.
///
/// The four corners are stored in the order top-left, top-right,
/// bottom-right, bottom-left of the untransformed token, so after a rotation
/// the first corner still identifies the token's own top-left.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub text: String,
    pub role: Role,
    pub polygon: [Point; 4],
}

impl BoundingBox {
    pub fn axis_aligned(text: impl Into<String>, role: Role, rect: &AxisBox) -> Self {
        Self {
            text: text.into(),
            role,
            polygon: rect.corners(),
        }
    }

    /// Re-derive the polygon by mapping each corner through `h`.
    ///
    /// Width and height of the source box are deliberately never consulted.
    pub fn transformed(&self, h: &Homography) -> Self {
        Self {
            text: self.text.clone(),
            role: self.role,
            polygon: self.polygon.map(|p| h.map(p)),
        }
    }

    /// Minimal enclosing axis-aligned box (lossy for rotated polygons).
    pub fn enclosing_box(&self) -> AxisBox {
        let p = &self.polygon;
        AxisBox::new(
            p.iter().map(|c| c.x).fold(f64::INFINITY, f64::min),
            p.iter().map(|c| c.y).fold(f64::INFINITY, f64::min),
            p.iter().map(|c| c.x).fold(f64::NEG_INFINITY, f64::max),
            p.iter().map(|c| c.y).fold(f64::NEG_INFINITY, f64::max),
        )
    }

    /// Polygon as `[[x, y]; 4]`, the shape used by every JSON export.
    pub fn point_pairs(&self) -> [[f64; 2]; 4] {
        self.polygon.map(|p| [p.x, p.y])
    }

    /// Whether every corner lies inside `[0, width] x [0, height]`.
    pub fn within(&self, width: u32, height: u32, tolerance: f64) -> bool {
        self.polygon.iter().all(|p| {
            p.x >= -tolerance
                && p.y >= -tolerance
                && p.x <= width as f64 + tolerance
                && p.y <= height as f64 + tolerance
        })
    }
}

/// Signed area of a polygon (shoelace). Positive for clockwise order in
/// image coordinates (y down).
pub fn signed_area(points: &[Point]) -> f64 {
    let n = points.len();
    let mut acc = 0.0;
    for i in 0..n {
        let a = points[i];
        let b = points[(i + 1) % n];
        acc += a.x * b.y - b.x * a.y;
    }
    acc / 2.0
}

/// 3x3 projective map in row-major order, acting on column vectors
/// `(x, y, 1)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Homography {
    pub m: [[f64; 3]; 3],
}

impl Homography {
    /// 単位行列を返す。
    pub fn identity() -> Self {
        Self {
            m: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
        }
    }

    pub fn translation(tx: f64, ty: f64) -> Self {
        Self {
            m: [[1.0, 0.0, tx], [0.0, 1.0, ty], [0.0, 0.0, 1.0]],
        }
    }

    /// Rotation by `degrees` about the origin. Positive angles turn content
    /// clockwise on screen because the y axis points down.
    pub fn rotation(degrees: f64) -> Self {
        let (s, c) = degrees.to_radians().sin_cos();
        Self {
            m: [[c, -s, 0.0], [s, c, 0.0], [0.0, 0.0, 1.0]],
        }
    }

    /// Rotation by `degrees` about `(cx, cy)`.
    pub fn rotation_about(degrees: f64, cx: f64, cy: f64) -> Self {
        Self::translation(-cx, -cy)
            .then(&Self::rotation(degrees))
            .then(&Self::translation(cx, cy))
    }

    /// Compose: apply `self` first, then `next`.
    pub fn then(&self, next: &Homography) -> Homography {
        let a = &next.m;
        let b = &self.m;
        let mut out = [[0.0; 3]; 3];
        for (i, row) in out.iter_mut().enumerate() {
            for (j, cell) in row.iter_mut().enumerate() {
                *cell = a[i][0] * b[0][j] + a[i][1] * b[1][j] + a[i][2] * b[2][j];
            }
        }
        Homography { m: out }
    }

    /// Homogeneous weight `w` of the mapped point; must stay positive over
    /// the mapped region for the map to be well defined.
    pub fn weight(&self, p: Point) -> f64 {
        self.m[2][0] * p.x + self.m[2][1] * p.y + self.m[2][2]
    }

    pub fn map(&self, p: Point) -> Point {
        let m = &self.m;
        let w = self.weight(p);
        Point::new(
            (m[0][0] * p.x + m[0][1] * p.y + m[0][2]) / w,
            (m[1][0] * p.x + m[1][1] * p.y + m[1][2]) / w,
        )
    }

    pub fn determinant(&self) -> f64 {
        let m = &self.m;
        m[0][0] * (m[1][1] * m[2][2] - m[1][2] * m[2][1])
            - m[0][1] * (m[1][0] * m[2][2] - m[1][2] * m[2][0])
            + m[0][2] * (m[1][0] * m[2][1] - m[1][1] * m[2][0])
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::identity()
    }

    /// Projective map sending each `src[i]` to `dst[i]`.
    ///
    /// Solves the 8x8 linear system with `m[2][2] = 1` by Gaussian
    /// elimination with partial pivoting. Returns `None` when the
    /// correspondences are degenerate (three collinear points).
    pub fn from_quads(src: &[Point; 4], dst: &[Point; 4]) -> Option<Homography> {
        let mut a = [[0.0f64; 9]; 8];
        for i in 0..4 {
            let (x, y) = (src[i].x, src[i].y);
            let (u, v) = (dst[i].x, dst[i].y);
            a[2 * i] = [x, y, 1.0, 0.0, 0.0, 0.0, -x * u, -y * u, u];
            a[2 * i + 1] = [0.0, 0.0, 0.0, x, y, 1.0, -x * v, -y * v, v];
        }

        for col in 0..8 {
            let pivot = (col..8).max_by(|&r1, &r2| a[r1][col].abs().total_cmp(&a[r2][col].abs()))?;
            if a[pivot][col].abs() < 1e-12 {
                return None;
            }
            a.swap(col, pivot);
            for row in 0..8 {
                if row == col {
                    continue;
                }
                let factor = a[row][col] / a[col][col];
                if factor == 0.0 {
                    continue;
                }
                for k in col..9 {
                    a[row][k] -= factor * a[col][k];
                }
            }
        }

        let h: Vec<f64> = (0..8).map(|i| a[i][8] / a[i][i]).collect();
        Some(Homography {
            m: [[h[0], h[1], h[2]], [h[3], h[4], h[5]], [h[6], h[7], 1.0]],
        })
    }

    /// The same map expressed in imageproc's pixel-centre convention.
    ///
    /// imageproc samples pixel `i` at coordinate `i`, whereas this crate puts
    /// pixel centres at `i + 0.5`. Conjugating by a half-pixel shift makes
    /// the pixel warp and the polygon transform the identical map.
    pub fn to_pixel_projection(&self) -> Option<Projection> {
        let s = Self::translation(0.5, 0.5)
            .then(self)
            .then(&Self::translation(-0.5, -0.5));
        let m = &s.m;
        Projection::from_matrix([
            m[0][0] as f32,
            m[0][1] as f32,
            m[0][2] as f32,
            m[1][0] as f32,
            m[1][1] as f32,
            m[1][2] as f32,
            m[2][0] as f32,
            m[2][1] as f32,
            m[2][2] as f32,
        ])
    }
}
