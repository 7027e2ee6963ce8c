// Phase 3: Typeface resolution and glyph-run rasterization
//
// A `GlyphRun` is the coverage mask of one token. The renderer measures ink
// on this mask, so anything that changes which pixels get ink (bold,
// double strike, dot pattern) must happen here, before measuring.

pub mod dot_matrix;
pub mod outline;

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::style::{ReceiptStyle, TypefaceClass, resolve_style};
use dot_matrix::DotMatrixFace;
use outline::OutlineFace;

/// Options for rasterizing one token.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RasterOptions {
    pub size: f32,
    pub bold: bool,
    pub char_spacing: f32,
    pub dot_pattern: bool,
}

/// Coverage mask of one rasterized token.
///
/// Mask coordinates are pixel-aligned; `pen_x`/`baseline_y` locate the pen
/// origin inside the mask so the renderer can place it on an integer grid.
#[derive(Debug, Clone, PartialEq)]
pub struct GlyphRun {
    pub width: u32,
    pub height: u32,
    /// Row-major coverage, 0 = no ink, 255 = full ink.
    pub coverage: Vec<u8>,
    /// Mask column of the pen origin.
    pub pen_x: i32,
    /// Mask row of the baseline.
    pub baseline_y: i32,
    /// Total pen advance in pixels.
    pub advance: f64,
}

/// Inked rectangle of a mask: `[col_min, col_max) x [row_min, row_max)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InkExtent {
    pub col_min: u32,
    pub row_min: u32,
    pub col_max: u32,
    pub row_max: u32,
}

impl GlyphRun {
    /// Empty (all-zero) mask.
    pub fn blank(width: u32, height: u32, pen_x: i32, baseline_y: i32, advance: f64) -> Self {
        Self {
            width,
            height,
            coverage: vec![0; (width as usize) * (height as usize)],
            pen_x,
            baseline_y,
            advance,
        }
    }

    pub fn at(&self, x: u32, y: u32) -> u8 {
        self.coverage[(y as usize) * (self.width as usize) + x as usize]
    }

    /// Tight extent of all pixels with non-zero coverage.
    pub fn ink_extent(&self) -> Option<InkExtent> {
        let mut extent: Option<InkExtent> = None;
        for y in 0..self.height {
            for x in 0..self.width {
                if self.at(x, y) == 0 {
                    continue;
                }
                let e = extent.get_or_insert(InkExtent {
                    col_min: x,
                    row_min: y,
                    col_max: x + 1,
                    row_max: y + 1,
                });
                e.col_min = e.col_min.min(x);
                e.row_min = e.row_min.min(y);
                e.col_max = e.col_max.max(x + 1);
                e.row_max = e.row_max.max(y + 1);
            }
        }
        extent
    }

    /// Overlay a lighter second strike shifted `offset` pixels to the right.
    ///
    /// The mask grows by `offset` columns; the advance is unchanged.
    pub fn with_double_strike(&self, offset: u32, strength: f32) -> GlyphRun {
        if offset == 0 {
            return self.clone();
        }
        let width = self.width + offset;
        let mut out = GlyphRun::blank(width, self.height, self.pen_x, self.baseline_y, self.advance);
        for y in 0..self.height {
            for x in 0..width {
                let first = if x < self.width { self.at(x, y) } else { 0 };
                let second = if x >= offset {
                    (self.at(x - offset, y) as f32 * strength).round() as u8
                } else {
                    0
                };
                out.coverage[(y as usize) * (width as usize) + x as usize] = first.max(second);
            }
        }
        out
    }
}

/// A face able to rasterize tokens.
#[derive(Debug, Clone)]
pub enum Typeface {
    Outline {
        regular: Arc<OutlineFace>,
        /// Real bold face; `None` means bold is synthesized by stroking.
        bold: Option<Arc<OutlineFace>>,
    },
    DotMatrix(DotMatrixFace),
}

impl Typeface {
    pub fn name(&self) -> String {
        match self {
            Typeface::Outline { regular, .. } => regular.family.clone(),
            Typeface::DotMatrix(_) => "built-in dot matrix".to_string(),
        }
    }

    pub fn rasterize(&self, text: &str, opts: &RasterOptions) -> crate::error::Result<GlyphRun> {
        match self {
            Typeface::Outline { regular, bold } => match (opts.bold, bold) {
                (true, Some(face)) => face.rasterize(text, opts, 0.0),
                (true, None) => regular.rasterize(text, opts, opts.size * 0.04),
                (false, _) => regular.rasterize(text, opts, 0.0),
            },
            Typeface::DotMatrix(face) => face.rasterize(text, opts),
        }
    }
}

/// Typefaces resolved once per process, one per printer style.
#[derive(Debug, Clone)]
pub struct FontBook {
    faces: HashMap<ReceiptStyle, Typeface>,
    fallback: Typeface,
}

impl FontBook {
    /// Resolve every style against the fonts installed on this machine.
    pub fn system() -> Self {
        let mut db = fontdb::Database::new();
        db.load_system_fonts();
        debug!(faces = db.len(), "loaded system font database");
        Self::from_database(&db)
    }

    /// Resolve every style against `db`; styles without a matching family
    /// fall back to the built-in dot-matrix face.
    pub fn from_database(db: &fontdb::Database) -> Self {
        let mut loaded: HashMap<fontdb::ID, Arc<OutlineFace>> = HashMap::new();
        let mut faces = HashMap::new();

        for style in ReceiptStyle::ALL {
            let settings = resolve_style(style);
            let typeface = if settings.typeface == TypefaceClass::DotMatrix {
                Typeface::DotMatrix(DotMatrixFace)
            } else {
                match outline::resolve(db, settings.families, &mut loaded) {
                    Some(typeface) => {
                        debug!(style = %style, face = %typeface.name(), "resolved typeface");
                        typeface
                    }
                    None => {
                        warn!(
                            style = %style,
                            families = ?settings.families,
                            "no system font found, falling back to built-in dot-matrix face"
                        );
                        Typeface::DotMatrix(DotMatrixFace)
                    }
                }
            };
            faces.insert(style, typeface);
        }

        Self {
            faces,
            fallback: Typeface::DotMatrix(DotMatrixFace),
        }
    }

    /// Every style uses the built-in dot-matrix face. Output does not depend
    /// on the host's installed fonts.
    pub fn dot_matrix_only() -> Self {
        Self {
            faces: HashMap::new(),
            fallback: Typeface::DotMatrix(DotMatrixFace),
        }
    }

    pub fn typeface(&self, style: ReceiptStyle) -> &Typeface {
        self.faces.get(&style).unwrap_or(&self.fallback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_with(cells: &[(u32, u32)]) -> GlyphRun {
        let mut run = GlyphRun::blank(6, 4, 0, 3, 6.0);
        for &(x, y) in cells {
            run.coverage[(y * 6 + x) as usize] = 200;
        }
        run
    }

    #[test]
    fn test_ink_extent_is_tight() {
        let run = run_with(&[(1, 1), (3, 2)]);
        let e = run.ink_extent().expect("ink");
        assert_eq!((e.col_min, e.row_min, e.col_max, e.row_max), (1, 1, 4, 3));
    }

    #[test]
    fn test_blank_has_no_ink() {
        assert!(GlyphRun::blank(3, 3, 0, 2, 3.0).ink_extent().is_none());
    }

    #[test]
    fn test_double_strike_extends_ink() {
        let run = run_with(&[(5, 0)]);
        let doubled = run.with_double_strike(1, 0.6);
        assert_eq!(doubled.width, 7);
        let e = doubled.ink_extent().expect("ink");
        assert_eq!(e.col_max, 7);
        assert_eq!(doubled.at(6, 0), 120);
    }
}
