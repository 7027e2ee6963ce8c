// Outline faces: fontdb lookup, ttf-parser outlines, tiny-skia coverage

use std::collections::HashMap;
use std::sync::Arc;

use tiny_skia::{FillRule, Paint, PathBuilder, Pixmap, Stroke, Transform};

use super::{GlyphRun, RasterOptions, Typeface};
use crate::error::ReceiptError;

/// Padding in pixels around the font bounding box inside a mask.
const MASK_PAD: i32 = 2;

/// Font data of one face, shared between styles that resolve to it.
#[derive(Debug, Clone)]
pub struct OutlineFace {
    pub data: Arc<Vec<u8>>,
    pub index: u32,
    pub family: String,
}

/// ttf-parserのOutlineBuilderコールバック (y軸を反転して画素座標へ)
struct PathSink {
    builder: PathBuilder,
    origin_x: f32,
    origin_y: f32,
    scale: f32,
}

impl PathSink {
    fn point(&self, x: f32, y: f32) -> (f32, f32) {
        (self.origin_x + x * self.scale, self.origin_y - y * self.scale)
    }
}

impl ttf_parser::OutlineBuilder for PathSink {
    fn move_to(&mut self, x: f32, y: f32) {
        let (px, py) = self.point(x, y);
        self.builder.move_to(px, py);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        let (px, py) = self.point(x, y);
        self.builder.line_to(px, py);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        let (p1x, p1y) = self.point(x1, y1);
        let (px, py) = self.point(x, y);
        self.builder.quad_to(p1x, p1y, px, py);
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        let (p1x, p1y) = self.point(x1, y1);
        let (p2x, p2y) = self.point(x2, y2);
        let (px, py) = self.point(x, y);
        self.builder.cubic_to(p1x, p1y, p2x, p2y, px, py);
    }

    fn close(&mut self) {
        self.builder.close();
    }
}

impl OutlineFace {
    fn parse(&self) -> crate::error::Result<ttf_parser::Face<'_>> {
        ttf_parser::Face::parse(&self.data, self.index)
            .map_err(|e| ReceiptError::font(format!("Failed to parse face '{}': {e}", self.family)))
    }

    /// Rasterize `text` on one baseline. `embolden` > 0 strokes every
    /// outline with that width in pixels (synthetic bold).
    pub fn rasterize(
        &self,
        text: &str,
        opts: &RasterOptions,
        embolden: f32,
    ) -> crate::error::Result<GlyphRun> {
        if !(opts.size.is_finite() && opts.size > 0.0) {
            return Err(ReceiptError::font(format!("Invalid font size {}", opts.size)));
        }
        let face = self.parse()?;
        let scale = opts.size / face.units_per_em().max(1) as f32;
        let bbox = face.global_bounding_box();
        let stroke_pad = embolden.ceil() as i32;

        let left = ((-(bbox.x_min as f32)).max(0.0) * scale).ceil() as i32 + MASK_PAD + stroke_pad;
        let ascent = (bbox.y_max as f32 * scale).ceil() as i32 + MASK_PAD + stroke_pad;
        let descent = ((-(bbox.y_min as f32)).max(0.0) * scale).ceil() as i32 + MASK_PAD + stroke_pad;
        let right = (bbox.x_max as f32 * scale).ceil().max(0.0) as i32 + MASK_PAD + stroke_pad;

        // グリフ配置
        let mut placed = Vec::new();
        let mut pen = 0.0f32;
        for ch in text.chars() {
            let glyph = face
                .glyph_index(ch)
                .or_else(|| face.glyph_index('?'))
                .ok_or_else(|| {
                    ReceiptError::font(format!(
                        "Face '{}' has no glyph for '{ch}' and no '?' replacement",
                        self.family
                    ))
                })?;
            placed.push((glyph, pen));
            let advance = face.glyph_hor_advance(glyph).unwrap_or(0) as f32 * scale;
            pen += advance * opts.char_spacing;
        }

        let width = (left + pen.ceil() as i32 + right).max(1) as u32;
        let height = (ascent + descent).max(1) as u32;
        let mut pixmap = Pixmap::new(width, height).ok_or_else(|| {
            ReceiptError::font(format!("Cannot allocate {width}x{height} glyph mask"))
        })?;

        let mut paint = Paint::default();
        paint.set_color_rgba8(0, 0, 0, 255);
        paint.anti_alias = true;
        let stroke = Stroke {
            width: embolden,
            ..Stroke::default()
        };

        for (glyph, x) in placed {
            let mut sink = PathSink {
                builder: PathBuilder::new(),
                origin_x: left as f32 + x,
                origin_y: ascent as f32,
                scale,
            };
            if face.outline_glyph(glyph, &mut sink).is_none() {
                // 空白などアウトラインなし
                continue;
            }
            let Some(path) = sink.builder.finish() else {
                continue;
            };
            pixmap.fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);
            if embolden > 0.0 {
                pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
            }
        }

        Ok(GlyphRun {
            width,
            height,
            coverage: pixmap.pixels().iter().map(|p| p.alpha()).collect(),
            pen_x: left,
            baseline_y: ascent,
            advance: pen as f64,
        })
    }
}

fn load_face(
    db: &fontdb::Database,
    id: fontdb::ID,
    loaded: &mut HashMap<fontdb::ID, Arc<OutlineFace>>,
) -> Option<Arc<OutlineFace>> {
    if let Some(face) = loaded.get(&id) {
        return Some(Arc::clone(face));
    }
    let family = db
        .face(id)
        .and_then(|info| info.families.first().map(|(name, _)| name.clone()))
        .unwrap_or_else(|| "unknown".to_string());
    let (data, index) = db.with_face_data(id, |data, index| (data.to_vec(), index))?;
    // 解析できないフェイスは候補から外す
    ttf_parser::Face::parse(&data, index).ok()?;
    let face = Arc::new(OutlineFace {
        data: Arc::new(data),
        index,
        family,
    });
    loaded.insert(id, Arc::clone(&face));
    Some(face)
}

/// Find the first family in `families` present in `db`, with its bold face
/// when the family ships one.
pub fn resolve(
    db: &fontdb::Database,
    families: &[&str],
    loaded: &mut HashMap<fontdb::ID, Arc<OutlineFace>>,
) -> Option<Typeface> {
    for name in families {
        let family = [fontdb::Family::Name(name)];
        let regular_query = fontdb::Query {
            families: &family,
            ..Default::default()
        };
        let Some(regular_id) = db.query(&regular_query) else {
            continue;
        };
        let Some(regular) = load_face(db, regular_id, loaded) else {
            continue;
        };

        let bold_query = fontdb::Query {
            families: &family,
            weight: fontdb::Weight::BOLD,
            ..Default::default()
        };
        let bold = db
            .query(&bold_query)
            .filter(|id| *id != regular_id)
            .filter(|id| {
                db.face(*id)
                    .map(|info| info.weight.0 >= fontdb::Weight::SEMIBOLD.0)
                    .unwrap_or(false)
            })
            .and_then(|id| load_face(db, id, loaded));

        return Some(Typeface::Outline { regular, bold });
    }
    None
}
