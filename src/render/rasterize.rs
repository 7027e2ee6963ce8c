// Token placement and ink compositing

use image::{Rgb, RgbImage};

use crate::error::ReceiptError;
use crate::font::{GlyphRun, RasterOptions, Typeface};
use crate::geometry::AxisBox;
use crate::layout::{Alignment, TextBlock};
use crate::style::StyleSettings;

/// Opacity of the carbon-copy second strike relative to the first.
const DOUBLE_STRIKE_STRENGTH: f32 = 0.6;

/// A glyph run positioned on the canvas pixel grid.
#[derive(Debug, Clone)]
pub struct PlacedRun {
    pub run: GlyphRun,
    /// Canvas column of mask column 0.
    pub origin_x: i64,
    /// Canvas row of mask row 0.
    pub origin_y: i64,
}

impl PlacedRun {
    /// Measured ink extent in canvas coordinates, `None` for blank text.
    pub fn ink_box(&self) -> Option<AxisBox> {
        let e = self.run.ink_extent()?;
        Some(AxisBox::new(
            (self.origin_x + e.col_min as i64) as f64,
            (self.origin_y + e.row_min as i64) as f64,
            (self.origin_x + e.col_max as i64) as f64,
            (self.origin_y + e.row_max as i64) as f64,
        ))
    }

    /// Blend the mask into `image` with the given ink colour and opacity.
    ///
    /// Every inked mask pixel must land on the canvas; nothing is clipped.
    pub fn composite(&self, image: &mut RgbImage, ink: [u8; 3], opacity: f32) -> crate::error::Result<()> {
        let (w, h) = (image.width() as i64, image.height() as i64);
        for my in 0..self.run.height {
            for mx in 0..self.run.width {
                let c = self.run.at(mx, my);
                if c == 0 {
                    continue;
                }
                let x = self.origin_x + mx as i64;
                let y = self.origin_y + my as i64;
                if x < 0 || y < 0 || x >= w || y >= h {
                    return Err(ReceiptError::render(format!(
                        "ink pixel ({x}, {y}) falls outside the {w}x{h} canvas"
                    )));
                }
                let alpha = (c as f32 / 255.0) * opacity;
                let px = image.get_pixel_mut(x as u32, y as u32);
                *px = blend(*px, ink, alpha);
            }
        }
        Ok(())
    }
}

/// `dst * (1 - alpha) + ink * alpha`, per channel.
pub fn blend(dst: Rgb<u8>, ink: [u8; 3], alpha: f32) -> Rgb<u8> {
    let a = alpha.clamp(0.0, 1.0);
    let mix = |d: u8, s: u8| (d as f32 * (1.0 - a) + s as f32 * a).round().clamp(0.0, 255.0) as u8;
    Rgb([mix(dst[0], ink[0]), mix(dst[1], ink[1]), mix(dst[2], ink[2])])
}

pub fn raster_options(block: &TextBlock, style: &StyleSettings) -> RasterOptions {
    RasterOptions {
        size: block.font.size,
        bold: block.font.bold,
        char_spacing: style.char_spacing,
        dot_pattern: style.dot_pattern,
    }
}

/// Rasterize `text` in the block's font and place it at the block's anchor.
pub fn place_text(
    typeface: &Typeface,
    block: &TextBlock,
    text: &str,
    style: &StyleSettings,
) -> crate::error::Result<PlacedRun> {
    let mut run = typeface.rasterize(text, &raster_options(block, style))?;
    if style.double_strike_px > 0 {
        run = run.with_double_strike(style.double_strike_px, DOUBLE_STRIKE_STRENGTH);
    }

    let pen_left = match block.alignment {
        Alignment::Left => block.anchor.x,
        Alignment::Center => block.anchor.x - run.advance / 2.0,
        Alignment::Right => block.anchor.x - run.advance,
    };
    let origin_x = pen_left.round() as i64 - run.pen_x as i64;
    let origin_y = block.anchor.y.round() as i64 - run.baseline_y as i64;
    Ok(PlacedRun {
        run,
        origin_x,
        origin_y,
    })
}

/// Draw a dashed horizontal rule one pixel high.
pub fn draw_rule(image: &mut RgbImage, y: u32, x_start: u32, x_end: u32, ink: [u8; 3], alpha: f32) {
    if y >= image.height() {
        return;
    }
    let x_end = x_end.min(image.width());
    for x in x_start..x_end {
        // 4px描画・2px空白の破線
        if (x - x_start) % 6 < 4 {
            let px = image.get_pixel_mut(x, y);
            *px = blend(*px, ink, alpha);
        }
    }
}
