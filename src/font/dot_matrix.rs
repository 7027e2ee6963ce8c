// Built-in 5x7 dot-matrix face (printable ASCII)
//
// Each glyph is seven rows of five bits, bit 4 being the leftmost column.
// Descender glyphs are drawn two rows lower, giving a cell of nine rows:
// seven above the baseline and two below.

use super::{GlyphRun, RasterOptions};
use crate::error::ReceiptError;

const CELL_COLS: u32 = 5;
const ROWS_ABOVE: u32 = 7;
const ROWS_BELOW: u32 = 2;
const MASK_PAD: u32 = 1;
const DESCENDERS: &str = "gpqy";

/// Glyph rows for 0x20..=0x7E.
const GLYPHS: [[u8; 7]; 95] = [
    [0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00], // ' '
    [0x04, 0x04, 0x04, 0x04, 0x00, 0x00, 0x04], // !
    [0x0A, 0x0A, 0x0A, 0x00, 0x00, 0x00, 0x00], // "
    [0x0A, 0x0A, 0x1F, 0x0A, 0x1F, 0x0A, 0x0A], // #
    [0x04, 0x0F, 0x14, 0x0E, 0x05, 0x1E, 0x04], // $
    [0x18, 0x19, 0x02, 0x04, 0x08, 0x13, 0x03], // %
    [0x0C, 0x12, 0x14, 0x08, 0x15, 0x12, 0x0D], // &
    [0x0C, 0x04, 0x08, 0x00, 0x00, 0x00, 0x00], // '
    [0x02, 0x04, 0x08, 0x08, 0x08, 0x04, 0x02], // (
    [0x08, 0x04, 0x02, 0x02, 0x02, 0x04, 0x08], // )
    [0x00, 0x04, 0x15, 0x0E, 0x15, 0x04, 0x00], // *
    [0x00, 0x04, 0x04, 0x1F, 0x04, 0x04, 0x00], // +
    [0x00, 0x00, 0x00, 0x00, 0x0C, 0x04, 0x08], // ,
    [0x00, 0x00, 0x00, 0x1F, 0x00, 0x00, 0x00], // -
    [0x00, 0x00, 0x00, 0x00, 0x00, 0x0C, 0x0C], // .
    [0x00, 0x01, 0x02, 0x04, 0x08, 0x10, 0x00], // /
    [0x0E, 0x11, 0x13, 0x15, 0x19, 0x11, 0x0E], // 0
    [0x04, 0x0C, 0x04, 0x04, 0x04, 0x04, 0x0E], // 1
    [0x0E, 0x11, 0x01, 0x02, 0x04, 0x08, 0x1F], // 2
    [0x1F, 0x02, 0x04, 0x02, 0x01, 0x11, 0x0E], // 3
    [0x02, 0x06, 0x0A, 0x12, 0x1F, 0x02, 0x02], // 4
    [0x1F, 0x10, 0x1E, 0x01, 0x01, 0x11, 0x0E], // 5
    [0x06, 0x08, 0x10, 0x1E, 0x11, 0x11, 0x0E], // 6
    [0x1F, 0x01, 0x02, 0x04, 0x08, 0x08, 0x08], // 7
    [0x0E, 0x11, 0x11, 0x0E, 0x11, 0x11, 0x0E], // 8
    [0x0E, 0x11, 0x11, 0x0F, 0x01, 0x02, 0x0C], // 9
    [0x00, 0x0C, 0x0C, 0x00, 0x0C, 0x0C, 0x00], // :
    [0x00, 0x0C, 0x0C, 0x00, 0x0C, 0x04, 0x08], // ;
    [0x02, 0x04, 0x08, 0x10, 0x08, 0x04, 0x02], // <
    [0x00, 0x00, 0x1F, 0x00, 0x1F, 0x00, 0x00], // =
    [0x08, 0x04, 0x02, 0x01, 0x02, 0x04, 0x08], // >
    [0x0E, 0x11, 0x01, 0x02, 0x04, 0x00, 0x04], // ?
    [0x0E, 0x11, 0x01, 0x0D, 0x15, 0x15, 0x0E], // @
    [0x0E, 0x11, 0x11, 0x11, 0x1F, 0x11, 0x11], // A
    [0x1E, 0x11, 0x11, 0x1E, 0x11, 0x11, 0x1E], // B
    [0x0E, 0x11, 0x10, 0x10, 0x10, 0x11, 0x0E], // C
    [0x1C, 0x12, 0x11, 0x11, 0x11, 0x12, 0x1C], // D
    [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x1F], // E
    [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x10], // F
    [0x0E, 0x11, 0x10, 0x17, 0x11, 0x11, 0x0F], // G
    [0x11, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11], // H
    [0x0E, 0x04, 0x04, 0x04, 0x04, 0x04, 0x0E], // I
    [0x07, 0x02, 0x02, 0x02, 0x02, 0x12, 0x0C], // J
    [0x11, 0x12, 0x14, 0x18, 0x14, 0x12, 0x11], // K
    [0x10, 0x10, 0x10, 0x10, 0x10, 0x10, 0x1F], // L
    [0x11, 0x1B, 0x15, 0x15, 0x11, 0x11, 0x11], // M
    [0x11, 0x11, 0x19, 0x15, 0x13, 0x11, 0x11], // N
    [0x0E, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E], // O
    [0x1E, 0x11, 0x11, 0x1E, 0x10, 0x10, 0x10], // P
    [0x0E, 0x11, 0x11, 0x11, 0x15, 0x12, 0x0D], // Q
    [0x1E, 0x11, 0x11, 0x1E, 0x14, 0x12, 0x11], // R
    [0x0F, 0x10, 0x10, 0x0E, 0x01, 0x01, 0x1E], // S
    [0x1F, 0x04, 0x04, 0x04, 0x04, 0x04, 0x04], // T
    [0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E], // U
    [0x11, 0x11, 0x11, 0x11, 0x11, 0x0A, 0x04], // V
    [0x11, 0x11, 0x11, 0x15, 0x15, 0x15, 0x0A], // W
    [0x11, 0x11, 0x0A, 0x04, 0x0A, 0x11, 0x11], // X
    [0x11, 0x11, 0x11, 0x0A, 0x04, 0x04, 0x04], // Y
    [0x1F, 0x01, 0x02, 0x04, 0x08, 0x10, 0x1F], // Z
    [0x0E, 0x08, 0x08, 0x08, 0x08, 0x08, 0x0E], // [
    [0x00, 0x10, 0x08, 0x04, 0x02, 0x01, 0x00], // backslash
    [0x0E, 0x02, 0x02, 0x02, 0x02, 0x02, 0x0E], // ]
    [0x04, 0x0A, 0x11, 0x00, 0x00, 0x00, 0x00], // ^
    [0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x1F], // _
    [0x08, 0x04, 0x02, 0x00, 0x00, 0x00, 0x00], // `
    [0x00, 0x00, 0x0E, 0x01, 0x0F, 0x11, 0x0F], // a
    [0x10, 0x10, 0x16, 0x19, 0x11, 0x11, 0x1E], // b
    [0x00, 0x00, 0x0E, 0x10, 0x10, 0x11, 0x0E], // c
    [0x01, 0x01, 0x0D, 0x13, 0x11, 0x11, 0x0F], // d
    [0x00, 0x00, 0x0E, 0x11, 0x1F, 0x10, 0x0E], // e
    [0x06, 0x09, 0x08, 0x1C, 0x08, 0x08, 0x08], // f
    [0x0F, 0x11, 0x11, 0x11, 0x0F, 0x01, 0x0E], // g (descender)
    [0x10, 0x10, 0x16, 0x19, 0x11, 0x11, 0x11], // h
    [0x04, 0x00, 0x0C, 0x04, 0x04, 0x04, 0x0E], // i
    [0x02, 0x00, 0x06, 0x02, 0x02, 0x12, 0x0C], // j
    [0x10, 0x10, 0x12, 0x14, 0x18, 0x14, 0x12], // k
    [0x0C, 0x04, 0x04, 0x04, 0x04, 0x04, 0x0E], // l
    [0x00, 0x00, 0x1A, 0x15, 0x15, 0x11, 0x11], // m
    [0x00, 0x00, 0x16, 0x19, 0x11, 0x11, 0x11], // n
    [0x00, 0x00, 0x0E, 0x11, 0x11, 0x11, 0x0E], // o
    [0x1E, 0x11, 0x11, 0x11, 0x1E, 0x10, 0x10], // p (descender)
    [0x0F, 0x11, 0x11, 0x11, 0x0F, 0x01, 0x01], // q (descender)
    [0x00, 0x00, 0x16, 0x19, 0x10, 0x10, 0x10], // r
    [0x00, 0x00, 0x0E, 0x10, 0x0E, 0x01, 0x1E], // s
    [0x08, 0x08, 0x1C, 0x08, 0x08, 0x09, 0x06], // t
    [0x00, 0x00, 0x11, 0x11, 0x11, 0x13, 0x0D], // u
    [0x00, 0x00, 0x11, 0x11, 0x11, 0x0A, 0x04], // v
    [0x00, 0x00, 0x11, 0x11, 0x15, 0x15, 0x0A], // w
    [0x00, 0x00, 0x11, 0x0A, 0x04, 0x0A, 0x11], // x
    [0x11, 0x11, 0x11, 0x11, 0x0F, 0x01, 0x0E], // y (descender)
    [0x00, 0x00, 0x1F, 0x02, 0x04, 0x08, 0x1F], // z
    [0x02, 0x04, 0x04, 0x08, 0x04, 0x04, 0x02], // {
    [0x04, 0x04, 0x04, 0x04, 0x04, 0x04, 0x04], // |
    [0x08, 0x04, 0x04, 0x02, 0x04, 0x04, 0x08], // }
    [0x00, 0x00, 0x08, 0x15, 0x02, 0x00, 0x00], // ~
];

/// Rows and vertical offset of `ch`; unsupported characters print as `?`.
fn glyph(ch: char) -> (&'static [u8; 7], u32) {
    let code = ch as u32;
    let index = if (0x20..=0x7E).contains(&code) {
        (code - 0x20) as usize
    } else {
        ('?' as u32 - 0x20) as usize
    };
    let shift = if DESCENDERS.contains(ch) { ROWS_BELOW } else { 0 };
    (&GLYPHS[index], shift)
}

/// Built-in bitmap face. Stateless: every size is drawn from the same table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DotMatrixFace;

impl DotMatrixFace {
    /// Pixel size of one dot cell for a font size, so that the seven rows
    /// above the baseline never exceed the line box ascent.
    pub fn dot_scale(size: f32) -> u32 {
        ((size * 0.95 / ROWS_ABOVE as f32).floor() as u32).max(1)
    }

    /// Horizontal advance of one character in pixels.
    pub fn advance(size: f32, char_spacing: f32) -> u32 {
        let scale = Self::dot_scale(size);
        let gap = ((scale as f32 * char_spacing).round() as u32).max(1);
        CELL_COLS * scale + gap
    }

    pub fn rasterize(&self, text: &str, opts: &RasterOptions) -> crate::error::Result<GlyphRun> {
        if !(opts.size.is_finite() && opts.size > 0.0) {
            return Err(ReceiptError::font(format!("Invalid font size {}", opts.size)));
        }
        let scale = Self::dot_scale(opts.size);
        let advance = Self::advance(opts.size, opts.char_spacing);
        // 2ドット以上なら隙間を空けてドットを分離する
        let dot = if opts.dot_pattern && scale >= 2 { scale - 1 } else { scale };
        let smear = u32::from(opts.bold);

        let count = text.chars().count() as u32;
        let width = MASK_PAD * 2 + count * advance + smear;
        let height = MASK_PAD * 2 + (ROWS_ABOVE + ROWS_BELOW) * scale;
        let mut run = GlyphRun::blank(
            width,
            height,
            MASK_PAD as i32,
            (MASK_PAD + ROWS_ABOVE * scale) as i32,
            (count * advance) as f64,
        );

        for (i, ch) in text.chars().enumerate() {
            let (rows, shift) = glyph(ch);
            let cell_x = MASK_PAD + i as u32 * advance;
            for (r, bits) in rows.iter().enumerate() {
                for c in 0..CELL_COLS {
                    if bits & (0x10 >> c) == 0 {
                        continue;
                    }
                    let x0 = cell_x + c * scale;
                    let y0 = MASK_PAD + (r as u32 + shift) * scale;
                    for y in y0..y0 + dot {
                        for x in x0..x0 + dot + smear {
                            run.coverage[(y * width + x) as usize] = 255;
                        }
                    }
                }
            }
        }
        Ok(run)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts(size: f32) -> RasterOptions {
        RasterOptions {
            size,
            bold: false,
            char_spacing: 1.0,
            dot_pattern: false,
        }
    }

    #[test]
    fn test_capital_sits_on_baseline() {
        let run = DotMatrixFace.rasterize("H", &opts(11.0)).expect("raster");
        let e = run.ink_extent().expect("ink");
        assert_eq!(e.row_max as i32, run.baseline_y);
        assert_eq!(e.row_max - e.row_min, 7);
        assert_eq!(e.col_max - e.col_min, 5);
    }

    #[test]
    fn test_descender_goes_below_baseline() {
        let run = DotMatrixFace.rasterize("g", &opts(11.0)).expect("raster");
        let e = run.ink_extent().expect("ink");
        assert_eq!(e.row_max as i32, run.baseline_y + 2);
    }

    #[test]
    fn test_space_has_no_ink() {
        let run = DotMatrixFace.rasterize("   ", &opts(11.0)).expect("raster");
        assert!(run.ink_extent().is_none());
        assert_eq!(run.advance, 3.0 * DotMatrixFace::advance(11.0, 1.0) as f64);
    }

    #[test]
    fn test_unknown_char_prints_question_mark() {
        let a = DotMatrixFace.rasterize("é", &opts(14.0)).expect("raster");
        let b = DotMatrixFace.rasterize("?", &opts(14.0)).expect("raster");
        assert_eq!(a.coverage, b.coverage);
    }

    #[test]
    fn test_scale_grows_with_size() {
        assert_eq!(DotMatrixFace::dot_scale(9.0), 1);
        assert_eq!(DotMatrixFace::dot_scale(20.0), 2);
        assert_eq!(DotMatrixFace::dot_scale(30.0), 4);
    }
}
