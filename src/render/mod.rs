// Phase 4: Rendering engine (layout -> canvas + tight token boxes)

pub mod fit;
pub mod rasterize;

use std::collections::BTreeMap;

use image::{Rgb, RgbImage};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ReceiptError;
use crate::font::Typeface;
use crate::geometry::{AxisBox, BOX_MARGIN_PX, BoundingBox};
use crate::layout::{Alignment, Layout, Role, TextBlock};
use crate::seed::ReceiptRng;
use crate::style::StyleSettings;
use fit::{Fitted, Span, fit_block};
use rasterize::draw_rule;

/// Opacity of separator rules relative to text ink.
const RULE_OPACITY: f32 = 0.5;

/// Raster surface filled with the paper colour.
#[derive(Debug, Clone, PartialEq)]
pub struct Canvas {
    pub image: RgbImage,
    pub paper: Rgb<u8>,
}

impl Canvas {
    pub fn new(width: u32, height: u32, paper: [u8; 3]) -> crate::error::Result<Self> {
        if width == 0 || height == 0 {
            return Err(ReceiptError::render(format!(
                "canvas must be non-empty, got {width}x{height}"
            )));
        }
        Ok(Self {
            image: RgbImage::from_pixel(width, height, Rgb(paper)),
            paper: Rgb(paper),
        })
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }
}

/// One truncation applied while fitting a row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Truncation {
    pub block_index: usize,
    pub role: Role,
    pub original: String,
    pub rendered: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RenderReport {
    pub truncations: Vec<Truncation>,
}

/// Output of the rendering engine.
#[derive(Debug, Clone)]
pub struct RenderedReceipt {
    pub canvas: Canvas,
    /// Fitted blocks, 1:1 with the layout's blocks.
    pub blocks: Vec<TextBlock>,
    /// Axis-aligned token boxes in reading order.
    pub boxes: Vec<BoundingBox>,
    /// Measured ink extent of each token (the box minus the margin).
    pub ink: Vec<AxisBox>,
    pub report: RenderReport,
}

/// 行内の処理順: 右寄せ(金額)を先に確定し、左寄せ・中央寄せをその残りに収める。
fn fit_priority(alignment: Alignment) -> u8 {
    match alignment {
        Alignment::Right => 0,
        Alignment::Left => 1,
        Alignment::Center => 2,
    }
}

/// Render every block of `layout` onto a fresh canvas.
///
/// Random draws (per-token ink fading) happen in block order, so the output
/// is a pure function of the inputs and the generator state.
pub fn render_layout(
    layout: &Layout,
    style: &StyleSettings,
    typeface: &Typeface,
    rng: &mut ReceiptRng,
) -> crate::error::Result<RenderedReceipt> {
    let mut canvas = Canvas::new(layout.width, layout.height, style.paper)?;

    for rule in &layout.separators {
        draw_rule(
            &mut canvas.image,
            rule.y,
            rule.x_start,
            rule.x_end,
            style.ink,
            style.ink_darkness * RULE_OPACITY,
        );
    }

    // ブロックを行ごとにまとめる
    let mut rows: BTreeMap<u32, Vec<usize>> = BTreeMap::new();
    for (i, block) in layout.blocks.iter().enumerate() {
        rows.entry(block.row).or_default().push(i);
    }

    // インク領域がはみ出してよい範囲: マージンの半分まで
    let half_margin = layout.margin as f64 / 2.0;
    let edge = Span {
        lo: half_margin,
        hi: layout.width as f64 - half_margin,
    };

    let mut fitted: Vec<Option<Fitted>> = vec![None; layout.blocks.len()];
    let mut report = RenderReport::default();

    for indices in rows.values() {
        let mut order = indices.clone();
        order.sort_by_key(|&i| (fit_priority(layout.blocks[i].alignment), i));

        let mut placed_boxes: Vec<AxisBox> = Vec::new();
        for i in order {
            let block = &layout.blocks[i];
            let mut span = edge;
            for neighbour in &placed_boxes {
                span.exclude(block.anchor.x, neighbour)?;
            }
            let result = fit_block(typeface, block, style, span)?;
            if result.truncated {
                report.truncations.push(Truncation {
                    block_index: i,
                    role: block.role,
                    original: block.text.clone(),
                    rendered: result.block.text.clone(),
                });
            }
            placed_boxes.push(result.ink.expanded(BOX_MARGIN_PX));
            fitted[i] = Some(result);
        }
    }

    let mut blocks = Vec::with_capacity(fitted.len());
    let mut boxes = Vec::with_capacity(fitted.len());
    let mut ink = Vec::with_capacity(fitted.len());
    for (i, slot) in fitted.into_iter().enumerate() {
        let f = slot.ok_or_else(|| ReceiptError::render(format!("block {i} was never fitted")))?;

        let bbox = f.ink.expanded(BOX_MARGIN_PX);
        if bbox.x_min < 0.0
            || bbox.y_min < 0.0
            || bbox.x_max > canvas.width() as f64
            || bbox.y_max > canvas.height() as f64
        {
            return Err(ReceiptError::render(format!(
                "box of token '{}' [{}, {}, {}, {}] leaves the {}x{} canvas",
                f.block.text,
                bbox.x_min,
                bbox.y_min,
                bbox.x_max,
                bbox.y_max,
                canvas.width(),
                canvas.height()
            )));
        }

        let fade: f32 = rng.random();
        let opacity = style.ink_darkness * (1.0 - style.ink_variation * fade);
        f.placed.composite(&mut canvas.image, style.ink, opacity)?;

        boxes.push(BoundingBox::axis_aligned(f.block.text.clone(), f.block.role, &bbox));
        ink.push(f.ink);
        blocks.push(f.block);
    }

    debug!(
        width = canvas.width(),
        height = canvas.height(),
        tokens = boxes.len(),
        truncations = report.truncations.len(),
        "rendered receipt canvas"
    );

    Ok(RenderedReceipt {
        canvas,
        blocks,
        boxes,
        ink,
        report,
    })
}
