// Row fitting: truncate tokens whose ink crosses the content edge or a row
// neighbour.
//
// Policy: drop characters from the end, trim trailing whitespace, append
// "...", re-measure; repeat until the ink fits. One character plus the
// ellipsis is the shortest candidate.

use tracing::warn;

use super::rasterize::{PlacedRun, place_text};
use crate::error::ReceiptError;
use crate::font::Typeface;
use crate::geometry::{AxisBox, BOX_MARGIN_PX};
use crate::layout::TextBlock;
use crate::style::StyleSettings;

/// Minimum horizontal gap between the boxes of two tokens on one row.
pub const COLUMN_GAP_PX: f64 = 8.0;

pub const ELLIPSIS: &str = "...";

/// Horizontal interval the ink of a token must stay inside.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Span {
    pub lo: f64,
    pub hi: f64,
}

impl Span {
    pub fn contains(&self, ink: &AxisBox) -> bool {
        ink.x_min >= self.lo && ink.x_max <= self.hi
    }

    /// Narrow this span so a token anchored at `anchor_x` keeps its box at
    /// least `COLUMN_GAP_PX` away from `neighbour` (an already placed box).
    pub fn exclude(&mut self, anchor_x: f64, neighbour: &AxisBox) -> crate::error::Result<()> {
        let clearance = COLUMN_GAP_PX + BOX_MARGIN_PX;
        if neighbour.x_min >= anchor_x {
            self.hi = self.hi.min(neighbour.x_min - clearance);
        } else if neighbour.x_max <= anchor_x {
            self.lo = self.lo.max(neighbour.x_max + clearance);
        } else {
            return Err(ReceiptError::layout_overflow(format!(
                "anchor x={anchor_x} lies inside a neighbouring token box [{}, {}]",
                neighbour.x_min, neighbour.x_max
            )));
        }
        Ok(())
    }
}

/// A block after fitting, with its placed mask and measured ink.
#[derive(Debug, Clone)]
pub struct Fitted {
    pub block: TextBlock,
    pub placed: PlacedRun,
    pub ink: AxisBox,
    pub truncated: bool,
}

fn measure(
    typeface: &Typeface,
    block: &TextBlock,
    text: &str,
    style: &StyleSettings,
) -> crate::error::Result<(PlacedRun, Option<AxisBox>)> {
    let placed = place_text(typeface, block, text, style)?;
    let ink = placed.ink_box();
    Ok((placed, ink))
}

/// Fit `block` into `span`, truncating when needed.
pub fn fit_block(
    typeface: &Typeface,
    block: &TextBlock,
    style: &StyleSettings,
    span: Span,
) -> crate::error::Result<Fitted> {
    let (placed, ink) = measure(typeface, block, &block.text, style)?;
    let ink = ink.ok_or_else(|| {
        ReceiptError::render(format!("token '{}' produced no ink", block.text))
    })?;
    if span.contains(&ink) {
        return Ok(Fitted {
            block: block.clone(),
            placed,
            ink,
            truncated: false,
        });
    }

    let chars: Vec<char> = block.text.chars().collect();
    for keep in (1..chars.len()).rev() {
        let head: String = chars[..keep].iter().collect();
        let head = head.trim_end();
        if head.is_empty() {
            continue;
        }
        let candidate = format!("{head}{ELLIPSIS}");
        let (placed, ink) = measure(typeface, block, &candidate, style)?;
        let Some(ink) = ink else {
            continue;
        };
        if span.contains(&ink) {
            warn!(
                role = block.role.as_str(),
                original = %block.text,
                rendered = %candidate,
                "token truncated to fit its row"
            );
            return Ok(Fitted {
                block: block.with_text(candidate),
                placed,
                ink,
                truncated: true,
            });
        }
    }

    Err(ReceiptError::layout_overflow(format!(
        "token '{}' does not fit in [{:.1}, {:.1}] even when truncated",
        block.text, span.lo, span.hi
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exclude_right_neighbour() {
        let mut span = Span { lo: 10.0, hi: 300.0 };
        span.exclude(20.0, &AxisBox::new(250.0, 0.0, 290.0, 10.0))
            .expect("exclude");
        assert_eq!(span.hi, 250.0 - COLUMN_GAP_PX - BOX_MARGIN_PX);
        assert_eq!(span.lo, 10.0);
    }

    #[test]
    fn test_exclude_rejects_overlapping_anchor() {
        let mut span = Span { lo: 0.0, hi: 100.0 };
        assert!(span.exclude(50.0, &AxisBox::new(40.0, 0.0, 60.0, 5.0)).is_err());
    }
}
