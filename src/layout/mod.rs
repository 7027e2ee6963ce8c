// Phase 1: Layout model (text blocks with semantic roles)

pub mod builder;

pub use builder::{LayoutParams, build_layout};

use serde::{Deserialize, Serialize};

use crate::geometry::Point;
use crate::style::store::StoreType;

/// Ascent of a line box in ems (baseline to top).
pub const ASCENT_EM: f32 = 0.95;
/// Descent of a line box in ems (baseline to bottom).
pub const DESCENT_EM: f32 = 0.30;
/// Height of one line box in ems before the style's line spacing is applied.
pub const LINE_BOX_EM: f32 = ASCENT_EM + DESCENT_EM;

/// Semantic role of a text block. The declaration order is the class index
/// used by the normalized export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    HeaderLine,
    AddressLine,
    DateLine,
    ItemName,
    ItemQuantity,
    ItemPrice,
    Subtotal,
    Tax,
    Total,
    FooterLine,
}

impl Role {
    pub const ALL: [Role; 10] = [
        Role::HeaderLine,
        Role::AddressLine,
        Role::DateLine,
        Role::ItemName,
        Role::ItemQuantity,
        Role::ItemPrice,
        Role::Subtotal,
        Role::Tax,
        Role::Total,
        Role::FooterLine,
    ];

    pub fn class_index(&self) -> usize {
        *self as usize
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::HeaderLine => "header-line",
            Role::AddressLine => "address-line",
            Role::DateLine => "date-line",
            Role::ItemName => "item-name",
            Role::ItemQuantity => "item-quantity",
            Role::ItemPrice => "item-price",
            Role::Subtotal => "subtotal",
            Role::Tax => "tax",
            Role::Total => "total",
            Role::FooterLine => "footer-line",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    Left,
    Center,
    Right,
}

/// Font reference of a block: pixel size and weight.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FontSpec {
    pub size: f32,
    pub bold: bool,
}

impl FontSpec {
    pub fn regular(size: f32) -> Self {
        Self { size, bold: false }
    }

    pub fn bold(size: f32) -> Self {
        Self { size, bold: true }
    }
}

/// One token placed on the canvas.
///
/// `anchor.x` is the left edge, centre or right edge of the advance
/// depending on `alignment`; `anchor.y` is the baseline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextBlock {
    pub role: Role,
    pub text: String,
    pub font: FontSpec,
    pub anchor: Point,
    pub alignment: Alignment,
    /// Visual line index; blocks sharing a row sit on the same baseline.
    pub row: u32,
}

impl TextBlock {
    /// Copy of this block carrying different text (used for truncation).
    pub fn with_text(&self, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..self.clone()
        }
    }
}

/// Horizontal rule between sections.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Separator {
    /// Pixel row the rule is drawn on.
    pub y: u32,
    pub x_start: u32,
    pub x_end: u32,
}

/// Complete description of one receipt before rasterization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    pub store_type: StoreType,
    pub width: u32,
    pub height: u32,
    pub margin: u32,
    /// Blocks in reading order.
    pub blocks: Vec<TextBlock>,
    pub separators: Vec<Separator>,
}
