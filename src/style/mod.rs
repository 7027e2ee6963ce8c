// Phase 2: Printer style table (ReceiptStyle -> StyleSettings)

pub mod store;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ReceiptError;

/// Printer technology a receipt imitates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReceiptStyle {
    Thermal,
    Inkjet,
    DotMatrix,
    ModernPos,
    CarbonCopy,
}

impl ReceiptStyle {
    pub const ALL: [ReceiptStyle; 5] = [
        ReceiptStyle::Thermal,
        ReceiptStyle::Inkjet,
        ReceiptStyle::DotMatrix,
        ReceiptStyle::ModernPos,
        ReceiptStyle::CarbonCopy,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReceiptStyle::Thermal => "thermal",
            ReceiptStyle::Inkjet => "inkjet",
            ReceiptStyle::DotMatrix => "dot-matrix",
            ReceiptStyle::ModernPos => "modern-pos",
            ReceiptStyle::CarbonCopy => "carbon-copy",
        }
    }
}

impl fmt::Display for ReceiptStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReceiptStyle {
    type Err = ReceiptError;

    /// `dot-matrix` と `dot_matrix` の両方を受け付ける。
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        ReceiptStyle::ALL
            .into_iter()
            .find(|style| style.as_str() == normalized)
            .ok_or_else(|| ReceiptError::config(format!("Unknown receipt style: '{s}'")))
    }
}

/// Typeface family class a style asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypefaceClass {
    Monospace,
    SansSerif,
    Typewriter,
    /// Built-in 5x7 dot-matrix face; never resolved from the system.
    DotMatrix,
}

/// Multipliers applied to sampled augmentation intensities.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AugmentationHints {
    pub noise: f32,
    pub blur: f32,
    pub contrast: f32,
    pub brightness: f32,
    pub fold_lines: f32,
    pub stains: f32,
    pub shadow: f32,
    pub print_texture: f32,
}

/// Print-head texture of a style, laid over the finished page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PrintTexture {
    /// Chance that a print-head row (every third pixel row) comes out light.
    pub banding: f64,
    /// Width of the faded strip along the left and right paper edges.
    pub edge_fade_px: u32,
    /// Circular zones of uneven pen pressure.
    pub pressure_zones: u32,
    /// 1.0 prints clean; lower values add grain.
    pub print_quality: f32,
}

impl PrintTexture {
    pub const NONE: PrintTexture = PrintTexture {
        banding: 0.0,
        edge_fade_px: 0,
        pressure_zones: 0,
        print_quality: 1.0,
    };

    pub fn is_none(&self) -> bool {
        *self == Self::NONE
    }
}

/// Resolved parameters of one printer style.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleSettings {
    pub style: ReceiptStyle,
    pub typeface: TypefaceClass,
    /// fontdb family names tried in order.
    pub families: &'static [&'static str],
    /// Headers and the total line are set in bold.
    pub bold_emphasis: bool,
    /// Advance multiplier.
    pub char_spacing: f32,
    /// Line box multiplier.
    pub line_spacing: f32,
    pub paper: [u8; 3],
    pub ink: [u8; 3],
    /// Maximum ink opacity in `[0, 1]`.
    pub ink_darkness: f32,
    /// Per-token fading: opacity is scaled by `1 - ink_variation * u`, `u ~ U[0,1)`.
    pub ink_variation: f32,
    /// Horizontal offset of a second strike in pixels (0 = none).
    pub double_strike_px: u32,
    /// Draw glyphs as separated dots.
    pub dot_pattern: bool,
    pub texture: PrintTexture,
    pub hints: AugmentationHints,
}

const MONO_FAMILIES: &[&str] = &[
    "DejaVu Sans Mono",
    "Liberation Mono",
    "Courier New",
    "Ubuntu Mono",
    "Noto Sans Mono",
];

const SANS_FAMILIES: &[&str] = &[
    "DejaVu Sans",
    "Liberation Sans",
    "Arial",
    "Helvetica",
    "Noto Sans",
    "Roboto",
];

const TYPEWRITER_FAMILIES: &[&str] = &[
    "Courier New",
    "Liberation Mono",
    "DejaVu Serif",
    "Liberation Serif",
    "Times New Roman",
];

static STYLE_TABLE: [StyleSettings; 5] = [
    StyleSettings {
        style: ReceiptStyle::Thermal,
        typeface: TypefaceClass::Monospace,
        families: MONO_FAMILIES,
        bold_emphasis: true,
        char_spacing: 1.0,
        line_spacing: 1.1,
        paper: [248, 248, 248],
        ink: [40, 40, 40],
        ink_darkness: 0.85,
        ink_variation: 0.15,
        double_strike_px: 0,
        dot_pattern: false,
        texture: PrintTexture {
            banding: 0.1,
            edge_fade_px: 20,
            pressure_zones: 0,
            print_quality: 0.85,
        },
        hints: AugmentationHints {
            noise: 1.0,
            blur: 0.8,
            contrast: 1.0,
            brightness: 1.0,
            fold_lines: 1.0,
            stains: 0.8,
            shadow: 1.0,
            print_texture: 1.0,
        },
    },
    StyleSettings {
        style: ReceiptStyle::Inkjet,
        typeface: TypefaceClass::SansSerif,
        families: SANS_FAMILIES,
        bold_emphasis: true,
        char_spacing: 1.0,
        line_spacing: 1.2,
        paper: [255, 255, 255],
        ink: [0, 0, 0],
        ink_darkness: 0.95,
        ink_variation: 0.05,
        double_strike_px: 0,
        dot_pattern: false,
        texture: PrintTexture {
            print_quality: 0.95,
            ..PrintTexture::NONE
        },
        hints: AugmentationHints {
            noise: 0.5,
            blur: 0.5,
            contrast: 0.8,
            brightness: 0.8,
            fold_lines: 0.8,
            stains: 0.6,
            shadow: 0.6,
            print_texture: 1.0,
        },
    },
    StyleSettings {
        style: ReceiptStyle::DotMatrix,
        typeface: TypefaceClass::DotMatrix,
        families: &[],
        bold_emphasis: true,
        char_spacing: 1.2,
        line_spacing: 1.3,
        paper: [252, 252, 250],
        ink: [20, 20, 80],
        ink_darkness: 0.7,
        ink_variation: 0.2,
        double_strike_px: 0,
        dot_pattern: true,
        texture: PrintTexture {
            print_quality: 0.7,
            ..PrintTexture::NONE
        },
        hints: AugmentationHints {
            noise: 1.2,
            blur: 0.6,
            contrast: 1.0,
            brightness: 1.0,
            fold_lines: 1.2,
            stains: 1.0,
            shadow: 0.8,
            print_texture: 1.0,
        },
    },
    StyleSettings {
        style: ReceiptStyle::ModernPos,
        typeface: TypefaceClass::SansSerif,
        families: SANS_FAMILIES,
        bold_emphasis: true,
        char_spacing: 0.95,
        line_spacing: 1.15,
        paper: [255, 255, 255],
        ink: [0, 0, 0],
        ink_darkness: 1.0,
        ink_variation: 0.0,
        double_strike_px: 0,
        dot_pattern: false,
        texture: PrintTexture::NONE,
        hints: AugmentationHints {
            noise: 0.3,
            blur: 0.3,
            contrast: 0.5,
            brightness: 0.5,
            fold_lines: 0.5,
            stains: 0.3,
            shadow: 0.3,
            print_texture: 1.0,
        },
    },
    StyleSettings {
        style: ReceiptStyle::CarbonCopy,
        typeface: TypefaceClass::Typewriter,
        families: TYPEWRITER_FAMILIES,
        bold_emphasis: false,
        char_spacing: 1.1,
        line_spacing: 1.25,
        paper: [250, 248, 245],
        ink: [60, 60, 100],
        ink_darkness: 0.75,
        ink_variation: 0.25,
        double_strike_px: 1,
        dot_pattern: false,
        texture: PrintTexture {
            pressure_zones: 5,
            print_quality: 0.75,
            ..PrintTexture::NONE
        },
        hints: AugmentationHints {
            noise: 1.0,
            blur: 1.0,
            contrast: 1.0,
            brightness: 1.0,
            fold_lines: 1.0,
            stains: 1.2,
            shadow: 1.0,
            print_texture: 1.0,
        },
    },
];

/// Look up the settings of `style`. Pure; every variant has exactly one row.
pub fn resolve_style(style: ReceiptStyle) -> &'static StyleSettings {
    match style {
        ReceiptStyle::Thermal => &STYLE_TABLE[0],
        ReceiptStyle::Inkjet => &STYLE_TABLE[1],
        ReceiptStyle::DotMatrix => &STYLE_TABLE[2],
        ReceiptStyle::ModernPos => &STYLE_TABLE[3],
        ReceiptStyle::CarbonCopy => &STYLE_TABLE[4],
    }
}

/// Resolve a style by name (`thermal`, `dot-matrix`, ...).
pub fn resolve_style_name(name: &str) -> crate::error::Result<&'static StyleSettings> {
    Ok(resolve_style(name.parse()?))
}
