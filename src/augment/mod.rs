// Phase 6: Augmentation pipeline (post-raster effects, boxes untouched)
//
// Effects only ever see the pixel buffer. They run in one fixed order and
// must leave the canvas dimensions unchanged.

pub mod blur;
pub mod fold;
pub mod noise;
pub mod shadow;
pub mod stain;
pub mod texture;
pub mod tone;

use std::fmt;

use image::RgbImage;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ReceiptError;
use crate::seed::ReceiptRng;
use crate::style::{PrintTexture, StyleSettings};

/// Post-raster effect. Declaration order is the canonical application order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Effect {
    /// Style print texture (banding, edge fade, pressure zones, grain).
    PrintTexture,
    Noise,
    Blur,
    Contrast,
    Brightness,
    FoldLines,
    Stains,
    Shadow,
}

impl Effect {
    pub const CANONICAL_ORDER: [Effect; 8] = [
        Effect::PrintTexture,
        Effect::Noise,
        Effect::Blur,
        Effect::Contrast,
        Effect::Brightness,
        Effect::FoldLines,
        Effect::Stains,
        Effect::Shadow,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Effect::PrintTexture => "print_texture",
            Effect::Noise => "noise",
            Effect::Blur => "blur",
            Effect::Contrast => "contrast",
            Effect::Brightness => "brightness",
            Effect::FoldLines => "fold_lines",
            Effect::Stains => "stains",
            Effect::Shadow => "shadow",
        }
    }

    fn hint(&self, style: &StyleSettings) -> f32 {
        let hints = &style.hints;
        match self {
            Effect::PrintTexture => hints.print_texture,
            Effect::Noise => hints.noise,
            Effect::Blur => hints.blur,
            Effect::Contrast => hints.contrast,
            Effect::Brightness => hints.brightness,
            Effect::FoldLines => hints.fold_lines,
            Effect::Stains => hints.stains,
            Effect::Shadow => hints.shadow,
        }
    }

    fn run(
        &self,
        image: &mut RgbImage,
        intensity: f32,
        texture: &PrintTexture,
        rng: &mut ReceiptRng,
    ) {
        match self {
            Effect::PrintTexture => texture::apply(image, texture, intensity, rng),
            Effect::Noise => noise::apply(image, intensity, rng),
            Effect::Blur => blur::apply(image, intensity),
            Effect::Contrast => tone::contrast(image, intensity, rng),
            Effect::Brightness => tone::brightness(image, intensity, rng),
            Effect::FoldLines => fold::apply(image, intensity, rng),
            Effect::Stains => stain::apply(image, intensity, rng),
            Effect::Shadow => shadow::apply(image, intensity, rng),
        }
    }
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Toggle and intensity range of one effect.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectSettings {
    pub enabled: bool,
    pub min: f32,
    pub max: f32,
}

impl EffectSettings {
    pub fn enabled(min: f32, max: f32) -> Self {
        Self {
            enabled: true,
            min,
            max,
        }
    }

    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }
}

impl Default for EffectSettings {
    fn default() -> Self {
        Self::enabled(0.0, 0.5)
    }
}

/// Per-effect configuration, keyed like the YAML settings file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AugmentationSettings {
    pub print_texture: EffectSettings,
    pub noise: EffectSettings,
    pub blur: EffectSettings,
    pub contrast: EffectSettings,
    pub brightness: EffectSettings,
    pub fold_lines: EffectSettings,
    pub stains: EffectSettings,
    pub shadow: EffectSettings,
}

impl Default for AugmentationSettings {
    fn default() -> Self {
        Self {
            print_texture: EffectSettings::enabled(0.5, 1.0),
            noise: EffectSettings::enabled(0.0, 0.4),
            blur: EffectSettings::enabled(0.0, 0.3),
            contrast: EffectSettings::enabled(0.0, 1.0),
            brightness: EffectSettings::enabled(0.0, 1.0),
            fold_lines: EffectSettings::disabled(),
            stains: EffectSettings::disabled(),
            shadow: EffectSettings::disabled(),
        }
    }
}

impl AugmentationSettings {
    /// Every effect switched off.
    pub fn none() -> Self {
        Self {
            print_texture: EffectSettings::disabled(),
            noise: EffectSettings::disabled(),
            blur: EffectSettings::disabled(),
            contrast: EffectSettings::disabled(),
            brightness: EffectSettings::disabled(),
            fold_lines: EffectSettings::disabled(),
            stains: EffectSettings::disabled(),
            shadow: EffectSettings::disabled(),
        }
    }

    pub fn get(&self, effect: Effect) -> &EffectSettings {
        match effect {
            Effect::PrintTexture => &self.print_texture,
            Effect::Noise => &self.noise,
            Effect::Blur => &self.blur,
            Effect::Contrast => &self.contrast,
            Effect::Brightness => &self.brightness,
            Effect::FoldLines => &self.fold_lines,
            Effect::Stains => &self.stains,
            Effect::Shadow => &self.shadow,
        }
    }

    pub fn validate(&self) -> crate::error::Result<()> {
        for effect in Effect::CANONICAL_ORDER {
            let s = self.get(effect);
            let in_unit = |v: f32| (0.0..=1.0).contains(&v);
            if !in_unit(s.min) || !in_unit(s.max) || s.min > s.max {
                return Err(ReceiptError::config(format!(
                    "augmentation.{effect}: intensity range [{}, {}] must satisfy 0 <= min <= max <= 1",
                    s.min, s.max
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Step {
    effect: Effect,
    min: f32,
    max: f32,
    hint: f32,
}

/// Effect and the intensity it was applied with.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AppliedEffect {
    pub effect: Effect,
    pub intensity: f32,
}

/// Ordered list of enabled effects.
#[derive(Debug, Clone, PartialEq)]
pub struct AugmentationPipeline {
    steps: Vec<Step>,
    texture: PrintTexture,
}

impl AugmentationPipeline {
    /// The empty pipeline: runs the same code path and leaves pixels alone.
    pub fn identity() -> Self {
        Self {
            steps: Vec::new(),
            texture: PrintTexture::NONE,
        }
    }

    /// Enabled effects of `settings` in canonical order, scaled by the style's
    /// hints. The print texture step draws the style's own texture.
    pub fn from_settings(
        settings: &AugmentationSettings,
        style: &StyleSettings,
    ) -> crate::error::Result<Self> {
        settings.validate()?;
        let steps = Effect::CANONICAL_ORDER
            .into_iter()
            .filter_map(|effect| {
                let s = settings.get(effect);
                s.enabled.then(|| Step {
                    effect,
                    min: s.min,
                    max: s.max,
                    hint: effect.hint(style),
                })
            })
            .collect();
        Ok(Self {
            steps,
            texture: style.texture,
        })
    }

    pub fn is_identity(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn effects(&self) -> Vec<Effect> {
        self.steps.iter().map(|s| s.effect).collect()
    }

    /// Apply every step in order. Fails if an effect changed the image size.
    pub fn apply(
        &self,
        image: &mut RgbImage,
        rng: &mut ReceiptRng,
    ) -> crate::error::Result<Vec<AppliedEffect>> {
        let dims = image.dimensions();
        let mut applied = Vec::with_capacity(self.steps.len());
        for step in &self.steps {
            let sampled = if step.max > step.min {
                rng.random_range(step.min..=step.max)
            } else {
                step.min
            };
            let intensity = (sampled * step.hint).clamp(0.0, 1.0);
            if intensity > 0.0 {
                step.effect.run(image, intensity, &self.texture, rng);
            }
            if image.dimensions() != dims {
                return Err(ReceiptError::augmentation(format!(
                    "effect '{}' resized the canvas from {:?} to {:?}",
                    step.effect,
                    dims,
                    image.dimensions()
                )));
            }
            debug!(effect = %step.effect, intensity, "applied augmentation");
            applied.push(AppliedEffect {
                effect: step.effect,
                intensity,
            });
        }
        Ok(applied)
    }
}

/// `v` scaled and clamped into a channel value.
pub(crate) fn to_channel(v: f32) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}
