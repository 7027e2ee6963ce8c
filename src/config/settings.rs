use std::path::Path;

use serde::Deserialize;

use crate::augment::AugmentationSettings;
use crate::error::ReceiptError;
use crate::export::ExportFormat;
use crate::layout::builder::MIN_CONTENT_WIDTH;

/// Largest rotation accepted from configuration, degrees.
pub const MAX_ROTATION_DEGREES: f64 = 45.0;
/// Largest perspective jitter accepted, fraction of the shorter side.
pub const MAX_PERSPECTIVE: f64 = 0.25;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Inclusive canvas width range in pixels.
    pub width_range: [u32; 2],
    /// Inclusive margin range in pixels.
    pub margin_range: [u32; 2],
    pub section_gap: f32,
    pub rotation_degrees: f64,
    pub perspective: f64,
    pub max_transform_attempts: u32,
    pub augmentation: AugmentationSettings,
    pub export_formats: Vec<ExportFormat>,
    pub parallel_workers: usize,
    pub currency_symbol: String,
    /// Resolve outline fonts from the system; `false` uses the built-in
    /// dot-matrix face for every style.
    pub system_fonts: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            width_range: [280, 400],
            margin_range: [15, 30],
            section_gap: 6.0,
            rotation_degrees: 3.0,
            perspective: 0.0,
            max_transform_attempts: 5,
            augmentation: AugmentationSettings::default(),
            export_formats: ExportFormat::ALL.to_vec(),
            parallel_workers: 0,
            currency_symbol: "$".to_string(),
            system_fonts: true,
        }
    }
}

impl Settings {
    pub fn from_yaml(yaml: &str) -> crate::error::Result<Self> {
        let settings: Settings = serde_yml::from_str(yaml).map_err(|e| {
            ReceiptError::config(format!("Failed to parse settings YAML: {e}"))
        })?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_file(path: &Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// 範囲・上限の整合性を検証する。
    pub fn validate(&self) -> crate::error::Result<()> {
        validate_generation(
            self.width_range,
            self.margin_range,
            self.section_gap,
            self.rotation_degrees,
            self.perspective,
            self.max_transform_attempts,
        )?;
        self.augmentation.validate()
    }
}

/// Checks shared by `Settings` and `MergedConfig`.
pub(crate) fn validate_generation(
    width_range: [u32; 2],
    margin_range: [u32; 2],
    section_gap: f32,
    rotation_degrees: f64,
    perspective: f64,
    max_transform_attempts: u32,
) -> crate::error::Result<()> {
    let [w_min, w_max] = width_range;
    let [m_min, m_max] = margin_range;
    if w_min == 0 || w_min > w_max {
        return Err(ReceiptError::config(format!(
            "width_range [{w_min}, {w_max}] must be non-empty and positive"
        )));
    }
    if m_min > m_max {
        return Err(ReceiptError::config(format!(
            "margin_range [{m_min}, {m_max}] is empty"
        )));
    }
    if w_min < m_max.saturating_mul(2).saturating_add(MIN_CONTENT_WIDTH) {
        return Err(ReceiptError::config(format!(
            "width_range minimum {w_min} leaves less than {MIN_CONTENT_WIDTH}px between margins up to {m_max}"
        )));
    }
    if !(section_gap.is_finite() && section_gap >= 0.0) {
        return Err(ReceiptError::config(format!(
            "section_gap must be non-negative, got {section_gap}"
        )));
    }
    if !(0.0..=MAX_ROTATION_DEGREES).contains(&rotation_degrees) {
        return Err(ReceiptError::config(format!(
            "rotation_degrees must be within [0, {MAX_ROTATION_DEGREES}], got {rotation_degrees}"
        )));
    }
    if !(0.0..=MAX_PERSPECTIVE).contains(&perspective) {
        return Err(ReceiptError::config(format!(
            "perspective must be within [0, {MAX_PERSPECTIVE}], got {perspective}"
        )));
    }
    if max_transform_attempts == 0 {
        return Err(ReceiptError::config(
            "max_transform_attempts must be at least 1",
        ));
    }
    Ok(())
}
