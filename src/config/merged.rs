use std::path::PathBuf;

use super::job::{Job, StoreMix};
use super::settings::{Settings, validate_generation};
use crate::augment::AugmentationSettings;
use crate::export::ExportFormat;
use crate::style::ReceiptStyle;
use crate::transform::TransformSettings;

#[derive(Debug, Clone)]
pub struct MergedConfig {
    pub output: PathBuf,
    pub count: usize,
    pub seed: u64,
    pub store_mix: StoreMix,
    pub style: Option<ReceiptStyle>,
    pub width_range: [u32; 2],
    pub margin_range: [u32; 2],
    pub section_gap: f32,
    pub transform: TransformSettings,
    pub max_transform_attempts: u32,
    pub augmentation: AugmentationSettings,
    pub export_formats: Vec<ExportFormat>,
    pub parallel_workers: usize,
    pub currency_symbol: String,
    pub system_fonts: bool,
}

impl MergedConfig {
    /// JobのOption値がSomeならJobの値を、NoneならSettingsの値を使用する。
    ///
    /// `output` is taken verbatim; callers resolve it against the job
    /// file's directory.
    pub fn new(settings: &Settings, job: &Job) -> Self {
        let augmentation = if job.augment == Some(false) {
            AugmentationSettings::none()
        } else {
            settings.augmentation.clone()
        };
        MergedConfig {
            output: PathBuf::from(&job.output),
            count: job.count,
            seed: job.seed,
            store_mix: job.store_mix.clone(),
            style: job.style,
            width_range: settings.width_range,
            margin_range: settings.margin_range,
            section_gap: settings.section_gap,
            transform: TransformSettings {
                max_rotation_deg: job.rotation_degrees.unwrap_or(settings.rotation_degrees),
                perspective: job.perspective.unwrap_or(settings.perspective),
            },
            max_transform_attempts: settings.max_transform_attempts,
            augmentation,
            export_formats: job
                .export_formats
                .clone()
                .unwrap_or_else(|| settings.export_formats.clone()),
            parallel_workers: settings.parallel_workers,
            currency_symbol: settings.currency_symbol.clone(),
            system_fonts: settings.system_fonts,
        }
    }

    /// Job overrides can push values out of range; check the merged result.
    pub fn validate(&self) -> crate::error::Result<()> {
        validate_generation(
            self.width_range,
            self.margin_range,
            self.section_gap,
            self.transform.max_rotation_deg,
            self.transform.perspective,
            self.max_transform_attempts,
        )?;
        self.augmentation.validate()
    }
}
