// Phase 8: 1枚単位: content -> layout -> render -> transform -> augment -> record

use image::RgbImage;
use rand::Rng;
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::augment::{AugmentationPipeline, AugmentationSettings};
use crate::config::merged::MergedConfig;
use crate::content::ContentSource;
use crate::error::ReceiptError;
use crate::font::FontBook;
use crate::layout::{LayoutParams, build_layout};
use crate::record::ReceiptRecord;
use crate::render::render_layout;
use crate::seed::receipt_rng;
use crate::style::store::StoreType;
use crate::style::{ReceiptStyle, resolve_style};
use crate::transform::{TransformParams, TransformSettings, Transformed, apply_transform};

/// Sampling ranges for a single receipt.
#[derive(Debug, Clone)]
pub struct GeneratorOptions {
    pub width_range: [u32; 2],
    pub margin_range: [u32; 2],
    pub section_gap: f32,
    /// Fixed style; `None` samples one per receipt.
    pub style: Option<ReceiptStyle>,
    pub transform: TransformSettings,
    pub max_transform_attempts: u32,
    pub augmentation: AugmentationSettings,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            width_range: [280, 400],
            margin_range: [15, 30],
            section_gap: 6.0,
            style: None,
            transform: TransformSettings {
                max_rotation_deg: 3.0,
                perspective: 0.0,
            },
            max_transform_attempts: 5,
            augmentation: AugmentationSettings::default(),
        }
    }
}

impl GeneratorOptions {
    /// No rotation, no perspective, no augmentation.
    pub fn clean() -> Self {
        Self {
            transform: TransformSettings::none(),
            augmentation: AugmentationSettings::none(),
            ..Self::default()
        }
    }
}

impl From<&MergedConfig> for GeneratorOptions {
    fn from(config: &MergedConfig) -> Self {
        Self {
            width_range: config.width_range,
            margin_range: config.margin_range,
            section_gap: config.section_gap,
            style: config.style,
            transform: config.transform,
            max_transform_attempts: config.max_transform_attempts,
            augmentation: config.augmentation.clone(),
        }
    }
}

/// Final image plus its record.
#[derive(Debug, Clone)]
pub struct GeneratedReceipt {
    pub record: ReceiptRecord,
    pub image: RgbImage,
}

impl GeneratedReceipt {
    /// SHA-256 hex of the image size, pixels and boxes.
    ///
    /// Two runs with the same seed and options produce the same digest.
    pub fn digest(&self) -> crate::error::Result<String> {
        let mut hasher = Sha256::new();
        hasher.update(self.image.width().to_le_bytes());
        hasher.update(self.image.height().to_le_bytes());
        hasher.update(self.image.as_raw());
        hasher.update(serde_json::to_vec(&self.record.boxes)?);
        Ok(hex::encode(hasher.finalize()))
    }
}

/// Generates receipts from local seeds. Shared read-only across rayon workers.
pub struct ReceiptGenerator<'a> {
    options: GeneratorOptions,
    fonts: &'a FontBook,
    source: &'a dyn ContentSource,
}

impl<'a> ReceiptGenerator<'a> {
    pub fn new(
        options: GeneratorOptions,
        fonts: &'a FontBook,
        source: &'a dyn ContentSource,
    ) -> crate::error::Result<Self> {
        crate::config::settings::validate_generation(
            options.width_range,
            options.margin_range,
            options.section_gap,
            options.transform.max_rotation_deg,
            options.transform.perspective,
            options.max_transform_attempts,
        )?;
        options.augmentation.validate()?;
        Ok(Self {
            options,
            fonts,
            source,
        })
    }

    /// Generate receipt `index` of the given store type from `local_seed`.
    ///
    /// Every random draw comes from one generator seeded with `local_seed`,
    /// in a fixed order: style, content, geometry, ink fading, transform,
    /// augmentation.
    pub fn generate(
        &self,
        index: u64,
        local_seed: u64,
        store_type: StoreType,
    ) -> crate::error::Result<GeneratedReceipt> {
        let mut rng = receipt_rng(local_seed);
        let opts = &self.options;

        let style = match opts.style {
            Some(s) => s,
            None => ReceiptStyle::ALL[rng.random_range(0..ReceiptStyle::ALL.len())],
        };
        let style_settings = resolve_style(style);

        let content = self.source.generate(store_type, &mut rng)?;
        content.validate()?;

        let [w_min, w_max] = opts.width_range;
        let [m_min, m_max] = opts.margin_range;
        let params = LayoutParams {
            width: rng.random_range(w_min..=w_max),
            margin: rng.random_range(m_min..=m_max),
            section_gap: opts.section_gap,
        };
        let layout = build_layout(&content, store_type, style_settings, &params)?;

        let rendered = render_layout(
            &layout,
            style_settings,
            self.fonts.typeface(style),
            &mut rng,
        )?;

        let (transform, transformed) = self.transform_with_retries(
            index,
            &rendered.canvas,
            &rendered.boxes,
            &mut rng,
        )?;

        let pipeline = AugmentationPipeline::from_settings(&opts.augmentation, style_settings)?;
        let Transformed {
            canvas,
            boxes,
            homography,
        } = transformed;
        let mut image = canvas.image;
        let augmentations = pipeline.apply(&mut image, &mut rng)?;

        if boxes.len() != rendered.blocks.len() {
            return Err(ReceiptError::render(format!(
                "{} boxes for {} blocks",
                boxes.len(),
                rendered.blocks.len()
            )));
        }

        debug!(
            index,
            store_type = %store_type,
            style = %style,
            width = image.width(),
            height = image.height(),
            tokens = boxes.len(),
            "generated receipt"
        );

        let record = ReceiptRecord {
            index,
            seed: local_seed,
            store_type,
            style,
            width: image.width(),
            height: image.height(),
            blocks: rendered.blocks,
            boxes,
            transform,
            homography,
            augmentations,
            truncations: rendered.report.truncations,
            transaction: ReceiptRecord::summary_from(&content),
            metadata: ReceiptRecord::metadata_from(&content),
        };
        Ok(GeneratedReceipt { record, image })
    }

    /// 退化した変換は再サンプリングし、上限回数を超えたら最後のエラーを返す。
    fn transform_with_retries(
        &self,
        index: u64,
        canvas: &crate::render::Canvas,
        boxes: &[crate::geometry::BoundingBox],
        rng: &mut crate::seed::ReceiptRng,
    ) -> crate::error::Result<(TransformParams, Transformed)> {
        let attempts = self.options.max_transform_attempts;
        let mut last_err = None;
        for attempt in 1..=attempts {
            let params =
                TransformParams::sample(&self.options.transform, canvas.width(), canvas.height(), rng);
            match apply_transform(canvas, boxes, &params) {
                Ok(t) => return Ok((params, t)),
                Err(e @ ReceiptError::TransformDegenerate(_)) => {
                    warn!(index, attempt, attempts, error = %e, "degenerate transform, resampling");
                    last_err = Some(e);
                }
                Err(e) => return Err(e),
            }
        }
        Err(last_err.unwrap_or_else(|| {
            ReceiptError::transform_degenerate("no transform attempts were made")
        }))
    }
}
