// Phase 6: Augmentation pipeline tests
//
// Effects touch pixels only; boxes and image size never change.

use image::{Rgb, RgbImage};

use receipt_synth::augment::{AugmentationPipeline, AugmentationSettings, Effect, EffectSettings};
use receipt_synth::content::catalog::CatalogSource;
use receipt_synth::font::FontBook;
use receipt_synth::pipeline::generator::{GeneratorOptions, ReceiptGenerator};
use receipt_synth::seed::receipt_rng;
use receipt_synth::style::store::StoreType;
use receipt_synth::style::{ReceiptStyle, StyleSettings, resolve_style};

fn every_effect(min: f32, max: f32) -> AugmentationSettings {
    AugmentationSettings {
        print_texture: EffectSettings::enabled(min, max),
        noise: EffectSettings::enabled(min, max),
        blur: EffectSettings::enabled(min, max),
        contrast: EffectSettings::enabled(min, max),
        brightness: EffectSettings::enabled(min, max),
        fold_lines: EffectSettings::enabled(min, max),
        stains: EffectSettings::enabled(min, max),
        shadow: EffectSettings::enabled(min, max),
    }
}

fn striped(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        if (x / 4 + y / 3) % 2 == 0 {
            Rgb([245, 245, 240])
        } else {
            Rgb([30, 30, 30])
        }
    })
}

fn modern_pos() -> &'static StyleSettings {
    resolve_style(ReceiptStyle::ModernPos)
}

// ============================================================
// 1. 恒等パイプライン
// ============================================================

#[test]
fn test_identity_pipeline_leaves_pixels_alone() {
    let pipeline = AugmentationPipeline::identity();
    assert!(pipeline.is_identity());

    let original = striped(64, 48);
    let mut image = original.clone();
    let applied = pipeline
        .apply(&mut image, &mut receipt_rng(1))
        .expect("identity pipeline");
    assert!(applied.is_empty());
    assert_eq!(image, original);
}

#[test]
fn test_all_disabled_settings_build_identity() {
    let pipeline = AugmentationPipeline::from_settings(&AugmentationSettings::none(), modern_pos())
        .expect("pipeline");
    assert!(pipeline.is_identity());
}

// ============================================================
// 2. 適用順序とサイズ不変
// ============================================================

#[test]
fn test_every_effect_applies_in_canonical_order() {
    let pipeline = AugmentationPipeline::from_settings(&every_effect(0.6, 0.9), modern_pos())
        .expect("pipeline");
    assert_eq!(pipeline.effects(), Effect::CANONICAL_ORDER.to_vec());

    let mut image = striped(120, 200);
    let applied = pipeline
        .apply(&mut image, &mut receipt_rng(5))
        .expect("augment");
    let order: Vec<Effect> = applied.iter().map(|a| a.effect).collect();
    assert_eq!(order, Effect::CANONICAL_ORDER.to_vec());
    assert_eq!(image.dimensions(), (120, 200));
    for a in &applied {
        assert!((0.0..=1.0).contains(&a.intensity), "{a:?}");
    }
}

#[test]
fn test_augmentation_is_seeded() {
    let pipeline = AugmentationPipeline::from_settings(&every_effect(0.2, 0.8), modern_pos())
        .expect("pipeline");
    let mut a = striped(80, 80);
    let mut b = striped(80, 80);
    pipeline.apply(&mut a, &mut receipt_rng(9)).expect("a");
    pipeline.apply(&mut b, &mut receipt_rng(9)).expect("b");
    assert_eq!(a, b);
}

#[test]
fn test_invalid_range_is_rejected() {
    let mut settings = AugmentationSettings::none();
    settings.blur = EffectSettings::enabled(0.8, 0.2);
    assert!(AugmentationPipeline::from_settings(&settings, modern_pos()).is_err());
}

// ============================================================
// 3. 矩形は拡張前後でバイト単位で同一
// ============================================================

#[test]
fn test_augmentation_never_touches_boxes() {
    let fonts = FontBook::dot_matrix_only();
    let source = CatalogSource::default();

    let clean_opts = GeneratorOptions {
        style: Some(ReceiptStyle::Thermal),
        ..GeneratorOptions::clean()
    };
    let augmented_opts = GeneratorOptions {
        augmentation: every_effect(0.5, 1.0),
        ..clean_opts.clone()
    };

    let clean = ReceiptGenerator::new(clean_opts, &fonts, &source).expect("clean generator");
    let augmented = ReceiptGenerator::new(augmented_opts, &fonts, &source).expect("augmented generator");

    for index in 0..4u64 {
        let a = clean
            .generate(index, 1000 + index, StoreType::Grocery)
            .expect("clean receipt");
        let b = augmented
            .generate(index, 1000 + index, StoreType::Grocery)
            .expect("augmented receipt");

        let boxes_a = serde_json::to_string(&a.record.boxes).expect("serialize a");
        let boxes_b = serde_json::to_string(&b.record.boxes).expect("serialize b");
        assert_eq!(boxes_a, boxes_b, "receipt {index}");
        assert_eq!(a.image.dimensions(), b.image.dimensions());
        assert_ne!(a.image, b.image, "augmentation should change pixels");
        assert!(a.record.augmentations.is_empty());
        assert_eq!(b.record.augmentations.len(), Effect::CANONICAL_ORDER.len());
    }
}

// ============================================================
// 4. 印字テクスチャと影も画素のみ
// ============================================================

fn only(effect: Effect) -> AugmentationSettings {
    let mut settings = AugmentationSettings::none();
    match effect {
        Effect::PrintTexture => settings.print_texture = EffectSettings::enabled(1.0, 1.0),
        Effect::Shadow => settings.shadow = EffectSettings::enabled(1.0, 1.0),
        _ => unreachable!("only texture and shadow are used here"),
    }
    settings
}

#[test]
fn test_shadow_runs_after_stains() {
    let order = Effect::CANONICAL_ORDER;
    let stains = order.iter().position(|e| *e == Effect::Stains).expect("stains");
    let shadow = order.iter().position(|e| *e == Effect::Shadow).expect("shadow");
    assert_eq!(shadow, stains + 1);
    assert_eq!(order[0], Effect::PrintTexture);
}

#[test]
fn test_print_texture_follows_style() {
    let pipeline = AugmentationPipeline::from_settings(&only(Effect::PrintTexture), modern_pos())
        .expect("pipeline");
    let original = striped(60, 90);
    let mut image = original.clone();
    pipeline.apply(&mut image, &mut receipt_rng(3)).expect("modern-pos texture");
    // modern-pos は印字テクスチャを持たない
    assert_eq!(image, original);

    let thermal = AugmentationPipeline::from_settings(
        &only(Effect::PrintTexture),
        resolve_style(ReceiptStyle::Thermal),
    )
    .expect("pipeline");
    let mut image = original.clone();
    thermal.apply(&mut image, &mut receipt_rng(3)).expect("thermal texture");
    assert_ne!(image, original);
    assert_eq!(image.dimensions(), original.dimensions());
}

#[test]
fn test_texture_and_shadow_never_touch_boxes() {
    let fonts = FontBook::dot_matrix_only();
    let source = CatalogSource::default();

    for style in [ReceiptStyle::Thermal, ReceiptStyle::CarbonCopy, ReceiptStyle::DotMatrix] {
        let clean_opts = GeneratorOptions {
            style: Some(style),
            augmentation: AugmentationSettings::none(),
            ..GeneratorOptions::default()
        };
        let clean = ReceiptGenerator::new(clean_opts.clone(), &fonts, &source).expect("clean generator");

        for effect in [Effect::PrintTexture, Effect::Shadow] {
            let opts = GeneratorOptions {
                augmentation: only(effect),
                ..clean_opts.clone()
            };
            let textured = ReceiptGenerator::new(opts, &fonts, &source).expect("generator");

            let a = clean.generate(2, 77, StoreType::Grocery).expect("clean receipt");
            let b = textured.generate(2, 77, StoreType::Grocery).expect("textured receipt");

            let boxes_a = serde_json::to_string(&a.record.boxes).expect("serialize a");
            let boxes_b = serde_json::to_string(&b.record.boxes).expect("serialize b");
            assert_eq!(boxes_a, boxes_b, "{style} {effect}");
            assert_eq!(a.record.homography, b.record.homography, "{style} {effect}");
            assert_eq!(a.image.dimensions(), b.image.dimensions());
            assert_ne!(a.image, b.image, "{style} {effect} should change pixels");
            assert_eq!(b.record.augmentations.len(), 1);
            assert_eq!(b.record.augmentations[0].effect, effect);
        }
    }
}
