// Phase 3: Outline font tests
//
// These run against the fonts installed on the host. When a style resolves
// to no outline face the test returns early; the fallback itself is covered
// with an empty font database.

use image::{Rgb, RgbImage};

use receipt_synth::content::ContentSource;
use receipt_synth::content::catalog::CatalogSource;
use receipt_synth::font::{FontBook, RasterOptions, Typeface};
use receipt_synth::geometry::{AxisBox, BOX_MARGIN_PX};
use receipt_synth::layout::{Layout, LayoutParams, build_layout};
use receipt_synth::render::render_layout;
use receipt_synth::seed::receipt_rng;
use receipt_synth::style::store::StoreType;
use receipt_synth::style::{ReceiptStyle, resolve_style};

fn sample_layout(style: ReceiptStyle, seed: u64) -> Layout {
    let mut rng = receipt_rng(seed);
    let content = CatalogSource::default()
        .generate(StoreType::Grocery, &mut rng)
        .expect("content should generate");
    build_layout(
        &content,
        StoreType::Grocery,
        resolve_style(style),
        &LayoutParams::default(),
    )
    .expect("layout should build")
}

/// Extent of every pixel that differs from the paper, in pixel-edge units.
fn visible_ink(image: &RgbImage, paper: Rgb<u8>) -> Option<AxisBox> {
    let mut extent: Option<AxisBox> = None;
    for (x, y, px) in image.enumerate_pixels() {
        if *px == paper {
            continue;
        }
        let (x, y) = (x as f64, y as f64);
        let e = extent.get_or_insert(AxisBox::new(x, y, x + 1.0, y + 1.0));
        e.x_min = e.x_min.min(x);
        e.y_min = e.y_min.min(y);
        e.x_max = e.x_max.max(x + 1.0);
        e.y_max = e.y_max.max(y + 1.0);
    }
    extent
}

fn contains(outer: &AxisBox, inner: &AxisBox) -> bool {
    outer.x_min <= inner.x_min
        && outer.y_min <= inner.y_min
        && outer.x_max >= inner.x_max
        && outer.y_max >= inner.y_max
}

/// Render every block of `layout` on its own and check ink and box per token.
/// `exact` demands visible ink == measured ink; otherwise visible ink must
/// lie inside it (faint edge pixels may round back to the paper colour).
/// Returns the number of (bold, regular) tokens checked.
fn check_tokens(layout: &Layout, style: ReceiptStyle, typeface: &Typeface, exact: bool) -> (usize, usize) {
    let settings = resolve_style(style);
    let (mut bold, mut regular) = (0, 0);
    for (i, b) in layout.blocks.iter().enumerate() {
        let single = Layout {
            blocks: vec![b.clone()],
            separators: Vec::new(),
            ..layout.clone()
        };
        let mut rng = receipt_rng(i as u64);
        let rendered = render_layout(&single, settings, typeface, &mut rng)
            .expect("single token should render");

        let ink = rendered.ink[0];
        let seen = visible_ink(&rendered.canvas.image, rendered.canvas.paper)
            .expect("token should leave visible ink");
        if exact {
            assert_eq!(seen, ink, "{style} token {i} '{}' ink extent", b.text);
        } else {
            assert!(contains(&ink, &seen), "{style} token {i} '{}': {seen:?} outside {ink:?}", b.text);
        }
        assert_eq!(
            rendered.boxes[0].enclosing_box(),
            ink.expanded(BOX_MARGIN_PX),
            "{style} token {i} box"
        );
        assert!(rendered.boxes[0].within(single.width, single.height, 0.0));

        if rendered.blocks[0].font.bold {
            bold += 1;
        } else {
            regular += 1;
        }
    }
    (bold, regular)
}

/// The outline typeface resolved for `style`, or `None` on hosts without one.
fn outline_typeface(fonts: &FontBook, style: ReceiptStyle) -> Option<Typeface> {
    match fonts.typeface(style) {
        t @ Typeface::Outline { .. } => Some(t.clone()),
        Typeface::DotMatrix(_) => None,
    }
}

// ============================================================
// 1. システムフォントでも矩形はインク ± マージン
// ============================================================

#[test]
fn test_outline_boxes_match_ink_exactly() {
    let fonts = FontBook::system();
    // modern-pos: 白地に黒、不透明度1 なので被覆画素はすべて見える
    let Some(typeface) = outline_typeface(&fonts, ReceiptStyle::ModernPos) else {
        return;
    };
    let layout = sample_layout(ReceiptStyle::ModernPos, 3);
    let (bold, regular) = check_tokens(&layout, ReceiptStyle::ModernPos, &typeface, true);
    assert!(bold > 0, "header and total lines are bold");
    assert!(regular > 0);
}

#[test]
fn test_thermal_outline_ink_stays_inside_box() {
    let fonts = FontBook::system();
    let Some(typeface) = outline_typeface(&fonts, ReceiptStyle::Thermal) else {
        return;
    };
    let layout = sample_layout(ReceiptStyle::Thermal, 8);
    let (bold, regular) = check_tokens(&layout, ReceiptStyle::Thermal, &typeface, false);
    assert!(bold > 0);
    assert!(regular > 0);
}

// ============================================================
// 2. 合成ボールド(ストローク)もインク計測に含まれる
// ============================================================

#[test]
fn test_synthetic_bold_is_measured() {
    let fonts = FontBook::system();
    let Some(Typeface::Outline { regular, .. }) = outline_typeface(&fonts, ReceiptStyle::ModernPos)
    else {
        return;
    };
    let synthetic = Typeface::Outline {
        regular: regular.clone(),
        bold: None,
    };

    let opts = RasterOptions {
        size: 16.0,
        bold: false,
        char_spacing: 1.0,
        dot_pattern: false,
    };
    let plain = synthetic.rasterize("TOTAL 42.00", &opts).expect("regular run");
    let heavy = synthetic
        .rasterize("TOTAL 42.00", &RasterOptions { bold: true, ..opts })
        .expect("synthetic bold run");

    let inked = |run: &receipt_synth::font::GlyphRun| run.coverage.iter().filter(|c| **c > 0).count();
    assert!(inked(&heavy) > inked(&plain), "stroking adds ink");
    assert_eq!(heavy.advance, plain.advance, "stroking keeps the advance");
    let e = heavy.ink_extent().expect("bold ink");
    // ストローク分の余白はマスク内に確保されている
    assert!(e.col_min > 0 && e.row_min > 0);
    assert!(e.col_max < heavy.width && e.row_max < heavy.height);

    // 描画経由でも矩形はインク ± マージン
    let layout = sample_layout(ReceiptStyle::ModernPos, 11);
    let (bold, _) = check_tokens(&layout, ReceiptStyle::ModernPos, &synthetic, true);
    assert!(bold > 0);
}

// ============================================================
// 3. フォント解決
// ============================================================

#[test]
fn test_empty_database_falls_back_to_dot_matrix() {
    let fonts = FontBook::from_database(&fontdb::Database::new());
    for style in ReceiptStyle::ALL {
        assert!(
            matches!(fonts.typeface(style), Typeface::DotMatrix(_)),
            "{style} should fall back"
        );
    }
}

#[test]
fn test_dot_matrix_style_never_resolves_outline() {
    let fonts = FontBook::system();
    assert!(matches!(
        fonts.typeface(ReceiptStyle::DotMatrix),
        Typeface::DotMatrix(_)
    ));
}

#[test]
fn test_real_bold_face_is_heavier() {
    let fonts = FontBook::system();
    let Some(Typeface::Outline { regular, bold: Some(bold) }) =
        outline_typeface(&fonts, ReceiptStyle::ModernPos)
    else {
        return;
    };
    assert!(!std::sync::Arc::ptr_eq(&regular, &bold));
    let opts = RasterOptions {
        size: 14.0,
        bold: false,
        char_spacing: 1.0,
        dot_pattern: false,
    };
    let r = regular.rasterize("SUBTOTAL", &opts, 0.0).expect("regular");
    let b = bold.rasterize("SUBTOTAL", &opts, 0.0).expect("bold");
    let total = |run: &receipt_synth::font::GlyphRun| run.coverage.iter().map(|c| *c as u64).sum::<u64>();
    assert!(total(&b) > total(&r));
}
