// Phase 4: Render integration tests
//
// Tight token boxes, reading order and truncation. All tests use the
// built-in dot-matrix face so results do not depend on installed fonts.

use image::{Rgb, RgbImage};

use receipt_synth::content::ContentSource;
use receipt_synth::content::catalog::CatalogSource;
use receipt_synth::error::ReceiptError;
use receipt_synth::font::FontBook;
use receipt_synth::geometry::{AxisBox, BOX_MARGIN_PX, Point};
use receipt_synth::layout::{Alignment, FontSpec, Layout, LayoutParams, Role, TextBlock, build_layout};
use receipt_synth::render::fit::{COLUMN_GAP_PX, ELLIPSIS};
use receipt_synth::render::render_layout;
use receipt_synth::seed::receipt_rng;
use receipt_synth::style::store::StoreType;
use receipt_synth::style::{ReceiptStyle, resolve_style};

fn sample_layout(seed: u64, store_type: StoreType) -> Layout {
    let mut rng = receipt_rng(seed);
    let content = CatalogSource::default()
        .generate(store_type, &mut rng)
        .expect("content should generate");
    build_layout(
        &content,
        store_type,
        resolve_style(ReceiptStyle::Thermal),
        &LayoutParams::default(),
    )
    .expect("layout should build")
}

fn block(role: Role, text: &str, x: f64, alignment: Alignment) -> TextBlock {
    TextBlock {
        role,
        text: text.to_string(),
        font: FontSpec::regular(11.0),
        anchor: Point::new(x, 20.0),
        alignment,
        row: 0,
    }
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

// ============================================================
// 1. 各トークンの矩形はインク ± マージン
// ============================================================

#[test]
fn test_each_box_is_ink_plus_margin() {
    let fonts = FontBook::dot_matrix_only();
    let style = resolve_style(ReceiptStyle::Thermal);
    let layout = sample_layout(5, StoreType::Grocery);

    // トークンを1つずつ描画し、見えている画素の範囲と比較する
    for (i, b) in layout.blocks.iter().enumerate() {
        let single = Layout {
            blocks: vec![b.clone()],
            separators: Vec::new(),
            ..layout.clone()
        };
        let mut rng = receipt_rng(i as u64);
        let rendered = render_layout(&single, style, fonts.typeface(ReceiptStyle::Thermal), &mut rng)
            .expect("single token should render");

        let ink = rendered.ink[0];
        let seen = visible_ink(&rendered.canvas.image, rendered.canvas.paper)
            .expect("token should leave visible ink");
        assert_eq!(seen, ink, "token {i} '{}' ink extent", b.text);

        let bbox = rendered.boxes[0].enclosing_box();
        assert_eq!(bbox, ink.expanded(BOX_MARGIN_PX), "token {i} box");
        assert!(
            rendered.boxes[0].within(single.width, single.height, 0.0),
            "token {i} box leaves the canvas"
        );
    }
}

// ============================================================
// 2. 矩形の順序はブロックの順序
// ============================================================

#[test]
fn test_boxes_follow_block_order() {
    let fonts = FontBook::dot_matrix_only();
    let style = resolve_style(ReceiptStyle::Thermal);
    let layout = sample_layout(9, StoreType::Restaurant);
    let mut rng = receipt_rng(9);
    let rendered = render_layout(&layout, style, fonts.typeface(ReceiptStyle::Thermal), &mut rng)
        .expect("layout should render");

    assert_eq!(rendered.boxes.len(), layout.blocks.len());
    assert_eq!(rendered.blocks.len(), layout.blocks.len());
    for (bbox, b) in rendered.boxes.iter().zip(rendered.blocks.iter()) {
        assert_eq!(bbox.text, b.text);
        assert_eq!(bbox.role, b.role);
    }
    assert_eq!(rendered.boxes[0].role, Role::HeaderLine);
    assert_eq!(rendered.boxes.last().map(|b| b.role), Some(Role::FooterLine));
}

#[test]
fn test_boxes_on_one_row_do_not_overlap() {
    let fonts = FontBook::dot_matrix_only();
    let style = resolve_style(ReceiptStyle::CarbonCopy);
    let layout = sample_layout(21, StoreType::Grocery);
    let mut rng = receipt_rng(21);
    let rendered = render_layout(&layout, style, fonts.typeface(ReceiptStyle::CarbonCopy), &mut rng)
        .expect("layout should render");

    for i in 0..rendered.blocks.len() {
        for j in (i + 1)..rendered.blocks.len() {
            if rendered.blocks[i].row != rendered.blocks[j].row {
                continue;
            }
            let a = rendered.boxes[i].enclosing_box();
            let b = rendered.boxes[j].enclosing_box();
            assert!(!a.overlaps_horizontally(&b), "boxes {i} and {j} overlap");
        }
    }
}

#[test]
fn test_render_is_deterministic() {
    let fonts = FontBook::dot_matrix_only();
    let style = resolve_style(ReceiptStyle::Inkjet);
    let layout = sample_layout(3, StoreType::Retail);

    let a = render_layout(&layout, style, fonts.typeface(ReceiptStyle::Inkjet), &mut receipt_rng(1))
        .expect("first render");
    let b = render_layout(&layout, style, fonts.typeface(ReceiptStyle::Inkjet), &mut receipt_rng(1))
        .expect("second render");
    assert_eq!(a.canvas.image, b.canvas.image);
    assert_eq!(a.boxes, b.boxes);
}

// ============================================================
// 3. はみ出すトークンは "..." で切り詰める
// ============================================================

#[test]
fn test_long_name_is_truncated_before_price() {
    let fonts = FontBook::dot_matrix_only();
    let style = resolve_style(ReceiptStyle::Thermal);
    let layout = Layout {
        store_type: StoreType::Grocery,
        width: 120,
        height: 40,
        margin: 10,
        blocks: vec![
            block(Role::ItemName, "EXTRA LONG PRODUCT NAME WITH MANY WORDS", 10.0, Alignment::Left),
            block(Role::ItemPrice, "$12.34", 110.0, Alignment::Right),
        ],
        separators: Vec::new(),
    };

    let mut rng = receipt_rng(0);
    let rendered = render_layout(&layout, style, fonts.typeface(ReceiptStyle::Thermal), &mut rng)
        .expect("row should fit after truncation");

    assert_eq!(rendered.report.truncations.len(), 1);
    let t = &rendered.report.truncations[0];
    assert_eq!(t.block_index, 0);
    assert_eq!(t.role, Role::ItemName);
    assert!(t.rendered.ends_with(ELLIPSIS), "got '{}'", t.rendered);
    assert_eq!(rendered.boxes[0].text, t.rendered);
    // 金額は切り詰めない
    assert_eq!(rendered.boxes[1].text, "$12.34");

    let name = rendered.boxes[0].enclosing_box();
    let price = rendered.boxes[1].enclosing_box();
    assert!(price.x_min - name.x_max >= COLUMN_GAP_PX, "{name:?} vs {price:?}");
}

#[test]
fn test_token_wider_than_canvas_is_truncated() {
    let fonts = FontBook::dot_matrix_only();
    let style = resolve_style(ReceiptStyle::Thermal);
    let layout = Layout {
        store_type: StoreType::Retail,
        width: 100,
        height: 40,
        margin: 10,
        blocks: vec![block(
            Role::HeaderLine,
            "THE VERY LONG NAME OF A STORE THAT NEVER ENDS",
            50.0,
            Alignment::Center,
        )],
        separators: Vec::new(),
    };

    let mut rng = receipt_rng(0);
    let rendered = render_layout(&layout, style, fonts.typeface(ReceiptStyle::Thermal), &mut rng)
        .expect("header should fit after truncation");
    let bbox = rendered.boxes[0].enclosing_box();
    assert!(bbox.x_min >= 0.0 && bbox.x_max <= 100.0, "{bbox:?}");
    assert_eq!(rendered.report.truncations.len(), 1);
}

#[test]
fn test_blank_token_is_rejected() {
    let fonts = FontBook::dot_matrix_only();
    let style = resolve_style(ReceiptStyle::Thermal);
    let layout = Layout {
        store_type: StoreType::Grocery,
        width: 120,
        height: 40,
        margin: 10,
        blocks: vec![block(Role::FooterLine, "   ", 10.0, Alignment::Left)],
        separators: Vec::new(),
    };

    let mut rng = receipt_rng(0);
    let result = render_layout(&layout, style, fonts.typeface(ReceiptStyle::Thermal), &mut rng);
    assert!(
        matches!(
            result,
            Err(ReceiptError::LayoutOverflow(_)) | Err(ReceiptError::RenderError(_))
        ),
        "blank token should not produce a box"
    );
}
