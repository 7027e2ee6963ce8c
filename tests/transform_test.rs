// Phase 5: Geometric transform tests
//
// Pixels and boxes go through the same homography; box corners are mapped,
// never re-measured from the transformed box.

use receipt_synth::content::ContentSource;
use receipt_synth::content::catalog::CatalogSource;
use receipt_synth::error::ReceiptError;
use receipt_synth::font::FontBook;
use receipt_synth::geometry::{AxisBox, Point, signed_area};
use receipt_synth::layout::{Layout, LayoutParams, build_layout};
use receipt_synth::render::{RenderedReceipt, render_layout};
use receipt_synth::seed::receipt_rng;
use receipt_synth::style::store::StoreType;
use receipt_synth::style::{ReceiptStyle, resolve_style};
use receipt_synth::transform::{
    TransformParams, TransformSettings, apply_transform, build_homography,
};

fn sample_layout(seed: u64) -> Layout {
    let mut rng = receipt_rng(seed);
    let content = CatalogSource::default()
        .generate(StoreType::Grocery, &mut rng)
        .expect("content should generate");
    build_layout(
        &content,
        StoreType::Grocery,
        resolve_style(ReceiptStyle::Thermal),
        &LayoutParams::default(),
    )
    .expect("layout should build")
}

fn render(layout: &Layout) -> RenderedReceipt {
    let fonts = FontBook::dot_matrix_only();
    let mut rng = receipt_rng(0);
    render_layout(
        layout,
        resolve_style(ReceiptStyle::Thermal),
        fonts.typeface(ReceiptStyle::Thermal),
        &mut rng,
    )
    .expect("layout should render")
}

/// Point inside (or on) a clockwise convex quad.
fn inside_quad(q: &[Point; 4], p: Point) -> bool {
    (0..4).all(|i| {
        let a = q[i];
        let b = q[(i + 1) % 4];
        (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x) >= -1e-9
    })
}

/// Bilinear resampling may shift paper by a unit; only count real ink.
fn is_ink(px: [u8; 3], paper: [u8; 3]) -> bool {
    px.iter().zip(paper.iter()).any(|(a, b)| a.abs_diff(*b) > 8)
}

// ============================================================
// 1. 0度回転は恒等変換
// ============================================================

#[test]
fn test_zero_rotation_is_identity_on_pixels_and_boxes() {
    let layout = sample_layout(1);
    let rendered = render(&layout);

    let out = apply_transform(&rendered.canvas, &rendered.boxes, &TransformParams::identity())
        .expect("identity transform");
    assert!(out.homography.is_identity());
    assert_eq!(out.canvas.image, rendered.canvas.image);
    assert_eq!(out.boxes, rendered.boxes);
}

#[test]
fn test_sampling_without_rotation_is_identity() {
    let mut rng = receipt_rng(4);
    let params = TransformParams::sample(&TransformSettings::none(), 300, 500, &mut rng);
    assert_eq!(params, TransformParams::identity());
}

// ============================================================
// 2. 角の座標は解析解と一致する
// ============================================================

#[test]
fn test_rotated_corners_match_analytic_rotation() {
    let layout = sample_layout(2);
    let rendered = render(&layout);
    let (w, h) = (rendered.canvas.width() as f64, rendered.canvas.height() as f64);
    let deg: f64 = 7.0;

    let out = apply_transform(&rendered.canvas, &rendered.boxes, &TransformParams::rotation(deg))
        .expect("rotation");

    // 中心回りの回転 -> 出力キャンバス原点への平行移動
    let (s, c) = deg.to_radians().sin_cos();
    let rot = |p: Point| {
        let (dx, dy) = (p.x - w / 2.0, p.y - h / 2.0);
        Point::new(w / 2.0 + c * dx - s * dy, h / 2.0 + s * dx + c * dy)
    };
    let canvas = [
        Point::new(0.0, 0.0),
        Point::new(w, 0.0),
        Point::new(w, h),
        Point::new(0.0, h),
    ]
    .map(rot);
    let min_x = canvas.iter().map(|p| p.x).fold(f64::INFINITY, f64::min).floor();
    let min_y = canvas.iter().map(|p| p.y).fold(f64::INFINITY, f64::min).floor();

    for (before, after) in rendered.boxes.iter().zip(out.boxes.iter()) {
        for (p, q) in before.polygon.iter().zip(after.polygon.iter()) {
            let expected = rot(*p);
            assert!((q.x - (expected.x - min_x)).abs() < 1e-6, "{q:?} vs {expected:?}");
            assert!((q.y - (expected.y - min_y)).abs() < 1e-6, "{q:?} vs {expected:?}");
        }
    }

    let max_x = canvas.iter().map(|p| p.x).fold(f64::NEG_INFINITY, f64::max).ceil();
    let max_y = canvas.iter().map(|p| p.y).fold(f64::NEG_INFINITY, f64::max).ceil();
    assert_eq!(out.canvas.width() as f64, max_x - min_x);
    assert_eq!(out.canvas.height() as f64, max_y - min_y);
}

#[test]
fn test_rotation_preserves_box_area() {
    let layout = sample_layout(3);
    let rendered = render(&layout);
    let out = apply_transform(&rendered.canvas, &rendered.boxes, &TransformParams::rotation(-4.5))
        .expect("rotation");
    for (before, after) in rendered.boxes.iter().zip(out.boxes.iter()) {
        let a = signed_area(&before.polygon);
        let b = signed_area(&after.polygon);
        assert!((a - b).abs() < 1e-6, "'{}' area {a} -> {b}", before.text);
        assert!(b > 0.0, "winding must stay clockwise");
    }
}

// ============================================================
// 3. 回転後に再計測してもインクは矩形の内側
// ============================================================

#[test]
fn test_rotated_ink_stays_inside_rotated_polygon() {
    let layout = sample_layout(4);

    for (i, block) in layout.blocks.iter().enumerate().step_by(3) {
        let single = Layout {
            blocks: vec![block.clone()],
            separators: Vec::new(),
            ..layout.clone()
        };
        let rendered = render(&single);
        let out = apply_transform(&rendered.canvas, &rendered.boxes, &TransformParams::rotation(10.0))
            .expect("rotation");

        let polygon = &out.boxes[0].polygon;
        let paper = out.canvas.paper;
        let mut seen: Option<AxisBox> = None;
        for (x, y, px) in out.canvas.image.enumerate_pixels() {
            if !is_ink(px.0, paper.0) {
                continue;
            }
            let centre = Point::new(x as f64 + 0.5, y as f64 + 0.5);
            assert!(
                inside_quad(polygon, centre),
                "token {i} '{}': ink pixel ({x}, {y}) outside {polygon:?}",
                block.text
            );
            let e = seen.get_or_insert(AxisBox::new(centre.x, centre.y, centre.x, centre.y));
            e.x_min = e.x_min.min(centre.x);
            e.y_min = e.y_min.min(centre.y);
            e.x_max = e.x_max.max(centre.x);
            e.y_max = e.y_max.max(centre.y);
        }
        let seen = seen.expect("rotated token should stay visible");

        // 再計測したインクは多角形の外接矩形に収まる
        let hull = out.boxes[0].enclosing_box();
        assert!(hull.contains(Point::new(seen.x_min, seen.y_min)));
        assert!(hull.contains(Point::new(seen.x_max, seen.y_max)));
    }
}

// ============================================================
// 4. 退化した変換は拒否する
// ============================================================

#[test]
fn test_folding_jitter_is_degenerate() {
    let params = TransformParams {
        rotation_deg: 0.0,
        corner_jitter: [
            Point::new(0.0, 0.0),
            Point::new(-150.0, 0.0),
            Point::new(-150.0, 0.0),
            Point::new(0.0, 0.0),
        ],
    };
    let result = build_homography(&params, 100, 200);
    assert!(matches!(result, Err(ReceiptError::TransformDegenerate(_))));
}

#[test]
fn test_perspective_keeps_boxes_on_canvas() {
    let layout = sample_layout(5);
    let rendered = render(&layout);
    let settings = TransformSettings {
        max_rotation_deg: 5.0,
        perspective: 0.03,
    };
    let mut rng = receipt_rng(77);
    let params = TransformParams::sample(
        &settings,
        rendered.canvas.width(),
        rendered.canvas.height(),
        &mut rng,
    );
    assert!(params.has_perspective());

    let out = apply_transform(&rendered.canvas, &rendered.boxes, &params).expect("perspective");
    assert_eq!(out.boxes.len(), rendered.boxes.len());
    for b in &out.boxes {
        assert!(b.within(out.canvas.width(), out.canvas.height(), 1e-6));
        assert!(signed_area(&b.polygon) > 0.0);
    }
}
