// Layout builder: content record + store template + style -> Layout

use crate::content::ReceiptContent;
use crate::error::ReceiptError;
use crate::geometry::Point;
use crate::style::StyleSettings;
use crate::style::store::{StoreType, store_template};

use super::{ASCENT_EM, Alignment, FontSpec, LINE_BOX_EM, Layout, Role, Separator, TextBlock};

/// Smallest usable content width in pixels: a body-size price, the column
/// gap and `X...` fit side by side.
pub const MIN_CONTENT_WIDTH: u32 = 120;

/// Indent of quantity detail rows relative to the left margin.
const DETAIL_INDENT_PX: f64 = 12.0;

/// Canvas geometry chosen for one receipt.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutParams {
    pub width: u32,
    pub margin: u32,
    /// Vertical space inserted before and after every separator.
    pub section_gap: f32,
}

impl Default for LayoutParams {
    fn default() -> Self {
        Self {
            width: 320,
            margin: 20,
            section_gap: 6.0,
        }
    }
}

/// Vertical cursor that hands out baselines line by line.
struct Cursor {
    y: f64,
    row: u32,
    width: f64,
    margin: f64,
    line_spacing: f64,
    blocks: Vec<TextBlock>,
    separators: Vec<Separator>,
}

impl Cursor {
    /// Reserve one line of `size` pixels and return its baseline.
    fn next_line(&mut self, size: f32) -> (f64, u32) {
        let em = size as f64;
        let line_height = em * LINE_BOX_EM as f64 * self.line_spacing;
        let leading = line_height - em * LINE_BOX_EM as f64;
        let baseline = self.y + leading / 2.0 + em * ASCENT_EM as f64;
        let row = self.row;
        self.y += line_height;
        self.row += 1;
        (baseline.round(), row)
    }

    fn anchor_x(&self, alignment: Alignment) -> f64 {
        match alignment {
            Alignment::Left => self.margin,
            Alignment::Center => self.width / 2.0,
            Alignment::Right => self.width - self.margin,
        }
    }

    fn push(&mut self, role: Role, text: String, font: FontSpec, anchor: Point, alignment: Alignment, row: u32) {
        self.blocks.push(TextBlock {
            role,
            text,
            font,
            anchor,
            alignment,
            row,
        });
    }

    /// A line holding a single block.
    fn single(&mut self, role: Role, text: String, font: FontSpec, alignment: Alignment) {
        let (baseline, row) = self.next_line(font.size);
        let x = self.anchor_x(alignment);
        self.push(role, text, font, Point::new(x, baseline), alignment, row);
    }

    /// A line with a left-aligned label and a right-aligned value.
    fn pair(&mut self, left: (Role, String), right: (Role, String), font: FontSpec) {
        let (baseline, row) = self.next_line(font.size);
        let lx = self.anchor_x(Alignment::Left);
        let rx = self.anchor_x(Alignment::Right);
        self.push(left.0, left.1, font, Point::new(lx, baseline), Alignment::Left, row);
        self.push(right.0, right.1, font, Point::new(rx, baseline), Alignment::Right, row);
    }

    fn gap(&mut self, px: f32) {
        self.y += px as f64;
    }

    fn separator(&mut self, gap: f32) {
        self.gap(gap);
        self.separators.push(Separator {
            y: self.y.floor() as u32,
            x_start: self.margin as u32,
            x_end: (self.width - self.margin) as u32,
        });
        self.gap(gap + 1.0);
    }
}

/// Build the ordered text blocks of one receipt.
///
/// Sections: header, separator, items, separator, totals, footer. The same
/// inputs always yield the same layout.
pub fn build_layout(
    content: &ReceiptContent,
    store_type: StoreType,
    style: &StyleSettings,
    params: &LayoutParams,
) -> crate::error::Result<Layout> {
    if params.width < params.margin.saturating_mul(2).saturating_add(MIN_CONTENT_WIDTH) {
        return Err(ReceiptError::config(format!(
            "Canvas width {} leaves less than {MIN_CONTENT_WIDTH}px between margins of {}",
            params.width, params.margin
        )));
    }
    if !(params.section_gap.is_finite() && params.section_gap >= 0.0) {
        return Err(ReceiptError::config(format!(
            "Section gap must be a non-negative number, got {}",
            params.section_gap
        )));
    }

    let template = store_template(store_type);
    let emphasis = |size: f32| {
        if style.bold_emphasis {
            FontSpec::bold(size)
        } else {
            FontSpec::regular(size)
        }
    };

    let mut c = Cursor {
        y: params.margin as f64,
        row: 0,
        width: params.width as f64,
        margin: params.margin as f64,
        line_spacing: style.line_spacing as f64,
        blocks: Vec::new(),
        separators: Vec::new(),
    };
    let gap = params.section_gap;

    // ヘッダー
    c.single(
        Role::HeaderLine,
        content.store_name.clone(),
        emphasis(template.header_size),
        Alignment::Center,
    );
    for line in &content.address_lines {
        c.single(
            Role::AddressLine,
            line.clone(),
            FontSpec::regular(template.address_size),
            Alignment::Center,
        );
    }
    c.single(
        Role::HeaderLine,
        content.phone.clone(),
        FontSpec::regular(template.address_size),
        Alignment::Center,
    );
    c.separator(gap);

    // 明細
    let body = FontSpec::regular(template.body_size);
    for item in &content.items {
        c.pair(
            (Role::ItemName, item.name.clone()),
            (Role::ItemPrice, content.money(item.total)),
            body,
        );
        if item.quantity > 1 {
            let (baseline, row) = c.next_line(template.detail_size);
            let x = c.margin + DETAIL_INDENT_PX;
            c.push(
                Role::ItemQuantity,
                format!("{} x {}", item.quantity, content.money(item.unit_price)),
                FontSpec::regular(template.detail_size),
                Point::new(x, baseline),
                Alignment::Left,
                row,
            );
        }
    }
    c.separator(gap);

    // 合計
    c.pair(
        (Role::Subtotal, "Subtotal:".to_string()),
        (Role::Subtotal, content.money(content.subtotal)),
        body,
    );
    c.pair(
        (Role::Tax, "Tax:".to_string()),
        (Role::Tax, content.money(content.tax)),
        body,
    );
    c.pair(
        (Role::Total, "TOTAL:".to_string()),
        (Role::Total, content.money(content.total)),
        emphasis(template.total_size),
    );
    c.gap(gap * 2.0);

    // フッター
    let footer = FontSpec::regular(template.footer_size);
    c.single(
        Role::FooterLine,
        format!("Transaction: {}", content.transaction_id),
        footer,
        Alignment::Center,
    );
    c.single(
        Role::DateLine,
        format!("{} {}", content.date, content.time),
        footer,
        Alignment::Center,
    );
    c.single(
        Role::FooterLine,
        format!("Paid by {}", content.payment_method),
        footer,
        Alignment::Center,
    );
    c.single(
        Role::FooterLine,
        template.closing_line.to_string(),
        footer,
        Alignment::Center,
    );
    c.single(
        Role::FooterLine,
        "Thank you for your purchase!".to_string(),
        FontSpec::regular(template.body_size),
        Alignment::Center,
    );

    let height = (c.y + params.margin as f64).ceil() as u32;
    Ok(Layout {
        store_type,
        width: params.width,
        height,
        margin: params.margin,
        blocks: c.blocks,
        separators: c.separators,
    })
}
