// Normalized-box export: `class cx cy w h`
//
// Rotated polygons are reduced to their enclosing axis-aligned box, so the
// rotation itself is lost in this format.

use crate::error::ReceiptError;
use crate::geometry::{AxisBox, BoundingBox};
use crate::record::ReceiptRecord;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizedBox {
    pub class: usize,
    pub cx: f64,
    pub cy: f64,
    pub w: f64,
    pub h: f64,
}

impl NormalizedBox {
    pub fn from_box(bbox: &BoundingBox, width: u32, height: u32) -> crate::error::Result<Self> {
        if width == 0 || height == 0 {
            return Err(ReceiptError::export(format!(
                "cannot normalize against a {width}x{height} image"
            )));
        }
        let e = bbox.enclosing_box();
        let (iw, ih) = (width as f64, height as f64);
        Ok(Self {
            class: bbox.role.class_index(),
            cx: (e.x_min + e.x_max) / 2.0 / iw,
            cy: (e.y_min + e.y_max) / 2.0 / ih,
            w: e.width() / iw,
            h: e.height() / ih,
        })
    }

    /// Back to pixel coordinates.
    pub fn denormalize(&self, width: u32, height: u32) -> AxisBox {
        let (iw, ih) = (width as f64, height as f64);
        let (cx, cy, w, h) = (self.cx * iw, self.cy * ih, self.w * iw, self.h * ih);
        AxisBox::new(cx - w / 2.0, cy - h / 2.0, cx + w / 2.0, cy + h / 2.0)
    }

    pub fn to_line(&self) -> String {
        format!(
            "{} {:.6} {:.6} {:.6} {:.6}",
            self.class, self.cx, self.cy, self.w, self.h
        )
    }

    pub fn parse_line(line: &str) -> crate::error::Result<Self> {
        let fields: Vec<&str> = line.split_whitespace().collect();
        let [class, cx, cy, w, h] = fields.as_slice() else {
            return Err(ReceiptError::export(format!(
                "expected 5 fields in normalized line, got '{line}'"
            )));
        };
        let num = |s: &str| {
            s.parse::<f64>()
                .map_err(|_| ReceiptError::export(format!("invalid number '{s}' in '{line}'")))
        };
        Ok(Self {
            class: class
                .parse()
                .map_err(|_| ReceiptError::export(format!("invalid class '{class}' in '{line}'")))?,
            cx: num(*cx)?,
            cy: num(*cy)?,
            w: num(*w)?,
            h: num(*h)?,
        })
    }
}

pub fn to_normalized_lines(record: &ReceiptRecord) -> crate::error::Result<String> {
    let mut out = String::new();
    for bbox in &record.boxes {
        out.push_str(&NormalizedBox::from_box(bbox, record.width, record.height)?.to_line());
        out.push('\n');
    }
    Ok(out)
}
