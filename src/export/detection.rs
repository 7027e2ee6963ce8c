// Detection-box text export: `text<TAB>x1,y1,x2,y2,x3,y3,x4,y4`

use crate::geometry::BoundingBox;
use crate::record::ReceiptRecord;

/// Tabs and line breaks would break the line format.
fn sanitize(text: &str) -> String {
    text.chars()
        .map(|c| if matches!(c, '\t' | '\n' | '\r') { ' ' } else { c })
        .collect()
}

pub fn detection_line(bbox: &BoundingBox) -> String {
    let coords: Vec<String> = bbox
        .polygon
        .iter()
        .flat_map(|p| [p.x.round() as i64, p.y.round() as i64])
        .map(|v| v.to_string())
        .collect();
    format!("{}\t{}", sanitize(&bbox.text), coords.join(","))
}

/// One line per token in reading order, newline-terminated.
pub fn to_detection_lines(record: &ReceiptRecord) -> String {
    let mut out = String::new();
    for bbox in &record.boxes {
        out.push_str(&detection_line(bbox));
        out.push('\n');
    }
    out
}
