// Phase 7: Export adapters (pure functions of a ReceiptRecord)

pub mod annotation;
pub mod detection;
pub mod normalized;
pub mod structured;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ReceiptError;
use crate::record::ReceiptRecord;

/// Optional per-receipt label formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    /// `text<TAB>x1,y1,...,x4,y4` per token.
    Detection,
    /// `class cx cy w h` per token, normalized to the image size.
    Normalized,
    /// One JSON document with full polygons.
    Structured,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 3] = [
        ExportFormat::Detection,
        ExportFormat::Normalized,
        ExportFormat::Structured,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Detection => "detection",
            ExportFormat::Normalized => "normalized",
            ExportFormat::Structured => "structured",
        }
    }

    /// File name inside a receipt's output directory.
    pub fn file_name(&self) -> &'static str {
        match self {
            ExportFormat::Detection => "detection.txt",
            ExportFormat::Normalized => "normalized.txt",
            ExportFormat::Structured => "annotation.json",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportFormat {
    type Err = ReceiptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        ExportFormat::ALL
            .into_iter()
            .find(|f| f.as_str() == normalized)
            .ok_or_else(|| ReceiptError::config(format!("Unknown export format: '{s}'")))
    }
}

/// Serialize `record` in `format`.
pub fn export(record: &ReceiptRecord, format: ExportFormat) -> crate::error::Result<String> {
    match format {
        ExportFormat::Detection => Ok(detection::to_detection_lines(record)),
        ExportFormat::Normalized => normalized::to_normalized_lines(record),
        ExportFormat::Structured => structured::to_structured_json(record),
    }
}
