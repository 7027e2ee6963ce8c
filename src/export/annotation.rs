// Ground-truth and bounding-box documents written for every receipt

use serde::{Deserialize, Serialize};

use crate::layout::Role;
use crate::record::ReceiptRecord;

/// Key fields of the receipt plus its tokens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroundTruth {
    pub company: String,
    /// `MM/DD/YYYY`
    pub date: String,
    pub address: String,
    /// Total in major units without a currency symbol, e.g. `"42.17"`.
    pub total: String,
    pub tokens: Vec<GroundTruthToken>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroundTruthToken {
    pub text: String,
    pub role: Role,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BboxEntry {
    pub box_id: usize,
    pub text: String,
    pub role: Role,
    pub bbox: [[f64; 2]; 4],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BboxDocument {
    pub results: Vec<BboxEntry>,
}

pub fn ground_truth(record: &ReceiptRecord) -> GroundTruth {
    GroundTruth {
        company: record.metadata.store_name.clone(),
        date: record.metadata.date.clone(),
        address: record.metadata.address_lines.join(", "),
        total: record.transaction.total.plain(),
        tokens: record
            .boxes
            .iter()
            .map(|b| GroundTruthToken {
                text: b.text.clone(),
                role: b.role,
            })
            .collect(),
    }
}

pub fn bbox_document(record: &ReceiptRecord) -> BboxDocument {
    BboxDocument {
        results: record
            .boxes
            .iter()
            .enumerate()
            .map(|(box_id, b)| BboxEntry {
                box_id,
                text: b.text.clone(),
                role: b.role,
                bbox: b.point_pairs(),
            })
            .collect(),
    }
}

pub fn ground_truth_json(record: &ReceiptRecord) -> crate::error::Result<String> {
    Ok(serde_json::to_string_pretty(&ground_truth(record))?)
}

pub fn bbox_json(record: &ReceiptRecord) -> crate::error::Result<String> {
    Ok(serde_json::to_string_pretty(&bbox_document(record))?)
}
