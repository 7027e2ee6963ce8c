// Receipt record: the immutable output unit handed to the exporters

use serde::{Deserialize, Serialize};

use crate::augment::AppliedEffect;
use crate::content::{Money, ReceiptContent};
use crate::geometry::{BoundingBox, Homography};
use crate::layout::TextBlock;
use crate::render::Truncation;
use crate::style::ReceiptStyle;
use crate::style::store::StoreType;
use crate::transform::TransformParams;

/// Money totals of one receipt. `subtotal + tax == total` exactly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionSummary {
    pub subtotal: Money,
    pub tax: Money,
    pub total: Money,
    pub currency_symbol: String,
    pub item_count: usize,
}

/// Printed metadata of the transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceiptMetadata {
    pub store_name: String,
    pub address_lines: Vec<String>,
    pub phone: String,
    pub date: String,
    pub time: String,
    pub transaction_id: String,
    pub payment_method: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceiptRecord {
    pub index: u64,
    /// Local seed the receipt was generated from.
    pub seed: u64,
    pub store_type: StoreType,
    pub style: ReceiptStyle,
    pub width: u32,
    pub height: u32,
    /// Fitted blocks in reading order.
    pub blocks: Vec<TextBlock>,
    /// One box per block, same order, in final image coordinates.
    pub boxes: Vec<BoundingBox>,
    pub transform: TransformParams,
    pub homography: Homography,
    pub augmentations: Vec<AppliedEffect>,
    pub truncations: Vec<Truncation>,
    pub transaction: TransactionSummary,
    pub metadata: ReceiptMetadata,
}

impl ReceiptRecord {
    /// Stable identifier used for file and directory names.
    pub fn receipt_id(&self) -> String {
        format!("receipt_{:06}", self.index)
    }

    pub fn summary_from(content: &ReceiptContent) -> TransactionSummary {
        TransactionSummary {
            subtotal: content.subtotal,
            tax: content.tax,
            total: content.total,
            currency_symbol: content.currency_symbol.clone(),
            item_count: content.items.len(),
        }
    }

    pub fn metadata_from(content: &ReceiptContent) -> ReceiptMetadata {
        ReceiptMetadata {
            store_name: content.store_name.clone(),
            address_lines: content.address_lines.clone(),
            phone: content.phone.clone(),
            date: content.date.clone(),
            time: content.time.clone(),
            transaction_id: content.transaction_id.clone(),
            payment_method: content.payment_method.clone(),
        }
    }
}
