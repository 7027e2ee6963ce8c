// Structured annotation export: one JSON document per receipt

use serde::Serialize;

use crate::augment::AppliedEffect;
use crate::layout::Role;
use crate::record::{ReceiptMetadata, ReceiptRecord, TransactionSummary};
use crate::render::Truncation;
use crate::style::ReceiptStyle;
use crate::style::store::StoreType;
use crate::transform::TransformParams;

#[derive(Debug, Serialize)]
pub struct StructuredToken<'a> {
    pub index: usize,
    pub text: &'a str,
    pub role: Role,
    pub class: usize,
    pub row: u32,
    pub font_size: f32,
    pub bold: bool,
    pub polygon: [[f64; 2]; 4],
}

#[derive(Debug, Serialize)]
pub struct StructuredAnnotation<'a> {
    pub id: String,
    pub index: u64,
    pub seed: u64,
    pub image: ImageSize,
    pub store_type: StoreType,
    pub style: ReceiptStyle,
    pub transform: &'a TransformParams,
    pub homography: [[f64; 3]; 3],
    pub augmentations: &'a [AppliedEffect],
    pub truncations: &'a [Truncation],
    pub transaction: &'a TransactionSummary,
    pub metadata: &'a ReceiptMetadata,
    pub tokens: Vec<StructuredToken<'a>>,
}

#[derive(Debug, Serialize)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

pub fn structured_annotation(record: &ReceiptRecord) -> StructuredAnnotation<'_> {
    let tokens = record
        .blocks
        .iter()
        .zip(&record.boxes)
        .enumerate()
        .map(|(index, (block, bbox))| StructuredToken {
            index,
            text: &bbox.text,
            role: bbox.role,
            class: bbox.role.class_index(),
            row: block.row,
            font_size: block.font.size,
            bold: block.font.bold,
            polygon: bbox.point_pairs(),
        })
        .collect();

    StructuredAnnotation {
        id: record.receipt_id(),
        index: record.index,
        seed: record.seed,
        image: ImageSize {
            width: record.width,
            height: record.height,
        },
        store_type: record.store_type,
        style: record.style,
        transform: &record.transform,
        homography: record.homography.m,
        augmentations: &record.augmentations,
        truncations: &record.truncations,
        transaction: &record.transaction,
        metadata: &record.metadata,
        tokens,
    }
}

pub fn to_structured_json(record: &ReceiptRecord) -> crate::error::Result<String> {
    Ok(serde_json::to_string_pretty(&structured_annotation(record))?)
}
