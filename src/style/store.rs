// Store type table (StoreType -> StoreTemplate)

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ReceiptError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StoreType {
    Grocery,
    Restaurant,
    Retail,
}

impl StoreType {
    pub const ALL: [StoreType; 3] = [StoreType::Grocery, StoreType::Restaurant, StoreType::Retail];

    pub fn as_str(&self) -> &'static str {
        match self {
            StoreType::Grocery => "grocery",
            StoreType::Restaurant => "restaurant",
            StoreType::Retail => "retail",
        }
    }
}

impl fmt::Display for StoreType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StoreType {
    type Err = ReceiptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        StoreType::ALL
            .into_iter()
            .find(|t| t.as_str() == normalized)
            .ok_or_else(|| ReceiptError::config(format!("Unknown store type: '{s}'")))
    }
}

/// Per-store layout parameters: font sizes in pixels, item count range and
/// the closing message printed above the thank-you line.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreTemplate {
    pub store_type: StoreType,
    pub header_size: f32,
    pub address_size: f32,
    pub body_size: f32,
    pub detail_size: f32,
    pub total_size: f32,
    pub footer_size: f32,
    pub item_count: (usize, usize),
    /// Every line item is sold once (restaurant checks).
    pub single_quantity: bool,
    pub closing_line: &'static str,
}

static STORE_TABLE: [StoreTemplate; 3] = [
    StoreTemplate {
        store_type: StoreType::Grocery,
        header_size: 20.0,
        address_size: 10.0,
        body_size: 11.0,
        detail_size: 9.0,
        total_size: 14.0,
        footer_size: 9.0,
        item_count: (3, 15),
        single_quantity: false,
        closing_line: "Save your receipt for returns",
    },
    StoreTemplate {
        store_type: StoreType::Restaurant,
        header_size: 20.0,
        address_size: 10.0,
        body_size: 11.0,
        detail_size: 9.0,
        total_size: 14.0,
        footer_size: 9.0,
        item_count: (3, 15),
        single_quantity: true,
        closing_line: "Gratuity not included",
    },
    StoreTemplate {
        store_type: StoreType::Retail,
        header_size: 20.0,
        address_size: 10.0,
        body_size: 11.0,
        detail_size: 9.0,
        total_size: 14.0,
        footer_size: 9.0,
        item_count: (3, 15),
        single_quantity: false,
        closing_line: "Returns accepted within 30 days",
    },
];

pub fn store_template(store_type: StoreType) -> &'static StoreTemplate {
    match store_type {
        StoreType::Grocery => &STORE_TABLE[0],
        StoreType::Restaurant => &STORE_TABLE[1],
        StoreType::Retail => &STORE_TABLE[2],
    }
}
