// Receipt content records: the structured data a receipt prints.
//
// Content is produced by a `ContentSource`; the rendering core only consumes
// the finished record. Amounts are integer minor currency units so that
// `subtotal + tax == total` holds exactly.

pub mod catalog;

use serde::{Deserialize, Serialize};

use crate::error::ReceiptError;
use crate::seed::ReceiptRng;
use crate::style::store::StoreType;

/// Monetary amount in minor currency units (cents).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(pub i64);

impl Money {
    pub fn from_minor(minor: i64) -> Self {
        Money(minor)
    }

    pub fn minor(&self) -> i64 {
        self.0
    }

    /// `$12.34` style text.
    pub fn format(&self, symbol: &str) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        format!("{sign}{symbol}{}.{:02}", abs / 100, abs % 100)
    }

    /// `12.34` without a currency symbol.
    pub fn plain(&self) -> String {
        self.format("")
    }
}

impl std::ops::Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0 + rhs.0)
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        Money(iter.map(|m| m.0).sum())
    }
}

/// One purchased line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub name: String,
    pub category: String,
    pub quantity: u32,
    pub unit_price: Money,
    pub total: Money,
}

/// Everything a receipt prints, as produced by a content source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceiptContent {
    pub store_name: String,
    pub address_lines: Vec<String>,
    pub phone: String,
    /// `MM/DD/YYYY`
    pub date: String,
    /// `hh:mm:ss AM`
    pub time: String,
    pub transaction_id: String,
    pub payment_method: String,
    pub items: Vec<LineItem>,
    pub subtotal: Money,
    pub tax: Money,
    pub total: Money,
    pub currency_symbol: String,
}

impl ReceiptContent {
    /// Check the arithmetic a receipt must satisfy.
    pub fn validate(&self) -> crate::error::Result<()> {
        if self.items.is_empty() {
            return Err(ReceiptError::config("receipt content has no line items"));
        }
        for item in &self.items {
            if item.quantity == 0 {
                return Err(ReceiptError::config(format!(
                    "line item '{}' has zero quantity",
                    item.name
                )));
            }
            if item.total.minor() != item.unit_price.minor() * item.quantity as i64 {
                return Err(ReceiptError::config(format!(
                    "line item '{}' total {} != {} x {}",
                    item.name,
                    item.total.plain(),
                    item.quantity,
                    item.unit_price.plain()
                )));
            }
        }
        let items_sum: Money = self.items.iter().map(|i| i.total).sum();
        if items_sum != self.subtotal {
            return Err(ReceiptError::config(format!(
                "subtotal {} does not match item sum {}",
                self.subtotal.plain(),
                items_sum.plain()
            )));
        }
        if self.subtotal + self.tax != self.total {
            return Err(ReceiptError::config(format!(
                "subtotal {} + tax {} != total {}",
                self.subtotal.plain(),
                self.tax.plain(),
                self.total.plain()
            )));
        }
        Ok(())
    }

    /// Amount text with this receipt's currency symbol.
    pub fn money(&self, amount: Money) -> String {
        amount.format(&self.currency_symbol)
    }
}

/// Source of receipt content.
///
/// Implementations must draw all randomness from `rng` so that a receipt is
/// a pure function of its seed.
pub trait ContentSource: Send + Sync {
    fn generate(
        &self,
        store_type: StoreType,
        rng: &mut ReceiptRng,
    ) -> crate::error::Result<ReceiptContent>;
}
