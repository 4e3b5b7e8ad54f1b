//! Presentational stock classification.

use serde::{Deserialize, Serialize};

/// Items at or below this quantity (but above zero) are flagged as low stock.
pub const LOW_STOCK_THRESHOLD: u64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockLevel {
    OutOfStock,
    Low,
    InStock,
}

impl StockLevel {
    pub fn for_quantity(quantity: u64) -> Self {
        match quantity {
            0 => StockLevel::OutOfStock,
            q if q <= LOW_STOCK_THRESHOLD => StockLevel::Low,
            _ => StockLevel::InStock,
        }
    }

    /// Badge text, if the level deserves one.
    pub fn alert(&self) -> Option<&'static str> {
        match self {
            StockLevel::OutOfStock => Some("Out of stock"),
            StockLevel::Low => Some("Low stock"),
            StockLevel::InStock => None,
        }
    }
}
