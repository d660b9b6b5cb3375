//! Stock snapshot derivation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Coarse availability bucket derived from the available quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockStatus {
    InStock,
    LowStock,
    OutOfStock,
}

impl StockStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StockStatus::InStock => "in_stock",
            StockStatus::LowStock => "low_stock",
            StockStatus::OutOfStock => "out_of_stock",
        }
    }
}

/// Point-in-time view of stock for one `(product, variant)` pair.
///
/// Derived entirely from `available_quantity` at construction; held in
/// view-local memory only and superseded wholesale by the next fetch, never
/// merged field-by-field. `last_updated = None` marks a degraded snapshot
/// synthesized from the stale stock figure carried on the product record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventorySnapshot {
    available_quantity: u32,
    is_in_stock: bool,
    is_low_stock: bool,
    status: StockStatus,
    last_updated: Option<DateTime<Utc>>,
}

impl InventorySnapshot {
    /// Derive a snapshot from an authoritative quantity.
    pub fn derive(
        available_quantity: u32,
        low_stock_threshold: u32,
        last_updated: Option<DateTime<Utc>>,
    ) -> Self {
        let status = if available_quantity == 0 {
            StockStatus::OutOfStock
        } else if available_quantity <= low_stock_threshold {
            StockStatus::LowStock
        } else {
            StockStatus::InStock
        };

        Self {
            available_quantity,
            is_in_stock: available_quantity > 0,
            is_low_stock: status == StockStatus::LowStock,
            status,
            last_updated,
        }
    }

    /// Synthesize a degraded snapshot from a stale, record-carried stock
    /// figure. `last_updated` stays `None` to mark the weaker signal.
    pub fn degraded(available_quantity: u32, low_stock_threshold: u32) -> Self {
        Self::derive(available_quantity, low_stock_threshold, None)
    }

    pub fn available_quantity(&self) -> u32 {
        self.available_quantity
    }

    pub fn is_in_stock(&self) -> bool {
        self.is_in_stock
    }

    pub fn is_low_stock(&self) -> bool {
        self.is_low_stock
    }

    pub fn status(&self) -> StockStatus {
        self.status
    }

    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.last_updated
    }

    /// Whether this snapshot was synthesized from a stale fallback value.
    pub fn is_degraded(&self) -> bool {
        self.last_updated.is_none()
    }

    /// Can `quantity` units be taken from this snapshot's stock?
    pub fn can_satisfy(&self, quantity: u32) -> bool {
        quantity > 0 && self.available_quantity >= quantity
    }
}
