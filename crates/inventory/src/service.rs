//! Inventory service boundary.

use std::future::Future;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use vitrine_core::ProductRef;

/// Transport-level failure talking to a collaborator service.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("transport failure: {0}")]
pub struct TransportError(pub String);

impl TransportError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

/// Authoritative stock summary as reported by the inventory service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockSummary {
    pub available_quantity: u32,
    pub last_updated: Option<DateTime<Utc>>,
}

/// Result of a point-of-mutation availability check.
///
/// Must reflect state newer than any snapshot the caller holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityCheck {
    pub is_available: bool,
    pub available_quantity: u32,
}

/// Collaborator boundary for the server-side inventory service.
///
/// Methods return `impl Future` so implementations (HTTP clients, test
/// doubles) can be written as plain `async fn`. No wire format is mandated.
pub trait InventoryService: Send + Sync {
    /// Fetch the current stock summary for a `(product, variant)` pair.
    fn get_summary(
        &self,
        target: ProductRef,
    ) -> impl Future<Output = Result<StockSummary, TransportError>> + Send;

    /// Check whether `quantity` units can currently be taken.
    fn check_availability(
        &self,
        target: ProductRef,
        quantity: u32,
    ) -> impl Future<Output = Result<AvailabilityCheck, TransportError>> + Send;
}

/// Service handles are routinely shared between controllers; delegate
/// through `Arc` so an `Arc<impl InventoryService>` is itself a service.
impl<T: InventoryService> InventoryService for std::sync::Arc<T> {
    fn get_summary(
        &self,
        target: ProductRef,
    ) -> impl Future<Output = Result<StockSummary, TransportError>> + Send {
        self.as_ref().get_summary(target)
    }

    fn check_availability(
        &self,
        target: ProductRef,
        quantity: u32,
    ) -> impl Future<Output = Result<AvailabilityCheck, TransportError>> + Send {
        self.as_ref().check_availability(target, quantity)
    }
}
