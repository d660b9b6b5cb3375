//! `vitrine-inventory` — authoritative stock snapshots and reconciliation.
//!
//! Views never trust a stock number they already hold: they re-fetch a fresh
//! [`InventorySnapshot`] on mount, on bus notification, and (via
//! [`ReconciliationClient::check_availability`]) immediately before any
//! stock-sensitive mutation.

pub mod reconcile;
pub mod service;
pub mod snapshot;

pub use reconcile::{ReconciliationClient, ReconciliationError};
pub use service::{AvailabilityCheck, InventoryService, StockSummary, TransportError};
pub use snapshot::{InventorySnapshot, StockStatus};
