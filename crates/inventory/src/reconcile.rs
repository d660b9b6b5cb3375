//! Reconciliation against the authoritative inventory service.
//!
//! Reconciliation replaces a possibly-stale local snapshot with a fresh one.
//! Snapshots fetched on mount or idle are assumed stale by the time the user
//! acts, so the check-then-act primitive [`ReconciliationClient::check_availability`]
//! must be called again at the moment of mutation rather than reusing an
//! earlier snapshot.

use std::time::Duration;

use thiserror::Error;

use vitrine_core::{ClientConfig, ProductRef};

use crate::service::{AvailabilityCheck, InventoryService};
use crate::snapshot::InventorySnapshot;

/// Failure to fetch authoritative stock.
///
/// Recoverable: callers fall back to the stale stock figure carried on the
/// product record rather than blocking the view.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReconciliationError {
    #[error("inventory service unreachable: {0}")]
    Transport(String),

    #[error("inventory request timed out after {0:?}")]
    Timeout(Duration),
}

/// Freshness-checked client for stock snapshots.
#[derive(Debug, Clone)]
pub struct ReconciliationClient<S> {
    service: S,
    config: ClientConfig,
}

impl<S: InventoryService> ReconciliationClient<S> {
    pub fn new(service: S, config: ClientConfig) -> Self {
        Self { service, config }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Fetch a fresh snapshot from the inventory service.
    pub async fn fetch_snapshot(
        &self,
        target: ProductRef,
    ) -> Result<InventorySnapshot, ReconciliationError> {
        let timeout = self.config.request_timeout;
        let summary = tokio::time::timeout(timeout, self.service.get_summary(target))
            .await
            .map_err(|_| ReconciliationError::Timeout(timeout))?
            .map_err(|e| ReconciliationError::Transport(e.0))?;

        Ok(InventorySnapshot::derive(
            summary.available_quantity,
            self.config.low_stock_threshold,
            summary.last_updated,
        ))
    }

    /// Fetch a fresh snapshot, degrading to the record-carried stock figure
    /// on failure instead of blocking the view.
    pub async fn snapshot_or_fallback(
        &self,
        target: ProductRef,
        record_stock: u32,
    ) -> InventorySnapshot {
        match self.fetch_snapshot(target).await {
            Ok(snapshot) => snapshot,
            Err(err) => {
                tracing::warn!(product = %target, %err, "reconciliation failed; using record-carried stock");
                InventorySnapshot::degraded(record_stock, self.config.low_stock_threshold)
            }
        }
    }

    /// Check-then-act primitive: verify `quantity` units are available right
    /// now. Timeout is treated identically to transport failure.
    pub async fn check_availability(
        &self,
        target: ProductRef,
        quantity: u32,
    ) -> Result<AvailabilityCheck, ReconciliationError> {
        let timeout = self.config.request_timeout;
        tokio::time::timeout(timeout, self.service.check_availability(target, quantity))
            .await
            .map_err(|_| ReconciliationError::Timeout(timeout))?
            .map_err(|e| ReconciliationError::Transport(e.0))
    }

    /// Build a fresh snapshot from a check result, for correcting a view's
    /// stale copy after a failed mutation attempt.
    pub fn snapshot_from_check(&self, check: AvailabilityCheck) -> InventorySnapshot {
        InventorySnapshot::derive(
            check.available_quantity,
            self.config.low_stock_threshold,
            Some(chrono::Utc::now()),
        )
    }
}
