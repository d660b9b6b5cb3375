//! Admin product list controller.
//!
//! Renders the full catalog for editing. Order completions decrement the
//! carried stock figures immediately (delta hint from the event payload);
//! the next reload replaces the rows wholesale from the catalog service.

use std::sync::{Arc, Mutex};

use vitrine_core::ProductId;
use vitrine_events::{EventBus, EventKind, StoreEvent, Subscription};

use crate::lock;
use crate::services::{CatalogService, ServiceError};
use crate::types::ProductRecord;

#[derive(Debug, Default)]
struct AdminState {
    rows: Vec<ProductRecord>,
    needs_reload: bool,
}

/// Admin-side product grid.
pub struct AdminProductListView {
    state: Arc<Mutex<AdminState>>,
    _subscriptions: Vec<Subscription>,
}

impl AdminProductListView {
    pub fn mount(bus: &Arc<EventBus>) -> Self {
        let state = Arc::new(Mutex::new(AdminState {
            rows: Vec::new(),
            needs_reload: true,
        }));

        let shared = Arc::clone(&state);
        let on_product = bus.subscribe(EventKind::ProductChanged, move |_| {
            lock(&shared).needs_reload = true;
        });

        let shared = Arc::clone(&state);
        let on_orders = bus.subscribe(EventKind::OrderCompleted, move |event| {
            if let StoreEvent::OrderCompleted { items, .. } = event {
                let mut state = lock(&shared);
                for line in items {
                    if let Some(row) = state.rows.iter_mut().find(|r| r.id == line.product_id) {
                        row.stock = row.stock.saturating_sub(line.quantity);
                    }
                }
                state.needs_reload = true;
            }
        });

        Self {
            state,
            _subscriptions: vec![on_product, on_orders],
        }
    }

    /// Replace the rows wholesale from the catalog service.
    pub async fn reload<G: CatalogService>(&self, catalog: &G) -> Result<(), ServiceError> {
        let rows = catalog.fetch_products().await?;
        let mut state = lock(&self.state);
        state.rows = rows;
        state.needs_reload = false;
        Ok(())
    }

    /// Reload only if an event marked the list stale.
    pub async fn reload_if_stale<G: CatalogService>(
        &self,
        catalog: &G,
    ) -> Result<(), ServiceError> {
        if self.needs_reload() {
            self.reload(catalog).await?;
        }
        Ok(())
    }

    pub fn rows(&self) -> Vec<ProductRecord> {
        lock(&self.state).rows.clone()
    }

    pub fn row(&self, product_id: ProductId) -> Option<ProductRecord> {
        lock(&self.state)
            .rows
            .iter()
            .find(|r| r.id == product_id)
            .cloned()
    }

    pub fn needs_reload(&self) -> bool {
        lock(&self.state).needs_reload
    }
}
