//! Product grid card controller.
//!
//! A lighter sibling of the detail view: stock badge + wishlist toggle.
//! The card never polls; it re-fetches only when the bus marks it stale.

use std::sync::{Arc, Mutex};

use vitrine_core::{OptimisticState, ProductRef};
use vitrine_events::{EventKind, Subscription};
use vitrine_inventory::{InventoryService, InventorySnapshot, StockStatus};

use crate::controller::{MutationController, MutationError, WishlistOutcome};
use crate::lock;
use crate::services::{CartService, WishlistService};
use crate::types::ProductRecord;

#[derive(Debug)]
struct CardState {
    record: ProductRecord,
    snapshot: Option<InventorySnapshot>,
    stale: bool,
}

/// One card in a product listing grid.
///
/// The wishlist flag sits in its own mutex, shared with the controller for
/// a mutation cycle so the pending override shows while the call is in
/// flight.
pub struct ProductCardView<I, C, W> {
    target: ProductRef,
    controller: Arc<MutationController<I, C, W>>,
    state: Arc<Mutex<CardState>>,
    wishlisted: Mutex<OptimisticState<bool>>,
    _subscriptions: Vec<Subscription>,
}

impl<I, C, W> ProductCardView<I, C, W>
where
    I: InventoryService,
    C: CartService,
    W: WishlistService,
{
    pub fn mount(record: ProductRecord, controller: Arc<MutationController<I, C, W>>) -> Self {
        let target = ProductRef::product(record.id);
        let wishlisted = Mutex::new(OptimisticState::confirmed(record.wishlisted));
        let state = Arc::new(Mutex::new(CardState {
            snapshot: None,
            stale: true,
            record,
        }));

        let bus = Arc::clone(controller.bus());
        let product_id = target.product_id;

        let shared = Arc::clone(&state);
        let on_inventory = bus.subscribe(EventKind::InventoryChanged, move |event| {
            if event.product_id() == Some(product_id) {
                lock(&shared).stale = true;
            }
        });

        let shared = Arc::clone(&state);
        let on_product = bus.subscribe(EventKind::ProductChanged, move |event| {
            if event.product_id() == Some(product_id) {
                lock(&shared).stale = true;
            }
        });

        Self {
            target,
            controller,
            state,
            wishlisted,
            _subscriptions: vec![on_inventory, on_product],
        }
    }

    pub fn target(&self) -> ProductRef {
        self.target
    }

    /// Re-derive the snapshot only if an event marked the card stale.
    pub async fn refresh_if_stale(&self) {
        let (stale, record_stock) = {
            let state = lock(&self.state);
            (state.stale, state.record.stock)
        };
        if !stale {
            return;
        }

        let snapshot = self
            .controller
            .inventory()
            .snapshot_or_fallback(self.target, record_stock)
            .await;
        let mut state = lock(&self.state);
        state.snapshot = Some(snapshot);
        state.stale = false;
    }

    pub async fn toggle_wishlist(&self, target: bool) -> Result<WishlistOutcome, MutationError> {
        self.controller
            .toggle_wishlist(self.target, target, &self.wishlisted)
            .await
    }

    pub fn stock_badge(&self) -> Option<StockStatus> {
        lock(&self.state).snapshot.map(|s| s.status())
    }

    pub fn snapshot(&self) -> Option<InventorySnapshot> {
        lock(&self.state).snapshot
    }

    pub fn is_wishlisted(&self) -> bool {
        *lock(&self.wishlisted).effective()
    }

    pub fn is_stale(&self) -> bool {
        lock(&self.state).stale
    }
}
