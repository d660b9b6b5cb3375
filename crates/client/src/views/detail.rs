//! Product detail page controller.

use std::sync::{Arc, Mutex};

use vitrine_core::{OptimisticState, ProductRef, VariantId};
use vitrine_events::{EventKind, StoreEvent, Subscription};
use vitrine_inventory::{InventoryService, InventorySnapshot, StockStatus};

use crate::cache::ImageCache;
use crate::controller::{CartOutcome, MutationController, MutationError, WishlistOutcome};
use crate::lock;
use crate::services::{CartService, ImageService, WishlistService};
use crate::store::KeyValueStore;
use crate::types::{MutationIntent, ProductRecord};

#[derive(Debug)]
struct DetailState {
    record: ProductRecord,
    snapshot: Option<InventorySnapshot>,
    images: Vec<String>,
    stale_inventory: bool,
    stale_images: bool,
}

/// Detail page for one `(product, variant)` pair.
///
/// Subscribes on mount; dropping the view unsubscribes its handlers.
/// The optimistic flags live in their own mutexes, shared with the
/// controller for the duration of a mutation cycle so the pending override
/// is visible to renders while the call is in flight.
pub struct ProductDetailView<I, C, W, F, S> {
    target: ProductRef,
    controller: Arc<MutationController<I, C, W>>,
    images: F,
    cache: Arc<ImageCache<S>>,
    state: Arc<Mutex<DetailState>>,
    wishlisted: Mutex<OptimisticState<bool>>,
    adding: Mutex<OptimisticState<bool>>,
    _subscriptions: Vec<Subscription>,
}

impl<I, C, W, F, S> ProductDetailView<I, C, W, F, S>
where
    I: InventoryService,
    C: CartService,
    W: WishlistService,
    F: ImageService,
    S: KeyValueStore,
{
    pub fn mount(
        record: ProductRecord,
        variant_id: Option<VariantId>,
        controller: Arc<MutationController<I, C, W>>,
        images: F,
        cache: Arc<ImageCache<S>>,
    ) -> Self {
        let target = ProductRef::new(record.id, variant_id);
        let wishlisted = Mutex::new(OptimisticState::confirmed(record.wishlisted));
        let state = Arc::new(Mutex::new(DetailState {
            images: record.images.clone(),
            snapshot: None,
            stale_inventory: true,
            stale_images: true,
            record,
        }));

        let bus = Arc::clone(controller.bus());
        let product_id = target.product_id;

        let shared = Arc::clone(&state);
        let on_inventory = bus.subscribe(EventKind::InventoryChanged, move |event| {
            if event.product_id() == Some(product_id) {
                lock(&shared).stale_inventory = true;
            }
        });

        let shared = Arc::clone(&state);
        let on_images = bus.subscribe(EventKind::ImagesChanged, move |event| {
            if event.product_id() == Some(product_id) {
                lock(&shared).stale_images = true;
            }
        });

        let shared = Arc::clone(&state);
        let on_orders = bus.subscribe(EventKind::OrderCompleted, move |event| {
            if let StoreEvent::OrderCompleted { items, .. } = event {
                if items.iter().any(|line| line.product_id == product_id) {
                    lock(&shared).stale_inventory = true;
                }
            }
        });

        Self {
            target,
            controller,
            images,
            cache,
            state,
            wishlisted,
            adding: Mutex::new(OptimisticState::confirmed(false)),
            _subscriptions: vec![on_inventory, on_images, on_orders],
        }
    }

    pub fn target(&self) -> ProductRef {
        self.target
    }

    /// Re-derive whatever the bus flagged stale (everything, on first call).
    pub async fn refresh(&self) {
        let (want_inventory, want_images, record_stock) = {
            let state = lock(&self.state);
            (state.stale_inventory, state.stale_images, state.record.stock)
        };

        if want_inventory {
            let snapshot = self
                .controller
                .inventory()
                .snapshot_or_fallback(self.target, record_stock)
                .await;
            let mut state = lock(&self.state);
            state.snapshot = Some(snapshot);
            state.stale_inventory = false;
        }

        if want_images {
            let timeout = self.controller.inventory().config().request_timeout;
            let urls = self
                .cache
                .refresh(self.target.product_id, &self.images, timeout)
                .await;
            let mut state = lock(&self.state);
            state.images = urls;
            state.stale_images = false;
        }
    }

    /// Guarded, check-then-act add to cart. A stale-stock rejection corrects
    /// the view's snapshot to the fresh value in the same cycle.
    pub async fn add_to_cart(&self, quantity: u32) -> Result<CartOutcome, MutationError> {
        let intent = MutationIntent::add_to_cart(self.target, quantity)?;
        let record = lock(&self.state).record.clone();

        let result = self.controller.add_to_cart(&record, &intent, &self.adding).await;

        if let Err(MutationError::StaleStock { snapshot, .. }) = &result {
            let mut state = lock(&self.state);
            state.snapshot = Some(*snapshot);
            state.stale_inventory = false;
        }
        result
    }

    /// Set the wishlist flag to the given target state.
    pub async fn toggle_wishlist(&self, target: bool) -> Result<WishlistOutcome, MutationError> {
        self.controller
            .toggle_wishlist(self.target, target, &self.wishlisted)
            .await
    }

    pub fn snapshot(&self) -> Option<InventorySnapshot> {
        lock(&self.state).snapshot
    }

    pub fn stock_badge(&self) -> Option<StockStatus> {
        lock(&self.state).snapshot.map(|s| s.status())
    }

    pub fn is_wishlisted(&self) -> bool {
        *lock(&self.wishlisted).effective()
    }

    pub fn is_adding(&self) -> bool {
        *lock(&self.adding).effective()
    }

    pub fn images(&self) -> Vec<String> {
        lock(&self.state).images.clone()
    }

    pub fn needs_refresh(&self) -> bool {
        let state = lock(&self.state);
        state.stale_inventory || state.stale_images
    }
}
