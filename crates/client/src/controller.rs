//! Optimistic mutation controller.
//!
//! One `perform` cycle runs strictly in order: guard check, fresh
//! availability check, optimistic override, network call, then confirm +
//! publish or rollback. Failed mutations are never retried automatically,
//! and the UI is never left showing a state the server did not confirm.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use thiserror::Error;

use vitrine_core::{OptimisticState, ProductRef};
use vitrine_events::{EventBus, StoreEvent};
use vitrine_inventory::{
    InventorySnapshot, InventoryService, ReconciliationClient, ReconciliationError,
};

use crate::guard::MutationGuard;
use crate::lock;
use crate::services::{CartService, ServiceError, WishlistError, WishlistService};
use crate::types::{CartReceipt, MutationIntent, MutationKind, ProductRecord};

/// User-visible mutation failure.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MutationError {
    /// Check-then-act found insufficient quantity. Carries the fresh
    /// snapshot so the owning view can replace its stale copy in the same
    /// cycle; this is an invalidation-on-read, not merely a failure.
    #[error("only {available} in stock")]
    StaleStock {
        available: u32,
        snapshot: InventorySnapshot,
    },

    /// The pre-mutation availability check itself failed.
    #[error(transparent)]
    Reconciliation(#[from] ReconciliationError),

    /// The intent was malformed (e.g. zero quantity).
    #[error(transparent)]
    Invalid(#[from] vitrine_core::CoreError),

    /// The cart call failed; optimistic state was rolled back.
    #[error("add to cart failed: {0}")]
    Cart(String),

    /// The wishlist call failed; the icon state was reverted.
    #[error("wishlist update failed: {0}")]
    Wishlist(String),
}

/// Outcome of an add-to-cart cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartOutcome {
    Added(CartReceipt),
    /// Guard denied the attempt; deliberately invisible to the user.
    Skipped,
}

/// Outcome of a wishlist-toggle cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WishlistOutcome {
    /// The server now holds `wishlisted == target`.
    Set(bool),
    /// The effective state already matched the target; no call was made.
    AlreadySet(bool),
    /// Guard denied the attempt.
    Skipped,
}

/// Controller for user-initiated mutations from one component instance.
///
/// Owns the per-action [`MutationGuard`]; shares the process-wide
/// [`EventBus`]. Optimistic flags live behind a mutex shared with the owning
/// view: the override is written before the network call suspends, so the
/// view renders the intent while the call is in flight, and it is settled or
/// rolled back before the cycle returns.
#[derive(Debug)]
pub struct MutationController<I, C, W> {
    inventory: ReconciliationClient<I>,
    cart: C,
    wishlist: W,
    bus: Arc<EventBus>,
    guard: MutationGuard,
    request_timeout: Duration,
}

impl<I, C, W> MutationController<I, C, W>
where
    I: InventoryService,
    C: CartService,
    W: WishlistService,
{
    pub fn new(
        inventory: ReconciliationClient<I>,
        cart: C,
        wishlist: W,
        bus: Arc<EventBus>,
    ) -> Self {
        let config = inventory.config();
        let guard = MutationGuard::new(config.guard_min_interval, config.guard_trailing_window);
        let request_timeout = config.request_timeout;
        Self {
            inventory,
            cart,
            wishlist,
            bus,
            guard,
            request_timeout,
        }
    }

    pub fn inventory(&self) -> &ReconciliationClient<I> {
        &self.inventory
    }

    pub fn bus(&self) -> &Arc<EventBus> {
        &self.bus
    }

    /// Perform a guarded, check-then-act add-to-cart.
    ///
    /// `adding` is the view's transient activity flag: overridden to `true`
    /// before the cart call suspends and cleared on settle either way.
    pub async fn add_to_cart(
        &self,
        record: &ProductRecord,
        intent: &MutationIntent,
        adding: &Mutex<OptimisticState<bool>>,
    ) -> Result<CartOutcome, MutationError> {
        debug_assert_eq!(intent.kind, MutationKind::AddToCart);

        let key = intent.action_key();
        if !self.guard.try_acquire(&key) {
            return Ok(CartOutcome::Skipped);
        }
        let result = self.add_to_cart_guarded(record, intent, adding).await;
        self.guard.release(&key);
        result
    }

    async fn add_to_cart_guarded(
        &self,
        record: &ProductRecord,
        intent: &MutationIntent,
        adding: &Mutex<OptimisticState<bool>>,
    ) -> Result<CartOutcome, MutationError> {
        // Never trust the snapshot fetched on mount; re-check now.
        let check = self
            .inventory
            .check_availability(intent.target, intent.quantity)
            .await?;
        if !check.is_available {
            let snapshot = self.inventory.snapshot_from_check(check);
            tracing::debug!(
                product = %intent.target,
                requested = intent.quantity,
                available = check.available_quantity,
                "stale stock caught before mutation"
            );
            return Err(MutationError::StaleStock {
                available: check.available_quantity,
                snapshot,
            });
        }

        lock(adding).apply(true);

        let ack = match tokio::time::timeout(
            self.request_timeout,
            self.cart
                .add_to_cart(intent.target.product_id, intent.quantity, intent.target.variant_id),
        )
        .await
        {
            Ok(Ok(ack)) => ack,
            Ok(Err(ServiceError(msg))) => {
                lock(adding).rollback();
                return Err(MutationError::Cart(msg));
            }
            Err(_) => {
                lock(adding).rollback();
                return Err(MutationError::Cart(format!(
                    "timed out after {:?}",
                    self.request_timeout
                )));
            }
        };

        lock(adding).settle(false);
        self.bus.publish(StoreEvent::InventoryChanged {
            product_id: intent.target.product_id,
            variant_id: intent.target.variant_id,
        });

        Ok(CartOutcome::Added(CartReceipt {
            product_id: record.id,
            name: record.name.clone(),
            unit_price: record.price,
            currency: record.currency.clone(),
            quantity: intent.quantity,
            message: ack.message,
        }))
    }

    /// Set the wishlist flag to `target` (not a blind toggle).
    ///
    /// If the effective state already equals the target the call
    /// short-circuits to a no-op that clears any pending flag, so a second
    /// toggle racing a pending one cannot flap the icon.
    pub async fn toggle_wishlist(
        &self,
        target_ref: ProductRef,
        target: bool,
        state: &Mutex<OptimisticState<bool>>,
    ) -> Result<WishlistOutcome, MutationError> {
        let intent = MutationIntent::toggle_wishlist(target_ref);
        let key = intent.action_key();
        if !self.guard.try_acquire(&key) {
            return Ok(WishlistOutcome::Skipped);
        }
        let result = self.toggle_wishlist_guarded(target_ref, target, state).await;
        self.guard.release(&key);
        result
    }

    async fn toggle_wishlist_guarded(
        &self,
        target_ref: ProductRef,
        target: bool,
        state: &Mutex<OptimisticState<bool>>,
    ) -> Result<WishlistOutcome, MutationError> {
        {
            let mut flag = lock(state);
            if *flag.effective() == target {
                flag.settle(target);
                return Ok(WishlistOutcome::AlreadySet(target));
            }
            flag.apply(target);
        }

        let product_id = target_ref.product_id;
        let call = async {
            if target {
                self.wishlist.add(product_id).await
            } else {
                self.wishlist.remove(product_id).await
            }
        };

        match tokio::time::timeout(self.request_timeout, call).await {
            Ok(Ok(())) => {
                lock(state).confirm();
            }
            // Idempotency signals: the server already holds the target state.
            Ok(Err(WishlistError::AlreadyInWishlist)) if target => {
                lock(state).settle(true);
            }
            Ok(Err(WishlistError::NotInWishlist)) if !target => {
                lock(state).settle(false);
            }
            Ok(Err(err)) => {
                lock(state).rollback();
                return Err(MutationError::Wishlist(err.to_string()));
            }
            Err(_) => {
                lock(state).rollback();
                return Err(MutationError::Wishlist(format!(
                    "timed out after {:?}",
                    self.request_timeout
                )));
            }
        }

        self.bus
            .publish(StoreEvent::ProductChanged { product_id });
        Ok(WishlistOutcome::Set(target))
    }
}
