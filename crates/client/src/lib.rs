//! `vitrine-client` — view-facing consistency and mutation layer.
//!
//! Ties the reconciliation client, the mutation guard, the optimistic
//! mutation controller, the persistent local cache, and the event bus
//! together behind the three view controllers (product detail, grid card,
//! admin list).
//!
//! Concurrency model: single logical flow per user gesture; network calls
//! suspend the operation, never the thread. All shared state (guard slots,
//! bus subscribers, stores, view state) sits behind mutexes so nothing
//! breaks on a multi-threaded runtime.

pub mod cache;
pub mod controller;
pub mod guard;
pub mod services;
pub mod store;
pub mod telemetry;
pub mod types;
pub mod views;

pub use cache::{CachedImageSet, ImageCache};
pub use controller::{CartOutcome, MutationController, MutationError, WishlistOutcome};
pub use guard::MutationGuard;
pub use services::{
    CartAck, CartService, CatalogService, ImageDescriptor, ImageService, ServiceError,
    WishlistError, WishlistService,
};
pub use store::{KeyValueStore, MemoryStore, SqliteStore};
pub use types::{CartReceipt, MutationIntent, MutationKind, ProductRecord};
pub use views::{AdminProductListView, ProductCardView, ProductDetailView};

use std::sync::{Mutex, MutexGuard};

pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
