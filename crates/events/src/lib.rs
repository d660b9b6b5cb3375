//! `vitrine-events` — process-wide typed event bus.
//!
//! Authoritative state transitions (inventory changed, product updated,
//! images updated, order completed) are announced here so that
//! independently-mounted views stay consistent without sharing a component
//! tree or a central store.

pub mod bus;
pub mod event;

pub use bus::{EventBus, Subscription};
pub use event::{EventKind, OrderLine, StoreEvent};
