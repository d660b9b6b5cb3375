//! Event publishing/subscription (mechanics only).
//!
//! The bus is a single process-wide instance distributing [`StoreEvent`]s to
//! every currently-subscribed handler. It is intentionally lightweight:
//!
//! - **Synchronous delivery**: `publish` invokes matching handlers inline,
//!   in publish order, before returning.
//! - **Fire-and-forget**: no persistence and no replay; a handler subscribed
//!   after a publish never sees that event.
//! - **Idempotent consumers**: payloads are minimal hints, so handlers must
//!   tolerate duplicates and re-derive state from authoritative sources.
//!
//! Views subscribe on mount and must unsubscribe on unmount; [`Subscription`]
//! does so on drop, so holding the guard for the view's lifetime is enough.
//!
//! Handlers run without the subscriber lock held, so a handler may publish
//! further events or (un)subscribe without deadlocking. There is no
//! suspension anywhere on this path.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, Weak};

use crate::event::{EventKind, StoreEvent};

type Handler = Arc<dyn Fn(&StoreEvent) + Send + Sync>;

#[derive(Default)]
struct Registry {
    next_id: u64,
    handlers: HashMap<EventKind, Vec<(u64, Handler)>>,
}

/// Process-wide pub/sub channel for [`StoreEvent`]s.
///
/// Shared mutable state behind a mutex so the protocol stays sound on a
/// multi-threaded runtime; delivery itself remains synchronous.
#[derive(Default)]
pub struct EventBus {
    registry: Mutex<Registry>,
}

impl EventBus {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Deliver `event` to every handler subscribed to its kind, in
    /// subscription order.
    pub fn publish(&self, event: StoreEvent) {
        let handlers: Vec<Handler> = {
            let registry = match self.registry.lock() {
                Ok(registry) => registry,
                Err(poisoned) => poisoned.into_inner(),
            };
            registry
                .handlers
                .get(&event.kind())
                .map(|subs| subs.iter().map(|(_, h)| Arc::clone(h)).collect())
                .unwrap_or_default()
        };

        tracing::debug!(kind = event.kind().as_str(), subscribers = handlers.len(), "publish");

        for handler in handlers {
            handler(&event);
        }
    }

    /// Register `handler` for one event kind.
    ///
    /// The returned [`Subscription`] unsubscribes when dropped (or via
    /// [`Subscription::unsubscribe`]); leaking it leaks the handler.
    pub fn subscribe<F>(self: &Arc<Self>, kind: EventKind, handler: F) -> Subscription
    where
        F: Fn(&StoreEvent) + Send + Sync + 'static,
    {
        let id = {
            let mut registry = match self.registry.lock() {
                Ok(registry) => registry,
                Err(poisoned) => poisoned.into_inner(),
            };
            let id = registry.next_id;
            registry.next_id += 1;
            registry
                .handlers
                .entry(kind)
                .or_default()
                .push((id, Arc::new(handler)));
            id
        };

        Subscription {
            bus: Arc::downgrade(self),
            kind,
            id,
        }
    }

    fn remove(&self, kind: EventKind, id: u64) {
        let mut registry = match self.registry.lock() {
            Ok(registry) => registry,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(subs) = registry.handlers.get_mut(&kind) {
            subs.retain(|(sub_id, _)| *sub_id != id);
        }
    }
}

impl core::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("EventBus").finish_non_exhaustive()
    }
}

/// Handle to an active subscription; dropping it unsubscribes.
#[derive(Debug)]
pub struct Subscription {
    bus: Weak<EventBus>,
    kind: EventKind,
    id: u64,
}

impl Subscription {
    /// Explicitly detach the handler. Equivalent to dropping the guard.
    pub fn unsubscribe(self) {
        // Drop impl does the work.
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(bus) = self.bus.upgrade() {
            bus.remove(self.kind, self.id);
        }
    }
}
