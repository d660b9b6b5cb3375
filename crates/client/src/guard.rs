//! Per-action concurrency guard.
//!
//! A leaky-bucket-of-size-1 debounce, not a queue: each action key owns an
//! in-flight flag and a blocked-until stamp. Rejected attempts are dropped
//! silently; the caller decides whether to show feedback. There is no
//! suspension anywhere in here.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use tokio::time::Instant;

#[derive(Debug, Clone, Copy)]
struct Slot {
    in_flight: bool,
    blocked_until: Option<Instant>,
}

/// Duplicate-submission guard shared per mutating action per controller.
#[derive(Debug)]
pub struct MutationGuard {
    min_interval: Duration,
    trailing_window: Duration,
    slots: Mutex<HashMap<String, Slot>>,
}

impl MutationGuard {
    pub fn new(min_interval: Duration, trailing_window: Duration) -> Self {
        Self {
            min_interval,
            trailing_window,
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// Try to take the slot for `key`.
    ///
    /// Fails with no side effect if the key is in flight or inside its
    /// blocked window. On success the key is in flight and stays blocked for
    /// at least `min_interval` from now; the caller must [`release`]
    /// (`MutationGuard::release`) it once the action settles.
    pub fn try_acquire(&self, key: &str) -> bool {
        let now = Instant::now();
        let mut slots = match self.slots.lock() {
            Ok(slots) => slots,
            Err(poisoned) => poisoned.into_inner(),
        };
        let slot = slots.entry(key.to_string()).or_insert(Slot {
            in_flight: false,
            blocked_until: None,
        });

        if slot.in_flight {
            tracing::debug!(key, "guard rejected: action in flight");
            return false;
        }
        if let Some(until) = slot.blocked_until {
            if now < until {
                tracing::debug!(key, "guard rejected: inside min interval");
                return false;
            }
        }

        slot.in_flight = true;
        slot.blocked_until = Some(now + self.min_interval);
        true
    }

    /// Release the slot after the action settled.
    ///
    /// Re-entry stays blocked for the trailing window, so a fast-resolving
    /// call cannot be re-triggered by the tail of a double-click.
    pub fn release(&self, key: &str) {
        let now = Instant::now();
        let mut slots = match self.slots.lock() {
            Ok(slots) => slots,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(slot) = slots.get_mut(key) {
            slot.in_flight = false;
            let trailing = now + self.trailing_window;
            slot.blocked_until = Some(match slot.blocked_until {
                Some(until) if until > trailing => until,
                _ => trailing,
            });
        }
    }
}
