//! Optimistic override value type.
//!
//! Wraps a server-confirmed value together with an optional pending override
//! applied before a mutation round trip resolves. The override must be
//! cleared within the mutation cycle that applied it — either folded into
//! the confirmed value on success, or discarded on rollback. It never
//! survives into a second, unrelated user action.

/// A confirmed value plus an optional pending optimistic override.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptimisticState<T> {
    confirmed: T,
    pending: Option<T>,
}

impl<T: Clone + PartialEq> OptimisticState<T> {
    /// Start from a server-confirmed value with no override.
    pub fn confirmed(value: T) -> Self {
        Self {
            confirmed: value,
            pending: None,
        }
    }

    /// The value a view should render: the override if present, otherwise
    /// the confirmed value.
    pub fn effective(&self) -> &T {
        self.pending.as_ref().unwrap_or(&self.confirmed)
    }

    /// The last server-confirmed value, ignoring any override.
    pub fn value(&self) -> &T {
        &self.confirmed
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Apply a tentative override before the network call resolves.
    pub fn apply(&mut self, value: T) {
        self.pending = Some(value);
    }

    /// Fold the override into the confirmed value (mutation succeeded).
    ///
    /// With no override pending this is a no-op, which keeps confirmation
    /// idempotent within a cycle.
    pub fn confirm(&mut self) {
        if let Some(value) = self.pending.take() {
            self.confirmed = value;
        }
    }

    /// Replace the confirmed value outright and drop any override.
    ///
    /// Used when the server reports an authoritative value that differs from
    /// what the mutation intended (e.g. idempotent wishlist responses).
    pub fn settle(&mut self, value: T) {
        self.confirmed = value;
        self.pending = None;
    }

    /// Discard the override and fall back to the pre-mutation confirmed
    /// value (mutation failed).
    pub fn rollback(&mut self) {
        self.pending = None;
    }
}
