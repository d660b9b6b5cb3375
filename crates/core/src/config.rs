//! Client-side tuning constants.
//!
//! The source material hard-coded slightly different values for these in
//! near-duplicate views; they are deployment configuration here, set once at
//! startup and shared by every controller.

use std::time::Duration;

/// Per-deployment configuration for the consistency controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Stock at or below this (and above zero) is reported as low stock.
    pub low_stock_threshold: u32,
    /// Minimum interval between two acquisitions of the same action key.
    pub guard_min_interval: Duration,
    /// Re-entry stays blocked for this long after an action settles, so a
    /// fast-resolving call cannot be re-triggered by a double-click.
    pub guard_trailing_window: Duration,
    /// Timeout applied to every collaborator network call.
    pub request_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            low_stock_threshold: 10,
            guard_min_interval: Duration::from_millis(1500),
            guard_trailing_window: Duration::from_millis(300),
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl ClientConfig {
    pub fn with_low_stock_threshold(mut self, threshold: u32) -> Self {
        self.low_stock_threshold = threshold;
        self
    }

    pub fn with_guard_min_interval(mut self, interval: Duration) -> Self {
        self.guard_min_interval = interval;
        self
    }

    pub fn with_guard_trailing_window(mut self, window: Duration) -> Self {
        self.guard_trailing_window = window;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}
