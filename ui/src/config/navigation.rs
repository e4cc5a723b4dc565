use super::limits::{DEFAULT_TICK_INTERVAL_MS, DEFAULT_TRANSITION_MS};
use engine::navigation::DestroyOrder;
use serde::Deserialize;
use std::time::Duration;

/// Navigation stack and event loop configuration
#[derive(Debug, Deserialize, Default, Clone)]
pub struct NavigationConfig {
    /// Length of a simulated push/pop animation (default: 250ms)
    transition_ms: Option<u64>,
    /// Event-loop tick (default: 16ms)
    tick_interval_ms: Option<u64>,
    /// Which notice the simulated stack reports first after an animated pop
    destroy_order: Option<DestroyOrder>,
    /// Initial compressed display mode (default: false)
    compressed: Option<bool>,
}

impl NavigationConfig {
    pub fn transition_ms(&self) -> u64 {
        self.transition_ms.unwrap_or(DEFAULT_TRANSITION_MS)
    }

    pub fn transition(&self) -> Duration {
        Duration::from_millis(self.transition_ms())
    }

    pub fn tick_interval_ms(&self) -> u64 {
        self.tick_interval_ms.unwrap_or(DEFAULT_TICK_INTERVAL_MS)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms())
    }

    pub fn destroy_order(&self) -> DestroyOrder {
        self.destroy_order.unwrap_or_default()
    }

    pub fn compressed(&self) -> bool {
        self.compressed.unwrap_or(false)
    }
}
