/// Hard limits for navigation timing settings

/// Longest simulated transition animation (5 seconds)
pub const MAX_TRANSITION_MS: u64 = 5000;

/// Fastest event-loop tick
pub const MIN_TICK_INTERVAL_MS: u64 = 1;

/// Slowest event-loop tick (1 second)
pub const MAX_TICK_INTERVAL_MS: u64 = 1000;

/// Default simulated transition animation
pub const DEFAULT_TRANSITION_MS: u64 = 250;

/// Default event-loop tick, roughly one frame at 60 Hz
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 16;
