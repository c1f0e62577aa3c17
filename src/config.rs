//! # Default configuration for supervised subscriptions.
//!
//! Provides [`Config`] — centralized defaults for the manager runtime.
//!
//! Config is used in two ways:
//! 1. **Manager creation**: `SubscriptionManager::new(client, &config, sinks)`
//! 2. **WatchSpec defaults**: `WatchSpec::with_defaults(topic, filter, handler, &config)`
//!
//! ## Sentinel values
//! - `debounce = 0` → no coalescing: the handler fires synchronously per notification
//! - `max_retries = 0` → a single connect failure is already terminal

use std::time::Duration;

use crate::policies::BackoffPolicy;

/// Default knobs for supervised subscriptions.
///
/// Defines:
/// - **Retry budget**: consecutive connect failures tolerated before give-up
/// - **Backoff strategy**: how reconnect delays grow
/// - **Coalescing**: debounce window for bursts of notifications
/// - **Enablement**: whether `start` actually connects
/// - **Event system**: bus capacity for diagnostics delivery
///
/// ## Field semantics
/// - `max_retries`: failures beyond the first connect attempt that are retried (`0` = give up immediately)
/// - `backoff`: delay policy for reconnects (default 1s base, ×2 growth, 10s cap)
/// - `debounce`: coalescing window (`0` = deliver every notification synchronously)
/// - `enabled`: when `false`, `start` behaves like `stop`
/// - `bus_capacity`: diagnostics bus ring buffer size (min 1; clamped by Bus)
#[derive(Clone, Debug)]
pub struct Config {
    /// Consecutive connect failures tolerated before terminal give-up.
    ///
    /// Failure number `max_retries + 1` (counting the initial attempt's
    /// failure as number 1) transitions the manager to a stopped give-up
    /// state; only an explicit `start`/`restart` tries again.
    pub max_retries: u32,

    /// Backoff policy for reconnect delays.
    pub backoff: BackoffPolicy,

    /// Debounce window coalescing bursts of change notifications.
    ///
    /// - `Duration::ZERO` = no coalescing, synchronous per-notification delivery
    /// - `> 0` = one handler invocation per quiet window
    pub debounce: Duration,

    /// Whether subscriptions start at all.
    ///
    /// With `enabled = false`, `start` is a no-op that also stops any live
    /// subscription — handy for feature-flagging a watch off.
    pub enabled: bool,

    /// Capacity of the diagnostics bus broadcast ring buffer.
    ///
    /// Slow sinks that lag behind more than `bus_capacity` events will
    /// observe `Lagged` and skip older items. Minimum value is 1 (enforced
    /// by the bus).
    pub bus_capacity: usize,
}

impl Config {
    /// Returns whether notification coalescing is active.
    ///
    /// - `false` → every notification invokes the handler synchronously
    /// - `true` → notifications within [`Config::debounce`] collapse to one
    #[inline]
    pub fn coalescing(&self) -> bool {
        !self.debounce.is_zero()
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `max_retries = 3` (initial attempt + 3 retries, then give up)
    /// - `backoff = BackoffPolicy::default()` (1s base, ×2 growth, 10s cap)
    /// - `debounce = 100ms` (coalesce notification bursts)
    /// - `enabled = true`
    /// - `bus_capacity = 1024` (good baseline)
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff: BackoffPolicy::default(),
            debounce: Duration::from_millis(100),
            enabled: true,
            bus_capacity: 1024,
        }
    }
}
