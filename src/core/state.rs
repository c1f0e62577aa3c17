//! # Subscription state: the manager's exclusively-owned mutable core.
//!
//! [`WatchState`] holds everything the manager mutates: the [`Phase`] state
//! machine, the generation counter that invalidates stale async results, the
//! consecutive-failure counter, the live handle, and the two owned timer
//! resources (pending connect/retry actor, pending debounce window).
//!
//! ## Rules
//! - All mutation happens under one mutex, never across an `.await`.
//! - At most one live handle, one connect timer, one debounce timer exist.
//! - `Stopped` is terminal for a generation; stale completions compare their
//!   generation tag and discard themselves instead of trusting cancellation.

use parking_lot::Mutex;
use tokio::runtime;
use tokio_util::sync::CancellationToken;

use crate::events::Bus;
use crate::transport::{LiveHandle, RealtimeRef};

/// Lifecycle phase of a supervised subscription.
///
/// ```text
/// Idle ──start──► Connecting ──ok──► Active ──stop──► Stopped
///                    │  ▲                │
///                 fail  └─timer─ Retrying┘(stop)
///                    │              ▲
///                    └──────────────┘ (budget left)
///                    └─► Stopped (budget exhausted)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Created, never started.
    Idle,
    /// A connect attempt is in flight.
    Connecting,
    /// A live handle is held; notifications flow.
    Active,
    /// Waiting out a backoff delay before reconnecting.
    Retrying,
    /// Torn down (explicit stop or terminal give-up); restartable.
    Stopped,
}

/// Owned, cancelable scheduled-resource handle.
///
/// Wraps a [`CancellationToken`] observed by one spawned task (a backoff
/// sleep or a debounce window). Dropping the timer cancels it, so replacing
/// the slot in [`WatchState`] is itself the cancellation.
#[derive(Debug)]
pub(crate) struct Timer {
    cancel: CancellationToken,
}

impl Timer {
    /// Creates a fresh timer handle.
    pub(crate) fn new() -> Self {
        Self {
            cancel: CancellationToken::new(),
        }
    }

    /// Returns the token the scheduled task should select on.
    pub(crate) fn token(&self) -> CancellationToken {
        self.cancel.clone()
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Mutable subscription state, exclusively owned by the manager.
#[derive(Debug)]
pub(crate) struct WatchState {
    /// Current lifecycle phase.
    pub phase: Phase,
    /// Monotonic counter; bumped on every (re)start and stop. Async results
    /// tagged with an older generation are discarded on arrival.
    pub generation: u64,
    /// Consecutive failed connect attempts since the last success.
    pub retry_attempt: u32,
    /// Ownership of the transport's unsubscribe capability, if live.
    pub live: Option<LiveHandle>,
    /// Pending connect/retry actor (its backoff sleeps observe this token).
    pub connect: Option<Timer>,
    /// Pending debounce window, if armed.
    pub debounce: Option<Timer>,
    /// Disambiguates a debounce expiry racing its own re-arm.
    pub debounce_seq: u64,
}

impl WatchState {
    pub(crate) fn new() -> Self {
        Self {
            phase: Phase::Idle,
            generation: 0,
            retry_attempt: 0,
            live: None,
            connect: None,
            debounce: None,
            debounce_seq: 0,
        }
    }
}

/// Context shared between the manager facade, the connect actor, and the
/// notify path.
pub(crate) struct Shared {
    /// The realtime transport.
    pub client: RealtimeRef,
    /// Diagnostics bus.
    pub bus: Bus,
    /// The exclusively-owned state, behind the single mutual-exclusion guard.
    pub state: Mutex<WatchState>,
    /// Runtime handle so transport threads can arm timers and spawn actors.
    pub runtime: runtime::Handle,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_is_idle_and_empty() {
        let st = WatchState::new();
        assert_eq!(st.phase, Phase::Idle);
        assert_eq!(st.generation, 0);
        assert_eq!(st.retry_attempt, 0);
        assert!(st.live.is_none());
        assert!(st.connect.is_none());
        assert!(st.debounce.is_none());
    }

    #[test]
    fn test_dropping_timer_cancels_token() {
        let timer = Timer::new();
        let token = timer.token();
        assert!(!token.is_cancelled());
        drop(timer);
        assert!(token.is_cancelled());
    }
}
