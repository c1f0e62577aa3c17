//! # Lifecycle events emitted by the subscription supervisor.
//!
//! The [`EventKind`] enum classifies event types across three categories:
//! - **Connect events**: attempt flow (starting, connected, failed, retry scheduled)
//! - **Terminal events**: give-up and teardown (retries exhausted, stopped)
//! - **Delivery events**: consumer/handle failures (callback failed, release failed)
//!
//! The [`Event`] struct carries additional metadata such as timestamps, the
//! topic/filter pair, attempt numbers, failure reasons, and backoff delays.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases
//! monotonically. Use `seq` to restore the exact order when events are
//! delivered out of order.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use subvisor::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::RetryScheduled)
//!     .with_topic("logs")
//!     .with_filter("user_id=eq.42")
//!     .with_attempt(2)
//!     .with_delay(Duration::from_secs(2))
//!     .with_reason("connection refused");
//!
//! assert_eq!(ev.kind, EventKind::RetryScheduled);
//! assert_eq!(ev.topic.as_deref(), Some("logs"));
//! assert_eq!(ev.delay_ms, Some(2000));
//! ```

use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of supervisor events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Connect events ===
    /// A connect attempt is starting.
    ///
    /// Sets:
    /// - `topic` / `filter`: the subscription request
    /// - `attempt`: attempt number (1-based)
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    ConnectStarting,

    /// A connect attempt succeeded; the subscription is live.
    ///
    /// Sets:
    /// - `topic` / `filter`: the subscription request
    /// - `attempt`: the attempt number that succeeded
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    Connected,

    /// A connect attempt failed (transient; a retry may follow).
    ///
    /// Sets:
    /// - `topic` / `filter`: the subscription request
    /// - `attempt`: attempt number
    /// - `reason`: transport error message
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    ConnectFailed,

    /// A reconnect was scheduled with a backoff delay.
    ///
    /// Sets:
    /// - `topic` / `filter`: the subscription request
    /// - `attempt`: the failed attempt that triggered the retry
    /// - `delay_ms`: delay before the next attempt (ms)
    /// - `reason`: last transport error message
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    RetryScheduled,

    // === Terminal events ===
    /// The retry budget was exhausted; the supervisor gave up.
    ///
    /// No further reconnect happens until an explicit `start`/`restart`.
    ///
    /// Sets:
    /// - `topic` / `filter`: the subscription request
    /// - `attempt`: total consecutive failed attempts
    /// - `reason`: last transport error message
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    RetriesExhausted,

    /// The subscription was stopped and all owned resources released.
    ///
    /// Sets:
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    Stopped,

    // === Delivery events ===
    /// The consumer's change handler returned an error or panicked.
    ///
    /// The subscription stays live; the failure is reported here only.
    ///
    /// Sets:
    /// - `topic` / `filter`: the subscription request
    /// - `reason`: handler error message or panic payload
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    CallbackFailed,

    /// Releasing the live handle failed during stop/restart.
    ///
    /// Teardown still completes; the failure is reported here only.
    ///
    /// Sets:
    /// - `reason`: transport error message
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    ReleaseFailed,
}

/// Supervisor event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Topic being watched, if applicable.
    pub topic: Option<Arc<str>>,
    /// Filter narrowing the topic, if applicable.
    pub filter: Option<Arc<str>>,
    /// Attempt count (starting from 1).
    pub attempt: Option<u32>,
    /// Backoff delay before the next attempt in milliseconds (compact).
    pub delay_ms: Option<u32>,
    /// Human-readable reason (errors, panic payloads, etc.).
    pub reason: Option<Arc<str>>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next
    /// sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            topic: None,
            filter: None,
            attempt: None,
            delay_ms: None,
            reason: None,
        }
    }

    /// Attaches the watched topic.
    #[inline]
    pub fn with_topic(mut self, topic: impl Into<Arc<str>>) -> Self {
        self.topic = Some(topic.into());
        self
    }

    /// Attaches the filter string.
    #[inline]
    pub fn with_filter(mut self, filter: impl Into<Arc<str>>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    /// Attaches an attempt count.
    #[inline]
    pub fn with_attempt(mut self, n: u32) -> Self {
        self.attempt = Some(n);
        self
    }

    /// Attaches a backoff delay (stored as milliseconds).
    #[inline]
    pub fn with_delay(mut self, d: Duration) -> Self {
        let ms = d.as_millis().min(u128::from(u32::MAX)) as u32;
        self.delay_ms = Some(ms);
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Returns true for the terminal give-up event.
    #[inline]
    pub fn is_giving_up(&self) -> bool {
        matches!(self.kind, EventKind::RetriesExhausted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seq_is_monotonic() {
        let a = Event::new(EventKind::ConnectStarting);
        let b = Event::new(EventKind::Connected);
        assert!(b.seq > a.seq);
    }

    #[test]
    fn test_builders_set_fields() {
        let ev = Event::new(EventKind::ConnectFailed)
            .with_topic("logs")
            .with_filter("game_id=eq.7")
            .with_attempt(3)
            .with_reason("refused")
            .with_delay(Duration::from_millis(1500));

        assert_eq!(ev.topic.as_deref(), Some("logs"));
        assert_eq!(ev.filter.as_deref(), Some("game_id=eq.7"));
        assert_eq!(ev.attempt, Some(3));
        assert_eq!(ev.reason.as_deref(), Some("refused"));
        assert_eq!(ev.delay_ms, Some(1500));
    }
}
