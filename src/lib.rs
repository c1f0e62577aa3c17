//! # subvisor
//!
//! **Subvisor** is a lightweight subscription supervision library for Rust.
//!
//! It keeps a live connection to a single remote realtime topic, recovers
//! from failures with exponential backoff, coalesces notification bursts
//! through a debounce window, and tears down deterministically no matter how
//! quickly the consumer starts, restarts, or discards the subscription. The
//! crate is designed as a building block: one manager per topic, composed N
//! times by callers.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   ┌─────────────────┐      ┌─────────────────┐
//!   │    WatchSpec    │      │  Realtime impl  │
//!   │ (topic, filter, │      │ (your backend   │
//!   │  handler, knobs)│      │  adapter)       │
//!   └────────┬────────┘      └────────┬────────┘
//!            ▼                        ▼
//! ┌───────────────────────────────────────────────────────────┐
//! │  SubscriptionManager (one per topic)                      │
//! │  - WatchState (phase machine + generation counter)        │
//! │  - connect actor (retry loop with BackoffPolicy)          │
//! │  - notify path (debounce window → Handler)                │
//! │  - Bus (broadcast diagnostics events)                     │
//! └──────┬──────────────────────┬─────────────────────────────┘
//!        │ publishes            │ fan-out
//!        ▼                      ▼
//!   Event { seq, kind,     SinkSet ──► sink worker ──► Sink::on_event()
//!     topic, attempt, … }      (per-sink queue, panic isolated)
//! ```
//!
//! ### Lifecycle
//! ```text
//! start(spec)
//!   ├─► generation += 1, phase = Connecting
//!   └─► connect actor:
//!        loop {
//!          ├─► publish ConnectStarting{ attempt }
//!          ├─► Realtime::connect(topic, filter, signal)
//!          │       ├─ Ok  ──► store LiveHandle, phase = Active,
//!          │       │          publish Connected, actor retires
//!          │       └─ Err ──► publish ConnectFailed
//!          │                  ├─ budget left ─► publish RetryScheduled
//!          │                  │                 sleep(backoff) (cancellable)
//!          │                  └─ exhausted  ─► phase = Stopped,
//!          │                                   publish RetriesExhausted
//!          └─ every deferred step re-checks the generation tag
//!        }
//!
//! signal() while Active
//!   ├─ debounce = 0 ──► handler.on_change() (synchronous)
//!   └─ debounce > 0 ──► (re)arm single window ── quiet ──► one on_change()
//!
//! stop()
//!   ├─► generation += 1 (in-flight work discards itself)
//!   ├─► cancel retry + debounce timers
//!   ├─► release LiveHandle (failure → ReleaseFailed event, swallowed)
//!   └─► phase = Stopped, publish Stopped
//! ```
//!
//! ## Features
//! | Area             | Description                                                   | Key types / traits                  |
//! |------------------|---------------------------------------------------------------|-------------------------------------|
//! | **Supervision**  | Start/stop/restart one subscription, race-free.               | [`SubscriptionManager`], [`Phase`]  |
//! | **Policies**     | Configure reconnect backoff and jitter.                       | [`BackoffPolicy`], [`JitterPolicy`] |
//! | **Transport**    | Plug in any realtime backend.                                 | [`Realtime`], [`RealtimeFn`], [`LiveHandle`] |
//! | **Consumers**    | React to "something changed" with a fallible callback.        | [`Handler`], [`HandlerFn`], [`WatchSpec`] |
//! | **Diagnostics**  | Observe every transition through sinks on the event bus.      | [`Sink`], [`Event`], [`EventKind`]  |
//! | **Errors**       | Typed failures for transport, budget, callback, and release.  | [`SubscribeError`]                  |
//! | **Configuration**| Centralize retry/debounce defaults.                           | [`Config`]                          |
//!
//! ## Optional features
//! - `logging`: exports a tracing-backed [`LogSink`] _(demo/reference only)_.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use subvisor::{
//!     Config, HandlerFn, LiveHandle, RealtimeFn, SubscribeError, SubscriptionManager, WatchSpec,
//! };
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     // Adapter over your realtime backend; here an in-memory stub.
//!     let transport = RealtimeFn::arc(|_topic, _filter, _signal| async move {
//!         Ok::<_, SubscribeError>(LiveHandle::noop())
//!     });
//!
//!     let manager = SubscriptionManager::new(transport, &Config::default(), Vec::new());
//!
//!     let spec = WatchSpec::new(
//!         "logs",
//!         "game_id=eq.7",
//!         HandlerFn::arc(|| {
//!             // at least one change happened; re-fetch if you care
//!             Ok(())
//!         }),
//!     )
//!     .with_debounce(Duration::from_millis(100));
//!
//!     manager.start(spec);
//!     // ... application runs; notifications flow, failures retry ...
//!     manager.stop();
//! }
//! ```

mod config;
mod core;
mod error;
mod events;
mod policies;
mod sinks;
mod transport;
mod watch;

// ---- Public re-exports ----

pub use self::core::{Phase, SubscriptionManager};
pub use config::Config;
pub use error::SubscribeError;
pub use events::{Bus, Event, EventKind};
pub use policies::{BackoffPolicy, JitterPolicy};
pub use sinks::{Sink, SinkSet};
pub use transport::{ChangeSignal, LiveHandle, Realtime, RealtimeFn, RealtimeRef};
pub use watch::{Handler, HandlerFn, HandlerRef, WatchSpec};

// Optional: expose a simple built-in tracing sink (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use sinks::LogSink;
