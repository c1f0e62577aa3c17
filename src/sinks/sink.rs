//! # Diagnostics sink trait.
//!
//! Provides [`Sink`] — an extension point for plugging observability into
//! the supervisor: structured logging, metrics, alerting on terminal
//! give-up, and so on.
//!
//! Each sink gets:
//! - **Dedicated worker task** (runs independently)
//! - **Per-sink bounded queue** (capacity via [`Sink::queue_capacity`])
//! - **Panic isolation** (panics are caught; other sinks are unaffected)
//!
//! ## Architecture
//! ```text
//! SinkSet ──► [bounded queue] ──► worker task ──► sink.on_event()
//!                              └─► panic caught → warning, worker continues
//! ```
//!
//! ## Rules
//! - A slow sink only affects its own queue.
//! - Queue overflow drops the event **for this sink only**.
//! - Events are processed sequentially (FIFO) per sink.
//! - Sinks do not block the supervisor or each other.
//!
//! ## Example
//! ```rust
//! use async_trait::async_trait;
//! use subvisor::{Event, EventKind, Sink};
//!
//! struct GiveUpAlert;
//!
//! #[async_trait]
//! impl Sink for GiveUpAlert {
//!     async fn on_event(&self, ev: &Event) {
//!         if matches!(ev.kind, EventKind::RetriesExhausted) {
//!             // page someone, flip a UI banner, etc.
//!         }
//!     }
//!
//!     fn name(&self) -> &'static str { "give-up-alert" }
//! }
//! ```

use async_trait::async_trait;

use crate::events::Event;

/// Diagnostics sink for supervisor observability.
///
/// Each sink runs in isolation:
/// - **Bounded queue** buffers events (capacity via [`Self::queue_capacity`]).
/// - **Dedicated worker task** processes events sequentially (FIFO).
/// - **Panic isolation**: a panicking sink is reported and skipped, never fatal.
///
/// ### Implementation requirements
/// - Use async I/O; avoid blocking the executor.
/// - Handle errors internally; do not panic.
/// - Slow processing affects only this sink's queue.
#[async_trait]
pub trait Sink: Send + Sync + 'static {
    /// Processes a single event.
    ///
    /// Called from a dedicated worker task, not in the publisher context.
    /// Events are delivered in FIFO order per sink.
    async fn on_event(&self, event: &Event);

    /// Returns the sink name used in overflow/panic warnings.
    ///
    /// Prefer short, descriptive names (e.g., "metrics", "audit").
    /// The default uses `type_name::<Self>()`, which can be verbose —
    /// override it when possible.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Returns the preferred queue capacity for this sink.
    ///
    /// Overflow behavior:
    /// 1) the new event is dropped for this sink only,
    /// 2) a warning names the sink,
    /// 3) other sinks are unaffected.
    ///
    /// The runtime clamps capacity to a minimum of 1.
    ///
    /// Default: 1024.
    fn queue_capacity(&self) -> usize {
        1024
    }
}
