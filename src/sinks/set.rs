//! # SinkSet: non-blocking fan-out over multiple diagnostics sinks
//!
//! [`SinkSet`] distributes each [`Event`](crate::events::Event) to multiple
//! sinks **without awaiting** their processing.
//!
//! ## What it guarantees
//! - `emit(&Event)` returns immediately.
//! - Per-sink FIFO (queue order).
//! - Panics inside sinks are caught and logged (isolation).
//!
//! ## What it does **not** guarantee
//! - No global ordering across different sinks.
//! - No retries on per-sink queue overflow (events are dropped for that
//!   sink).
//!
//! ## Diagram
//! ```text
//!    emit(&Event)
//!        │                  (Arc-clone per sink)
//!        ├────────────► [queue S1] ─► worker S1 ─► on_event()
//!        ├────────────► [queue S2] ─► worker S2 ─► on_event()
//!        └────────────► [queue SN] ─► worker SN ─► on_event()
//! ```

use std::sync::Arc;

use futures::FutureExt;
use tokio::{sync::mpsc, task::JoinHandle};
use tracing::warn;

use crate::events::Event;

use super::Sink;

/// Per-sink channel with metadata
struct SinkChannel {
    name: &'static str,
    sender: mpsc::Sender<Arc<Event>>,
}

/// Composite fan-out with per-sink bounded queues and worker tasks.
pub struct SinkSet {
    channels: Vec<SinkChannel>,
    workers: Vec<JoinHandle<()>>,
}

impl SinkSet {
    /// Creates a new set and spawns one worker per sink.
    ///
    /// Must be called within a Tokio runtime context.
    #[must_use]
    pub fn new(sinks: Vec<Arc<dyn Sink>>) -> Self {
        let mut channels = Vec::with_capacity(sinks.len());
        let mut workers = Vec::with_capacity(sinks.len());

        for sink in sinks {
            let cap = sink.queue_capacity().max(1);
            let name = sink.name();
            let (tx, mut rx) = mpsc::channel::<Arc<Event>>(cap);
            let s = Arc::clone(&sink);

            let handle = tokio::spawn(async move {
                while let Some(ev) = rx.recv().await {
                    let fut = s.on_event(ev.as_ref());
                    if let Err(panic_err) = std::panic::AssertUnwindSafe(fut).catch_unwind().await {
                        warn!(sink = s.name(), ?panic_err, "diagnostics sink panicked");
                    }
                }
            });

            channels.push(SinkChannel { name, sender: tx });
            workers.push(handle);
        }

        Self { channels, workers }
    }

    /// Fan-out one event to all sinks (non-blocking).
    ///
    /// If a sink's queue is **full** or **closed**, the event is dropped for
    /// it and a warning names the sink.
    pub fn emit(&self, event: &Event) {
        let ev = Arc::new(event.clone());
        for channel in &self.channels {
            match channel.sender.try_send(Arc::clone(&ev)) {
                Ok(()) => {}
                Err(mpsc::error::TrySendError::Full(_)) => {
                    warn!(sink = channel.name, "diagnostics sink dropped event: queue full");
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    warn!(sink = channel.name, "diagnostics sink dropped event: worker closed");
                }
            }
        }
    }

    /// Returns the number of attached sinks.
    pub fn len(&self) -> usize {
        self.channels.len()
    }

    /// Returns true when no sinks are attached.
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Aborts all sink workers.
    ///
    /// Queued events are discarded; used when the owning manager is dropped.
    pub fn shutdown(&self) {
        for worker in &self.workers {
            worker.abort();
        }
    }
}

impl Drop for SinkSet {
    fn drop(&mut self) {
        self.shutdown();
    }
}
