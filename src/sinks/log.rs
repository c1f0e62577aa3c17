//! # Tracing-backed logging sink for debugging and demos.
//!
//! [`LogSink`] renders every supervisor event through `tracing`.
//!
//! ## Output shape
//! ```text
//! INFO  connect starting topic=logs attempt=1
//! WARN  connect failed topic=logs attempt=1 reason="connection refused"
//! INFO  retry scheduled topic=logs attempt=1 delay_ms=1000
//! ERROR retries exhausted topic=logs attempts=4
//! INFO  stopped
//! ```

use async_trait::async_trait;
use tracing::{error, info, warn};

use crate::events::{Event, EventKind};
use crate::sinks::Sink;

/// Tracing-backed diagnostics sink.
///
/// Enabled via the `logging` feature. Emits one log line per event for
/// debugging and demonstration purposes.
///
/// Not intended as a metrics pipeline — implement a custom [`Sink`] for
/// that.
#[derive(Debug, Default)]
pub struct LogSink;

impl LogSink {
    /// Creates a new logging sink.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Sink for LogSink {
    async fn on_event(&self, e: &Event) {
        let topic = e.topic.as_deref().unwrap_or("-");
        match e.kind {
            EventKind::ConnectStarting => {
                info!(topic, attempt = e.attempt, "connect starting");
            }
            EventKind::Connected => {
                info!(topic, attempt = e.attempt, "connected");
            }
            EventKind::ConnectFailed => {
                warn!(topic, attempt = e.attempt, reason = e.reason.as_deref(), "connect failed");
            }
            EventKind::RetryScheduled => {
                info!(
                    topic,
                    attempt = e.attempt,
                    delay_ms = e.delay_ms,
                    reason = e.reason.as_deref(),
                    "retry scheduled"
                );
            }
            EventKind::RetriesExhausted => {
                error!(topic, attempts = e.attempt, reason = e.reason.as_deref(), "retries exhausted");
            }
            EventKind::CallbackFailed => {
                warn!(topic, reason = e.reason.as_deref(), "change handler failed");
            }
            EventKind::ReleaseFailed => {
                warn!(reason = e.reason.as_deref(), "release failed");
            }
            EventKind::Stopped => {
                info!("stopped");
            }
        }
    }

    fn name(&self) -> &'static str {
        "log"
    }
}
