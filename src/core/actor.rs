//! # Connect actor: drives one subscription to Active or give-up.
//!
//! One actor is spawned per `start()`. It loops connect attempts with
//! backoff until the subscription is live, the retry budget is exhausted,
//! or it is cancelled/invalidated by a newer generation.
//!
//! ## Event flow
//! For each attempt, the actor publishes:
//! ```text
//! ConnectStarting → [connect] → Connected (success; actor retires)
//!                             → ConnectFailed
//!
//! If retry scheduled:
//!   → RetryScheduled → [sleep] → (next attempt)
//! Else:
//!   → RetriesExhausted (terminal give-up; actor retires)
//! ```
//!
//! ## Rules
//! - Attempts run **sequentially** within one actor (never parallel)
//! - Every state write happens under the lock **and** re-checks the
//!   generation tag; a stale actor discards itself without side effects
//! - A stale connect that nevertheless won a handle releases it immediately
//!   (no leaked subscriptions)
//! - The backoff sleep is a cancellable safe point (`stop()` aborts it)

use std::sync::Arc;

use tokio::{select, time};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::core::notify;
use crate::core::state::{Phase, Shared};
use crate::error::SubscribeError;
use crate::events::{Event, EventKind};
use crate::transport::LiveHandle;
use crate::watch::WatchSpec;

/// Decision taken under the state lock after a connect attempt resolves.
enum AfterAttempt {
    /// Generation moved on (stop/restart); discard without side effects.
    Stale,
    /// Handle stored, phase is `Active`.
    Connected,
    /// Failure within budget; sleep `delay` and try again.
    Retry { delay: std::time::Duration },
    /// Failure beyond budget; terminal give-up.
    GiveUp,
}

/// Runs the connect/retry loop for one generation of one subscription.
///
/// ### Exit conditions
/// - connect succeeded (the notify path takes over)
/// - retry budget exhausted (phase is the terminal give-up `Stopped`)
/// - `cancel` fired or the generation moved on (stop/restart)
pub(crate) async fn run_connect(
    shared: Arc<Shared>,
    spec: WatchSpec,
    generation: u64,
    cancel: CancellationToken,
) {
    loop {
        let attempt = {
            let mut st = shared.state.lock();
            if st.generation != generation || st.phase == Phase::Stopped {
                return;
            }
            st.phase = Phase::Connecting;
            st.retry_attempt + 1
        };

        shared.bus.publish(
            Event::new(EventKind::ConnectStarting)
                .with_topic(spec.topic_arc())
                .with_filter(spec.filter_arc())
                .with_attempt(attempt),
        );

        let signal = notify::change_signal(&shared, &spec, generation);
        let res = shared
            .client
            .connect(spec.topic(), spec.filter(), signal)
            .await;

        let error = res.as_ref().err().map(SubscribeError::as_message);
        let decision = settle_attempt(&shared, &spec, generation, res);

        match decision {
            AfterAttempt::Stale => return,
            AfterAttempt::Connected => {
                shared.bus.publish(
                    Event::new(EventKind::Connected)
                        .with_topic(spec.topic_arc())
                        .with_filter(spec.filter_arc())
                        .with_attempt(attempt),
                );
                return;
            }
            AfterAttempt::Retry { delay } => {
                publish_failed(&shared, &spec, attempt, error.as_deref());
                shared.bus.publish(
                    Event::new(EventKind::RetryScheduled)
                        .with_topic(spec.topic_arc())
                        .with_filter(spec.filter_arc())
                        .with_attempt(attempt)
                        .with_delay(delay)
                        .with_reason(error.clone().unwrap_or_default()),
                );

                let sleep = time::sleep(delay);
                tokio::pin!(sleep);
                select! {
                    _ = &mut sleep => {}
                    _ = cancel.cancelled() => { return; }
                }
            }
            AfterAttempt::GiveUp => {
                publish_failed(&shared, &spec, attempt, error.as_deref());
                let terminal = SubscribeError::Exhausted {
                    attempts: attempt,
                    error: error.unwrap_or_default(),
                };
                shared.bus.publish(
                    Event::new(EventKind::RetriesExhausted)
                        .with_topic(spec.topic_arc())
                        .with_filter(spec.filter_arc())
                        .with_attempt(attempt)
                        .with_reason(terminal.as_message()),
                );
                return;
            }
        }
    }
}

/// Applies one resolved connect attempt to the state, under the lock.
///
/// Returns what the actor should do next. A stale successful connect has its
/// handle released here (best-effort; failures go to the bus).
fn settle_attempt(
    shared: &Arc<Shared>,
    spec: &WatchSpec,
    generation: u64,
    res: Result<LiveHandle, SubscribeError>,
) -> AfterAttempt {
    let mut st = shared.state.lock();

    if st.generation != generation || st.phase == Phase::Stopped {
        drop(st);
        debug!(topic = spec.topic(), "discarding stale connect result");
        discard_stale(shared, res);
        return AfterAttempt::Stale;
    }

    match res {
        Ok(handle) => {
            st.live = Some(handle);
            st.phase = Phase::Active;
            st.retry_attempt = 0;
            st.connect = None;
            AfterAttempt::Connected
        }
        Err(_) => {
            let failures = st.retry_attempt + 1;
            st.retry_attempt = failures;
            if failures > spec.max_retries() {
                st.phase = Phase::Stopped;
                st.connect = None;
                AfterAttempt::GiveUp
            } else {
                st.phase = Phase::Retrying;
                AfterAttempt::Retry {
                    delay: spec.backoff().next(failures - 1),
                }
            }
        }
    }
}

/// Releases a handle won by an invalidated connect attempt.
fn discard_stale(shared: &Arc<Shared>, res: Result<LiveHandle, SubscribeError>) {
    if let Ok(handle) = res {
        if let Err(err) = handle.release() {
            shared
                .bus
                .publish(Event::new(EventKind::ReleaseFailed).with_reason(err.as_message()));
        }
    }
}

/// Publishes `ConnectFailed` with error details.
fn publish_failed(shared: &Arc<Shared>, spec: &WatchSpec, attempt: u32, error: Option<&str>) {
    shared.bus.publish(
        Event::new(EventKind::ConnectFailed)
            .with_topic(spec.topic_arc())
            .with_filter(spec.filter_arc())
            .with_attempt(attempt)
            .with_reason(error.unwrap_or_default()),
    );
}
