//! # Notify path: from transport signal to consumer callback.
//!
//! The transport pokes a generation-tagged [`ChangeSignal`] for every
//! relevant change, from whatever thread it likes. This module turns those
//! pokes into handler invocations:
//!
//! ```text
//! signal() ── window = 0 ──► deliver immediately (synchronous, per poke)
//!    │
//!    └────── window > 0 ──► (re)arm single debounce timer ── quiet window ──► deliver once
//! ```
//!
//! ## Rules
//! - A poke for a stale generation (or a non-`Active` phase) is a no-op.
//! - At most one debounce window is armed; re-arming replaces (and thereby
//!   cancels) the previous one. A window expiry that lost the race against
//!   its own re-arm is discarded via `debounce_seq`.
//! - The handler runs with **no internal lock held**, so it may call back
//!   into `stop()` without deadlocking.
//! - Handler errors and panics become `CallbackFailed` events; the
//!   subscription stays live.

use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use tokio::{select, time};

use crate::core::state::{Phase, Shared, Timer};
use crate::events::{Event, EventKind};
use crate::transport::ChangeSignal;
use crate::watch::WatchSpec;

/// Builds the generation-tagged signal handed to the transport at connect.
pub(crate) fn change_signal(
    shared: &Arc<Shared>,
    spec: &WatchSpec,
    generation: u64,
) -> ChangeSignal {
    let shared = Arc::clone(shared);
    let spec = spec.clone();

    Arc::new(move || {
        let window = spec.debounce();

        if window.is_zero() {
            {
                let st = shared.state.lock();
                if st.generation != generation || st.phase != Phase::Active {
                    return;
                }
            }
            deliver(&shared, &spec);
            return;
        }

        let (seq, token) = {
            let mut st = shared.state.lock();
            if st.generation != generation || st.phase != Phase::Active {
                return;
            }
            st.debounce_seq = st.debounce_seq.wrapping_add(1);
            let timer = Timer::new();
            let token = timer.token();
            // replacing the slot cancels any previous window
            st.debounce = Some(timer);
            (st.debounce_seq, token)
        };

        let shared2 = Arc::clone(&shared);
        let spec2 = spec.clone();
        shared.runtime.spawn(async move {
            let sleep = time::sleep(window);
            tokio::pin!(sleep);
            select! {
                _ = &mut sleep => {}
                _ = token.cancelled() => { return; }
            }

            {
                let mut st = shared2.state.lock();
                if st.generation != generation
                    || st.phase != Phase::Active
                    || st.debounce_seq != seq
                {
                    return;
                }
                st.debounce = None;
            }
            deliver(&shared2, &spec2);
        });
    })
}

/// Invokes the consumer handler, capturing errors and panics.
fn deliver(shared: &Shared, spec: &WatchSpec) {
    let outcome = catch_unwind(AssertUnwindSafe(|| spec.handler().on_change()));

    let reason = match outcome {
        Ok(Ok(())) => return,
        Ok(Err(err)) => err.as_message(),
        Err(panic) => panic_message(panic.as_ref()),
    };

    shared.bus.publish(
        Event::new(EventKind::CallbackFailed)
            .with_topic(spec.topic_arc())
            .with_filter(spec.filter_arc())
            .with_reason(reason),
    );
}

/// Extracts a printable message from a panic payload.
fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&'static str>() {
        (*s).to_owned()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "handler panicked".to_owned()
    }
}
