//! # SubscriptionManager: one resilient subscription, race-free by construction.
//!
//! The manager owns a single live subscription to a remote topic. It
//! composes a [`Realtime`](crate::Realtime) transport, the consumer's
//! [`Handler`](crate::Handler), and a diagnostics [`Bus`] + [`SinkSet`].
//!
//! ## High-level architecture
//! ```text
//! start(spec) ──► generation += 1 ──► connect actor (retry loop w/ backoff)
//!                                         │ connect ok
//!                                         ▼
//!                               LiveHandle stored, phase = Active
//!                                         │
//!                transport ──► change signal ──► debounce ──► handler
//!
//! stop() ──► generation += 1, cancel timers, release LiveHandle, phase = Stopped
//!
//! Event flow:
//!   actor / notify / stop ── publish(Event) ──► Bus ──► sink listener ──► SinkSet
//! ```
//!
//! ## Concurrency discipline
//! - All state mutation happens under one mutex, never across an `.await`
//!   and never while the consumer handler runs.
//! - Every deferred effect (connect completion, backoff sleep, debounce
//!   expiry) carries the generation current when it was scheduled and
//!   discards itself on mismatch. `stop()` therefore neutralizes in-flight
//!   work without waiting for it.
//! - `start()` and `stop()` are callable from any thread at any time,
//!   including from inside the handler.

use std::sync::Arc;

use tokio::runtime;
use tokio::sync::broadcast::error::RecvError;
use tracing::warn;

use crate::config::Config;
use crate::core::actor::run_connect;
use crate::core::state::{Phase, Shared, Timer, WatchState};
use crate::events::{Bus, Event, EventKind};
use crate::sinks::{Sink, SinkSet};
use crate::transport::RealtimeRef;
use crate::watch::WatchSpec;

/// Supervises one live subscription: connect, retry with backoff, debounce
/// notifications, tear down deterministically.
///
/// ### Responsibilities
/// - **Idempotent start**: at most one connect pipeline per generation
/// - **Recovery**: reconnects with exponential backoff up to the retry budget
/// - **Coalescing**: collapses notification bursts into one handler call
/// - **Teardown**: `stop()` leaves zero timers and zero handles, always
/// - **Observability**: every transition is published to the diagnostics bus
///
/// ### Rules
/// - One manager instance supervises one subscription; compose N managers
///   for N topics.
/// - `stop()` is the sole cancellation entry point and is unconditionally
///   idempotent.
///
/// ## Example
/// ```no_run
/// use std::sync::Arc;
/// use subvisor::{
///     Config, HandlerFn, LiveHandle, RealtimeFn, SubscribeError, SubscriptionManager, WatchSpec,
/// };
///
/// # async fn demo() {
/// let transport = RealtimeFn::arc(|_topic, _filter, _signal| async move {
///     Ok::<_, SubscribeError>(LiveHandle::noop())
/// });
///
/// let manager = SubscriptionManager::new(transport, &Config::default(), Vec::new());
///
/// let spec = WatchSpec::new(
///     "logs",
///     "game_id=eq.7",
///     HandlerFn::arc(|| {
///         // re-fetch the logs list...
///         Ok(())
///     }),
/// );
///
/// manager.start(spec);
/// // ... later
/// manager.stop();
/// # }
/// ```
pub struct SubscriptionManager {
    shared: Arc<Shared>,
    listener: tokio::task::JoinHandle<()>,
}

impl SubscriptionManager {
    /// Creates a manager over the given transport and wires the diagnostics
    /// sinks to its event bus.
    ///
    /// # Panics
    /// Must be called within a Tokio runtime context: the sink workers are
    /// spawned here, and the captured runtime handle is what lets transport
    /// threads arm debounce timers later.
    pub fn new(client: RealtimeRef, cfg: &Config, sinks: Vec<Arc<dyn Sink>>) -> Self {
        let bus = Bus::new(cfg.bus_capacity_clamped());
        let set = Arc::new(SinkSet::new(sinks));

        let mut rx = bus.subscribe();
        let listener = tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(ev) => set.emit(&ev),
                    Err(RecvError::Closed) => break,
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "diagnostics listener lagged");
                        continue;
                    }
                }
            }
        });

        let shared = Arc::new(Shared {
            client,
            bus,
            state: parking_lot::Mutex::new(WatchState::new()),
            runtime: runtime::Handle::current(),
        });

        Self { shared, listener }
    }

    /// Starts supervising the subscription described by `spec`.
    ///
    /// Returns immediately; connecting happens asynchronously. Calling
    /// `start` while already Connecting/Active/Retrying is a no-op — stop
    /// first (or use [`restart`](Self::restart)) to change topic, filter, or
    /// options. A spec with `enabled = false` behaves like [`stop`](Self::stop).
    pub fn start(&self, spec: WatchSpec) {
        if !spec.enabled() {
            self.stop();
            return;
        }

        let launch = {
            let mut st = self.shared.state.lock();
            match st.phase {
                // already subscribing; duplicate connect attempts are the
                // race this guard exists for
                Phase::Connecting | Phase::Active | Phase::Retrying => None,
                Phase::Idle | Phase::Stopped => {
                    st.generation += 1;
                    st.retry_attempt = 0;
                    st.phase = Phase::Connecting;
                    let timer = Timer::new();
                    let cancel = timer.token();
                    st.connect = Some(timer);
                    Some((st.generation, cancel))
                }
            }
        };

        if let Some((generation, cancel)) = launch {
            self.shared.runtime.spawn(run_connect(
                Arc::clone(&self.shared),
                spec,
                generation,
                cancel,
            ));
        }
    }

    /// Stops the subscription and releases every owned resource.
    ///
    /// Safe to call from any phase, any number of times, from any thread —
    /// including from inside the change handler. Synchronous: timers are
    /// cancelled and the live handle is released before this returns; an
    /// in-flight connect is not awaited but is invalidated by the generation
    /// bump and will discard itself.
    ///
    /// A release failure is reported as a
    /// [`ReleaseFailed`](EventKind::ReleaseFailed) event and never escapes.
    pub fn stop(&self) {
        let (was, live) = {
            let mut st = self.shared.state.lock();
            let was = st.phase;
            st.generation += 1;
            st.phase = Phase::Stopped;
            st.retry_attempt = 0;
            st.connect = None;
            st.debounce = None;
            (was, st.live.take())
        };

        if let Some(handle) = live {
            if let Err(err) = handle.release() {
                self.shared
                    .bus
                    .publish(Event::new(EventKind::ReleaseFailed).with_reason(err.as_message()));
            }
        }

        if was != Phase::Stopped {
            self.shared.bus.publish(Event::new(EventKind::Stopped));
        }
    }

    /// Forced restart: `stop()` immediately followed by `start(spec)`.
    ///
    /// The way to apply a new topic, filter, or options. Exactly one
    /// subscription (the newest) survives, regardless of how the previous
    /// generation's in-flight work resolves.
    pub fn restart(&self, spec: WatchSpec) {
        self.stop();
        self.start(spec);
    }

    /// Returns the current lifecycle phase.
    pub fn phase(&self) -> Phase {
        self.shared.state.lock().phase
    }

    /// Returns true while a live handle is held and notifications flow.
    pub fn is_active(&self) -> bool {
        self.phase() == Phase::Active
    }

    /// Returns the diagnostics bus, e.g. to attach an ad hoc receiver.
    pub fn bus(&self) -> &Bus {
        &self.shared.bus
    }
}

impl Drop for SubscriptionManager {
    fn drop(&mut self) {
        self.stop();
        self.listener.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use parking_lot::Mutex;
    use tokio::sync::Semaphore;
    use tokio::time::{self, Instant};

    use crate::error::SubscribeError;
    use crate::transport::{ChangeSignal, LiveHandle, Realtime};
    use crate::watch::{HandlerFn, HandlerRef};

    /// Scripted transport: fails the first `fail_first` connects, records
    /// attempt times, captures signals, counts releases. An optional gate
    /// lets a test hold connect attempts in flight.
    struct FakeRealtime {
        fail_first: u32,
        attempts: AtomicU32,
        connects: Mutex<Vec<(String, String, Instant)>>,
        releases: Arc<AtomicU32>,
        signals: Mutex<Vec<ChangeSignal>>,
        gate: Option<Arc<Semaphore>>,
    }

    impl FakeRealtime {
        fn ok() -> Arc<Self> {
            Self::failing(0)
        }

        fn failing(fail_first: u32) -> Arc<Self> {
            Arc::new(Self {
                fail_first,
                attempts: AtomicU32::new(0),
                connects: Mutex::new(Vec::new()),
                releases: Arc::new(AtomicU32::new(0)),
                signals: Mutex::new(Vec::new()),
                gate: None,
            })
        }

        fn gated(gate: Arc<Semaphore>) -> Arc<Self> {
            Arc::new(Self {
                fail_first: 0,
                attempts: AtomicU32::new(0),
                connects: Mutex::new(Vec::new()),
                releases: Arc::new(AtomicU32::new(0)),
                signals: Mutex::new(Vec::new()),
                gate: Some(gate),
            })
        }

        fn connect_count(&self) -> usize {
            self.connects.lock().len()
        }

        fn release_count(&self) -> u32 {
            self.releases.load(Ordering::SeqCst)
        }

        fn signal(&self, idx: usize) -> ChangeSignal {
            self.signals.lock()[idx].clone()
        }
    }

    #[async_trait]
    impl Realtime for FakeRealtime {
        async fn connect(
            &self,
            topic: &str,
            filter: &str,
            signal: ChangeSignal,
        ) -> Result<LiveHandle, SubscribeError> {
            self.connects
                .lock()
                .push((topic.to_owned(), filter.to_owned(), Instant::now()));

            if let Some(gate) = &self.gate {
                let permit = gate.acquire().await.map_err(|_| {
                    SubscribeError::connect("gate closed")
                })?;
                permit.forget();
            }

            let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
            if attempt <= self.fail_first {
                return Err(SubscribeError::connect("connection refused"));
            }

            self.signals.lock().push(signal);
            let releases = Arc::clone(&self.releases);
            Ok(LiveHandle::new(move || {
                releases.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }))
        }
    }

    fn counting_handler() -> (HandlerRef, Arc<AtomicU32>, Arc<Mutex<Vec<Instant>>>) {
        let calls = Arc::new(AtomicU32::new(0));
        let at = Arc::new(Mutex::new(Vec::new()));
        let calls2 = Arc::clone(&calls);
        let at2 = Arc::clone(&at);
        let handler = HandlerFn::arc(move || {
            calls2.fetch_add(1, Ordering::SeqCst);
            at2.lock().push(Instant::now());
            Ok(())
        });
        (handler, calls, at)
    }

    fn spec_for(handler: HandlerRef) -> WatchSpec {
        WatchSpec::new("logs", "game_id=eq.7", handler)
    }

    /// Lets spawned work (connect actors, debounce expiries) run.
    async fn settle() {
        time::sleep(Duration::from_millis(1)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_connects_and_activates() {
        let fake = FakeRealtime::ok();
        let mgr = SubscriptionManager::new(fake.clone(), &Config::default(), Vec::new());
        let (handler, _, _) = counting_handler();

        mgr.start(spec_for(handler));
        settle().await;

        assert_eq!(mgr.phase(), Phase::Active);
        assert_eq!(fake.connect_count(), 1);
        {
            let st = mgr.shared.state.lock();
            assert!(st.live.is_some());
            assert!(st.connect.is_none(), "no pending retry after success");
            assert_eq!(st.retry_attempt, 0);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_is_idempotent_while_running() {
        let fake = FakeRealtime::ok();
        let mgr = SubscriptionManager::new(fake.clone(), &Config::default(), Vec::new());
        let (handler, _, _) = counting_handler();

        mgr.start(spec_for(handler.clone()));
        mgr.start(spec_for(handler.clone()));
        settle().await;
        mgr.start(spec_for(handler));
        settle().await;

        assert_eq!(fake.connect_count(), 1, "duplicate starts must not reconnect");
        assert_eq!(mgr.phase(), Phase::Active);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_releases_exactly_once() {
        let fake = FakeRealtime::ok();
        let mgr = SubscriptionManager::new(fake.clone(), &Config::default(), Vec::new());
        let (handler, _, _) = counting_handler();

        mgr.start(spec_for(handler));
        settle().await;
        mgr.stop();
        mgr.stop();

        assert_eq!(mgr.phase(), Phase::Stopped);
        assert_eq!(fake.release_count(), 1, "double stop must not double release");
        {
            let st = mgr.shared.state.lock();
            assert!(st.live.is_none());
            assert!(st.connect.is_none());
            assert!(st.debounce.is_none());
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_before_connect_resolves_discards_stale_handle() {
        let gate = Arc::new(Semaphore::new(0));
        let fake = FakeRealtime::gated(gate.clone());
        let mgr = SubscriptionManager::new(fake.clone(), &Config::default(), Vec::new());
        let (handler, _, _) = counting_handler();

        mgr.start(spec_for(handler));
        settle().await; // connect attempt now parked on the gate

        mgr.stop();
        gate.add_permits(1); // let the stale connect win its handle
        settle().await;

        assert_eq!(mgr.phase(), Phase::Stopped);
        assert_eq!(fake.connect_count(), 1);
        assert_eq!(
            fake.release_count(),
            1,
            "a handle won after stop must be released, not stored"
        );
        assert!(mgr.shared.state.lock().live.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_ladder_then_terminal_giveup() {
        let fake = FakeRealtime::failing(u32::MAX);
        let mgr = SubscriptionManager::new(fake.clone(), &Config::default(), Vec::new());
        let (handler, _, _) = counting_handler();
        let mut rx = mgr.bus().subscribe();

        mgr.start(spec_for(handler));
        time::sleep(Duration::from_secs(30)).await;

        // initial attempt + 3 retries, then give up for good
        assert_eq!(fake.connect_count(), 4);
        assert_eq!(mgr.phase(), Phase::Stopped);
        {
            let st = mgr.shared.state.lock();
            assert!(st.connect.is_none(), "no timer may survive give-up");
            assert!(st.live.is_none());
        }

        let connects = fake.connects.lock();
        let deltas: Vec<Duration> = connects
            .windows(2)
            .map(|w| w[1].2.duration_since(w[0].2))
            .collect();
        assert_eq!(
            deltas,
            vec![
                Duration::from_secs(1),
                Duration::from_secs(2),
                Duration::from_secs(4),
            ]
        );

        let mut exhausted = 0;
        while let Ok(ev) = rx.try_recv() {
            if ev.kind == EventKind::RetriesExhausted {
                exhausted += 1;
                assert_eq!(ev.attempt, Some(4));
                assert_eq!(ev.topic.as_deref(), Some("logs"));
            }
        }
        assert_eq!(exhausted, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_after_failures_resets_budget() {
        let fake = FakeRealtime::failing(2);
        let mgr = SubscriptionManager::new(fake.clone(), &Config::default(), Vec::new());
        let (handler, _, _) = counting_handler();

        mgr.start(spec_for(handler));
        time::sleep(Duration::from_secs(10)).await;

        assert_eq!(fake.connect_count(), 3);
        assert_eq!(mgr.phase(), Phase::Active);
        assert_eq!(mgr.shared.state.lock().retry_attempt, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_debounce_coalesces_burst_into_one_call() {
        let fake = FakeRealtime::ok();
        let mgr = SubscriptionManager::new(fake.clone(), &Config::default(), Vec::new());
        let (handler, calls, at) = counting_handler();

        mgr.start(spec_for(handler)); // default debounce: 100ms
        settle().await;
        let signal = fake.signal(0);

        for _ in 0..4 {
            signal();
            time::sleep(Duration::from_millis(10)).await;
        }
        signal();
        let last_poke = Instant::now();
        time::sleep(Duration::from_millis(200)).await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        let fired = at.lock()[0];
        let gap = fired.duration_since(last_poke);
        assert!(
            gap >= Duration::from_millis(100) && gap < Duration::from_millis(110),
            "handler fired {gap:?} after the last poke"
        );
        assert!(mgr.shared.state.lock().debounce.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_debounce_delivers_synchronously() {
        let fake = FakeRealtime::ok();
        let mgr = SubscriptionManager::new(fake.clone(), &Config::default(), Vec::new());
        let (handler, calls, _) = counting_handler();

        mgr.start(spec_for(handler).with_debounce(Duration::ZERO));
        settle().await;
        let signal = fake.signal(0);

        for _ in 0..3 {
            signal();
        }

        // no yield needed: zero-window delivery is synchronous with the poke
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_race_keeps_only_newest_filter() {
        let gate = Arc::new(Semaphore::new(0));
        let fake = FakeRealtime::gated(gate.clone());
        let mgr = SubscriptionManager::new(fake.clone(), &Config::default(), Vec::new());
        let (handler, _, _) = counting_handler();

        mgr.start(spec_for(handler.clone()));
        settle().await;
        mgr.stop();
        mgr.start(WatchSpec::new("logs", "game_id=eq.8", handler));
        settle().await;

        gate.add_permits(2); // both generations' connects resolve
        settle().await;

        assert_eq!(mgr.phase(), Phase::Active);
        assert_eq!(fake.connect_count(), 2);
        {
            let connects = fake.connects.lock();
            assert_eq!(connects[0].1, "game_id=eq.7");
            assert_eq!(connects[1].1, "game_id=eq.8");
        }
        // the first generation's handle was released, the second is held
        assert_eq!(fake.release_count(), 1);
        assert!(mgr.shared.state.lock().live.is_some());

        mgr.stop();
        assert_eq!(fake.release_count(), 2, "no leaked handle from either start");
    }

    #[tokio::test(start_paused = true)]
    async fn test_disabled_spec_acts_as_stop() {
        let fake = FakeRealtime::ok();
        let mgr = SubscriptionManager::new(fake.clone(), &Config::default(), Vec::new());
        let (handler, _, _) = counting_handler();

        mgr.start(spec_for(handler.clone()));
        settle().await;
        assert_eq!(mgr.phase(), Phase::Active);

        mgr.start(spec_for(handler).with_enabled(false));

        assert_eq!(mgr.phase(), Phase::Stopped);
        assert_eq!(fake.connect_count(), 1, "disabled start must not connect");
        assert_eq!(fake.release_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_handler_failure_keeps_subscription_live() {
        let fake = FakeRealtime::ok();
        let mgr = SubscriptionManager::new(fake.clone(), &Config::default(), Vec::new());
        let mut rx = mgr.bus().subscribe();

        let handler = HandlerFn::arc(|| Err(SubscribeError::callback("refetch blew up")));
        mgr.start(spec_for(handler).with_debounce(Duration::ZERO));
        settle().await;

        fake.signal(0)();
        settle().await;

        assert_eq!(mgr.phase(), Phase::Active, "handler errors must not tear down");
        let mut saw_failure = false;
        while let Ok(ev) = rx.try_recv() {
            if ev.kind == EventKind::CallbackFailed {
                saw_failure = true;
                assert!(ev.reason.as_deref().unwrap_or("").contains("refetch blew up"));
            }
        }
        assert!(saw_failure);
    }

    #[tokio::test(start_paused = true)]
    async fn test_release_failure_still_reaches_stopped() {
        struct BrokenRelease;

        #[async_trait]
        impl Realtime for BrokenRelease {
            async fn connect(
                &self,
                _topic: &str,
                _filter: &str,
                _signal: ChangeSignal,
            ) -> Result<LiveHandle, SubscribeError> {
                Ok(LiveHandle::new(|| Err(SubscribeError::release("socket gone"))))
            }
        }

        let mgr = SubscriptionManager::new(
            Arc::new(BrokenRelease),
            &Config::default(),
            Vec::new(),
        );
        let mut rx = mgr.bus().subscribe();
        let (handler, _, _) = counting_handler();

        mgr.start(spec_for(handler));
        settle().await;
        mgr.stop();

        assert_eq!(mgr.phase(), Phase::Stopped);
        let mut saw_release_failure = false;
        while let Ok(ev) = rx.try_recv() {
            if ev.kind == EventKind::ReleaseFailed {
                saw_release_failure = true;
            }
        }
        assert!(saw_release_failure);
    }

    #[tokio::test(start_paused = true)]
    async fn test_giveup_is_restartable() {
        let fake = FakeRealtime::failing(4);
        let mgr = SubscriptionManager::new(fake.clone(), &Config::default(), Vec::new());
        let (handler, _, _) = counting_handler();

        mgr.start(spec_for(handler.clone()));
        time::sleep(Duration::from_secs(30)).await;
        assert_eq!(mgr.phase(), Phase::Stopped);
        assert_eq!(fake.connect_count(), 4);

        // an explicit start after give-up gets a fresh budget
        mgr.start(spec_for(handler));
        settle().await;
        assert_eq!(mgr.phase(), Phase::Active);
        assert_eq!(fake.connect_count(), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_handler_may_stop_reentrantly() {
        let fake = FakeRealtime::ok();
        let mgr = Arc::new(SubscriptionManager::new(
            fake.clone(),
            &Config::default(),
            Vec::new(),
        ));

        let mgr2 = Arc::clone(&mgr);
        let handler = HandlerFn::arc(move || {
            mgr2.stop();
            Ok(())
        });

        mgr.start(spec_for(handler).with_debounce(Duration::ZERO));
        settle().await;
        fake.signal(0)();

        assert_eq!(mgr.phase(), Phase::Stopped);
        assert_eq!(fake.release_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_debounce_does_not_fire_after_restart() {
        let fake = FakeRealtime::ok();
        let mgr = SubscriptionManager::new(fake.clone(), &Config::default(), Vec::new());
        let (handler, calls, _) = counting_handler();

        mgr.start(spec_for(handler.clone()));
        settle().await;
        fake.signal(0)(); // arms a 100ms window

        mgr.restart(spec_for(handler));
        time::sleep(Duration::from_millis(300)).await;

        assert_eq!(
            calls.load(Ordering::SeqCst),
            0,
            "a window armed before restart must never fire"
        );
        assert_eq!(mgr.phase(), Phase::Active);
    }
}
