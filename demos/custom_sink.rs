//! # Example: custom diagnostics sink
//!
//! Counts terminal give-ups next to the built-in tracing `LogSink`.
//! Run with: `cargo run --example custom_sink --features logging`

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use subvisor::{
    Config, Event, EventKind, HandlerFn, LogSink, RealtimeFn, Sink, SubscribeError,
    SubscriptionManager, WatchSpec,
};

/// Counts how often the supervisor gave up for good.
struct GiveUpCounter {
    giveups: AtomicU32,
}

#[async_trait]
impl Sink for GiveUpCounter {
    async fn on_event(&self, ev: &Event) {
        if matches!(ev.kind, EventKind::RetriesExhausted) {
            let n = self.giveups.fetch_add(1, Ordering::SeqCst) + 1;
            println!("[give-up-counter] terminal give-up #{n} on {:?}", ev.topic.as_deref());
        }
    }

    fn name(&self) -> &'static str {
        "give-up-counter"
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_target(false).init();

    // A backend that is simply down.
    let transport = RealtimeFn::arc(|_topic, _filter, _signal| async move {
        Err::<subvisor::LiveHandle, _>(SubscribeError::connect("backend down"))
    });

    let counter = Arc::new(GiveUpCounter {
        giveups: AtomicU32::new(0),
    });
    let sinks: Vec<Arc<dyn Sink>> = vec![Arc::new(LogSink::new()), counter.clone()];
    let manager = SubscriptionManager::new(transport, &Config::default(), sinks);

    // Shrink the ladder so the demo ends quickly.
    let spec = WatchSpec::new("logs", "", HandlerFn::arc(|| Ok(())))
        .with_max_retries(2)
        .with_backoff(subvisor::BackoffPolicy {
            first: Duration::from_millis(100),
            max: Duration::from_millis(400),
            factor: 2.0,
            jitter: subvisor::JitterPolicy::None,
        });

    manager.start(spec);
    tokio::time::sleep(Duration::from_secs(1)).await;

    println!("give-ups observed: {}", counter.giveups.load(Ordering::SeqCst));
    manager.stop();
    Ok(())
}
