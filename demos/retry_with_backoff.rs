//! # Example: reconnect with backoff
//!
//! The fake backend refuses the first two connects; the supervisor retries
//! at 1s and 2s before going live. Watch the bus to see the ladder.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use subvisor::{
    Config, EventKind, HandlerFn, LiveHandle, RealtimeFn, SubscribeError, SubscriptionManager,
    WatchSpec,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let attempts = Arc::new(AtomicU32::new(0));

    let counter = attempts.clone();
    let transport = RealtimeFn::arc(move |_topic, _filter, _signal| {
        let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
        async move {
            if n <= 2 {
                Err(SubscribeError::connect(format!("refused (attempt {n})")))
            } else {
                Ok(LiveHandle::noop())
            }
        }
    });

    let manager = SubscriptionManager::new(transport, &Config::default(), Vec::new());
    let mut rx = manager.bus().subscribe();

    manager.start(WatchSpec::new(
        "logs",
        "",
        HandlerFn::arc(|| Ok(())),
    ));

    // Print lifecycle events until the subscription goes live.
    loop {
        let ev = rx.recv().await?;
        match ev.kind {
            EventKind::ConnectStarting => {
                println!("[event] connect starting, attempt {:?}", ev.attempt);
            }
            EventKind::ConnectFailed => {
                println!("[event] connect failed: {:?}", ev.reason.as_deref());
            }
            EventKind::RetryScheduled => {
                println!("[event] retry in {:?}ms", ev.delay_ms);
            }
            EventKind::Connected => {
                println!("[event] connected on attempt {:?}", ev.attempt);
                break;
            }
            _ => {}
        }
    }

    manager.stop();
    Ok(())
}
