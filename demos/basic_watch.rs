//! # Example: basic watch over an in-memory transport
//!
//! A fake backend fires a burst of change notifications; the 100ms debounce
//! window collapses them into a single re-fetch.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use subvisor::{
    ChangeSignal, Config, HandlerFn, LiveHandle, RealtimeFn, SubscribeError, SubscriptionManager,
    WatchSpec,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Stash the signal so we can poke it like a backend would.
    let signals: Arc<Mutex<Vec<ChangeSignal>>> = Arc::new(Mutex::new(Vec::new()));

    let stash = signals.clone();
    let transport = RealtimeFn::arc(move |topic, _filter, signal| {
        let stash = stash.clone();
        async move {
            println!("[transport] subscribed to {topic}");
            stash.lock().push(signal);
            Ok::<_, SubscribeError>(LiveHandle::new(move || {
                println!("[transport] unsubscribed");
                Ok(())
            }))
        }
    });

    let manager = SubscriptionManager::new(transport, &Config::default(), Vec::new());

    let spec = WatchSpec::new(
        "logs",
        "game_id=eq.7",
        HandlerFn::arc(|| {
            println!("[consumer] something changed, re-fetching");
            Ok(())
        }),
    )
    .with_debounce(Duration::from_millis(100));

    manager.start(spec);
    tokio::time::sleep(Duration::from_millis(50)).await;

    // A burst of five changes ends up as one re-fetch.
    let signal = signals.lock()[0].clone();
    for _ in 0..5 {
        signal();
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    tokio::time::sleep(Duration::from_millis(200)).await;
    manager.stop();
    Ok(())
}
