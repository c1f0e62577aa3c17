//! # Watch specification for supervised subscriptions.
//!
//! Defines [`WatchSpec`] — a configuration bundle that describes one
//! subscription request (topic, filter, handler) together with its retry and
//! coalescing knobs.
//!
//! A spec can be created:
//! - **Explicitly** with [`WatchSpec::new`] (crate defaults for the knobs)
//! - **From config** with [`WatchSpec::with_defaults`] (inherit [`Config`] defaults)
//!
//! ## Rules
//! - The spec is immutable for the lifetime of a start; changing topic,
//!   filter, or options means restarting the manager with a new spec.

use std::sync::Arc;
use std::time::Duration;

use crate::{config::Config, policies::BackoffPolicy, watch::handler::HandlerRef};

/// Specification for one supervised subscription.
///
/// Bundles together:
/// - The watched `topic` and opaque `filter` predicate
/// - The consumer's change handler ([`HandlerRef`])
/// - Retry budget and backoff policy
/// - Debounce window (`Duration::ZERO` = no coalescing)
/// - The `enabled` switch (`false` makes `start` act as `stop`)
///
/// ## Example
/// ```rust
/// use std::time::Duration;
/// use subvisor::{Config, HandlerFn, SubscribeError, WatchSpec};
///
/// let handler = HandlerFn::arc(|| Ok::<_, SubscribeError>(()));
///
/// // Explicit configuration:
/// let spec = WatchSpec::new("logs", "game_id=eq.7", handler.clone())
///     .with_max_retries(5)
///     .with_debounce(Duration::from_millis(250));
/// assert_eq!(spec.topic(), "logs");
///
/// // Inherit from config:
/// let cfg = Config::default();
/// let spec2 = WatchSpec::with_defaults("logs", "game_id=eq.7", handler, &cfg);
/// assert_eq!(spec2.max_retries(), 3);
/// ```
#[derive(Clone)]
pub struct WatchSpec {
    topic: Arc<str>,
    filter: Arc<str>,
    handler: HandlerRef,
    max_retries: u32,
    backoff: BackoffPolicy,
    debounce: Duration,
    enabled: bool,
}

impl WatchSpec {
    /// Creates a new watch specification with crate-default knobs.
    ///
    /// ### Parameters
    /// - `topic`: identifier of the remote data set being watched
    /// - `filter`: opaque predicate string interpreted by the transport
    /// - `handler`: consumer callback invoked per delivered notification
    pub fn new(
        topic: impl Into<Arc<str>>,
        filter: impl Into<Arc<str>>,
        handler: HandlerRef,
    ) -> Self {
        Self::with_defaults(topic, filter, handler, &Config::default())
    }

    /// Creates a watch specification inheriting defaults from config.
    ///
    /// ### Parameters
    /// - `topic` / `filter` / `handler`: the subscription request
    /// - `cfg`: config to inherit retry/debounce/enabled defaults from
    pub fn with_defaults(
        topic: impl Into<Arc<str>>,
        filter: impl Into<Arc<str>>,
        handler: HandlerRef,
        cfg: &Config,
    ) -> Self {
        Self {
            topic: topic.into(),
            filter: filter.into(),
            handler,
            max_retries: cfg.max_retries,
            backoff: cfg.backoff,
            debounce: cfg.debounce,
            enabled: cfg.enabled,
        }
    }

    /// Returns the watched topic.
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Returns the opaque filter predicate.
    pub fn filter(&self) -> &str {
        &self.filter
    }

    /// Returns the shared change handler.
    pub fn handler(&self) -> &HandlerRef {
        &self.handler
    }

    /// Returns the retry budget (consecutive connect failures tolerated).
    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Returns the backoff policy.
    pub fn backoff(&self) -> BackoffPolicy {
        self.backoff
    }

    /// Returns the debounce window (`Duration::ZERO` = no coalescing).
    pub fn debounce(&self) -> Duration {
        self.debounce
    }

    /// Returns whether this watch is enabled.
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Returns the topic as a cheap shared string.
    pub(crate) fn topic_arc(&self) -> Arc<str> {
        self.topic.clone()
    }

    /// Returns the filter as a cheap shared string.
    pub(crate) fn filter_arc(&self) -> Arc<str> {
        self.filter.clone()
    }

    /// Returns a new spec with an updated retry budget.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Returns a new spec with an updated backoff policy.
    pub fn with_backoff(mut self, backoff: BackoffPolicy) -> Self {
        self.backoff = backoff;
        self
    }

    /// Returns a new spec with an updated debounce window.
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// Returns a new spec with the enabled switch flipped.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::watch::handler_fn::HandlerFn;

    #[test]
    fn test_new_inherits_crate_defaults() {
        let spec = WatchSpec::new("logs", "", HandlerFn::arc(|| Ok(())));
        assert_eq!(spec.max_retries(), 3);
        assert_eq!(spec.debounce(), Duration::from_millis(100));
        assert!(spec.enabled());
    }

    #[test]
    fn test_builders_override_knobs() {
        let spec = WatchSpec::new("logs", "", HandlerFn::arc(|| Ok(())))
            .with_max_retries(0)
            .with_debounce(Duration::ZERO)
            .with_enabled(false);
        assert_eq!(spec.max_retries(), 0);
        assert_eq!(spec.debounce(), Duration::ZERO);
        assert!(!spec.enabled());
    }
}
