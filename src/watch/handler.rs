//! # Change handler abstraction.
//!
//! This module defines the [`Handler`] trait — the consumer's callback for
//! "the watched topic changed, re-fetch if you care". The common handle type
//! is [`HandlerRef`], an `Arc<dyn Handler>` suitable for sharing across the
//! runtime.
//!
//! Handlers are treated as untrusted: errors (and panics) are captured and
//! reported to the diagnostics bus without tearing the subscription down.

use std::sync::Arc;

use crate::error::SubscribeError;

/// Shared handle to a change handler.
pub type HandlerRef = Arc<dyn Handler>;

/// # Synchronous, fallible change callback.
///
/// Invoked once per delivered notification — after debouncing, a single call
/// means "at least one change occurred; state may have moved further since".
/// The supervisor never holds an internal lock while calling it, so a
/// handler may safely call back into
/// [`SubscriptionManager::stop`](crate::SubscriptionManager::stop).
///
/// # Example
/// ```
/// use subvisor::{Handler, SubscribeError};
///
/// struct Refresh;
///
/// impl Handler for Refresh {
///     fn on_change(&self) -> Result<(), SubscribeError> {
///         // queue a re-fetch...
///         Ok(())
///     }
/// }
/// ```
pub trait Handler: Send + Sync + 'static {
    /// Reacts to a change notification.
    ///
    /// # Errors
    /// Returning an error reports a
    /// [`CallbackFailed`](crate::EventKind::CallbackFailed) event; the
    /// subscription itself stays live.
    fn on_change(&self) -> Result<(), SubscribeError>;
}
