//! # Owned unsubscribe capability for a live subscription.
//!
//! [`LiveHandle`] wraps the release closure handed back by a realtime
//! transport on a successful connect. Ownership makes the release semantics
//! structural: the handle can be released at most once, because
//! [`LiveHandle::release`] consumes it.

use std::fmt;

use crate::error::SubscribeError;

/// Release closure stored inside a [`LiveHandle`].
type ReleaseFn = Box<dyn FnOnce() -> Result<(), SubscribeError> + Send>;

/// Owned unsubscribe capability returned by a successful connect.
///
/// The supervisor holds at most one of these at a time and releases it on
/// stop/restart. Release is synchronous and must be treated as fallible:
/// the transport may raise while tearing the subscription down.
pub struct LiveHandle {
    release: ReleaseFn,
}

impl LiveHandle {
    /// Wraps a release closure provided by the transport.
    pub fn new(release: impl FnOnce() -> Result<(), SubscribeError> + Send + 'static) -> Self {
        Self {
            release: Box::new(release),
        }
    }

    /// Creates a handle whose release always succeeds.
    ///
    /// Useful for tests and in-memory transports.
    pub fn noop() -> Self {
        Self::new(|| Ok(()))
    }

    /// Releases the live subscription, consuming the handle.
    ///
    /// # Errors
    /// Propagates the transport's release failure. Callers inside the
    /// supervisor report this as a [`ReleaseFailed`](crate::EventKind::ReleaseFailed)
    /// event and continue teardown.
    pub fn release(self) -> Result<(), SubscribeError> {
        (self.release)()
    }
}

impl fmt::Debug for LiveHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LiveHandle").finish_non_exhaustive()
    }
}
