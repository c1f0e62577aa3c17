//! # Realtime transport abstraction and function-backed connector.
//!
//! This module defines the [`Realtime`] trait — the boundary between the
//! supervisor and whatever realtime backend actually carries change
//! notifications — and a convenient closure-backed implementation
//! [`RealtimeFn`]. The common handle type is [`RealtimeRef`], an
//! `Arc<dyn Realtime>` suitable for sharing across the runtime.
//!
//! A transport receives a [`ChangeSignal`] at connect time and invokes it
//! (from any thread) whenever the watched topic changes. The signal carries
//! no payload: the consumer re-fetches if it cares.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::SubscribeError;
use crate::transport::handle::LiveHandle;

/// Opaque "something changed" notification.
///
/// The transport may call this from any thread at any rate; the supervisor
/// coalesces bursts on its side. The signal must never block.
pub type ChangeSignal = Arc<dyn Fn() + Send + Sync>;

/// Shared handle to a realtime transport.
pub type RealtimeRef = Arc<dyn Realtime>;

/// # Asynchronous realtime transport.
///
/// A `Realtime` implementation knows how to open a filtered subscription on
/// a named topic. Connecting is asynchronous and may fail with a transport
/// error; the supervisor owns the retry schedule.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use subvisor::{ChangeSignal, LiveHandle, Realtime, SubscribeError};
///
/// struct AlwaysUp;
///
/// #[async_trait]
/// impl Realtime for AlwaysUp {
///     async fn connect(
///         &self,
///         _topic: &str,
///         _filter: &str,
///         _signal: ChangeSignal,
///     ) -> Result<LiveHandle, SubscribeError> {
///         Ok(LiveHandle::noop())
///     }
/// }
/// ```
#[async_trait]
pub trait Realtime: Send + Sync + 'static {
    /// Opens a live subscription on `topic`, narrowed by `filter`.
    ///
    /// The transport must invoke `signal` for every relevant change until
    /// the returned [`LiveHandle`] is released. `filter` is an opaque
    /// predicate string interpreted by the backend.
    ///
    /// # Errors
    /// Returns [`SubscribeError::Connect`] when the subscription could not
    /// be established; the supervisor retries per its backoff policy.
    async fn connect(
        &self,
        topic: &str,
        filter: &str,
        signal: ChangeSignal,
    ) -> Result<LiveHandle, SubscribeError>;
}

/// Function-backed transport implementation.
///
/// Wraps a closure that performs one connect per call. Handy for tests,
/// demos, and thin adapters over an existing client library.
///
/// ## Example
/// ```
/// use subvisor::{ChangeSignal, LiveHandle, RealtimeFn, RealtimeRef, SubscribeError};
///
/// let transport: RealtimeRef = RealtimeFn::arc(|_topic, _filter, _signal| async move {
///     Ok::<_, SubscribeError>(LiveHandle::noop())
/// });
/// ```
pub struct RealtimeFn<F> {
    f: F,
}

impl<F> RealtimeFn<F> {
    /// Creates a new function-backed transport.
    ///
    /// Prefer [`RealtimeFn::arc`] when you immediately need a [`RealtimeRef`].
    pub fn new(f: F) -> Self {
        Self { f }
    }

    /// Creates the transport and returns it as a shared handle (`Arc<dyn Realtime>`).
    pub fn arc<Fut>(f: F) -> Arc<Self>
    where
        F: Fn(String, String, ChangeSignal) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<LiveHandle, SubscribeError>> + Send + 'static,
    {
        Arc::new(Self::new(f))
    }
}

#[async_trait]
impl<F, Fut> Realtime for RealtimeFn<F>
where
    F: Fn(String, String, ChangeSignal) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<LiveHandle, SubscribeError>> + Send + 'static,
{
    async fn connect(
        &self,
        topic: &str,
        filter: &str,
        signal: ChangeSignal,
    ) -> Result<LiveHandle, SubscribeError> {
        (self.f)(topic.to_owned(), filter.to_owned(), signal).await
    }
}
