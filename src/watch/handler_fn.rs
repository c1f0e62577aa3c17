//! # Function-backed change handler (`HandlerFn`)
//!
//! [`HandlerFn`] wraps a closure `F: Fn() -> Result<(), SubscribeError>`,
//! the most common way to attach a "re-fetch now" hook without defining a
//! type. Shared state goes through an explicit `Arc<...>` inside the
//! closure.
//!
//! ## Example
//! ```rust
//! use subvisor::{Handler, HandlerFn, HandlerRef, SubscribeError};
//!
//! let h: HandlerRef = HandlerFn::arc(|| {
//!     // re-fetch...
//!     Ok::<_, SubscribeError>(())
//! });
//!
//! assert!(h.on_change().is_ok());
//! ```

use std::sync::Arc;

use crate::error::SubscribeError;
use crate::watch::handler::Handler;

/// Function-backed handler implementation.
pub struct HandlerFn<F> {
    f: F,
}

impl<F> HandlerFn<F> {
    /// Creates a new function-backed handler.
    ///
    /// Prefer [`HandlerFn::arc`] when you immediately need a [`HandlerRef`](crate::HandlerRef).
    pub fn new(f: F) -> Self {
        Self { f }
    }

    /// Creates the handler and returns it as a shared handle (`Arc<dyn Handler>`).
    pub fn arc(f: F) -> Arc<Self>
    where
        F: Fn() -> Result<(), SubscribeError> + Send + Sync + 'static,
    {
        Arc::new(Self::new(f))
    }
}

impl<F> Handler for HandlerFn<F>
where
    F: Fn() -> Result<(), SubscribeError> + Send + Sync + 'static,
{
    fn on_change(&self) -> Result<(), SubscribeError> {
        (self.f)()
    }
}
