//! The subscription request and the consumer's side of the contract.
//!
//! - [`WatchSpec`]: what to watch (topic + filter) and how (retry budget,
//!   backoff, debounce, enabled switch).
//! - [`Handler`] / [`HandlerFn`]: the fallible "something changed" callback.

mod handler;
mod handler_fn;
mod spec;

pub use handler::{Handler, HandlerRef};
pub use handler_fn::HandlerFn;
pub use spec::WatchSpec;
