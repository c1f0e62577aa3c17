//! Retry policies for the subscription supervisor.
//!
//! - [`BackoffPolicy`]: how reconnect delays grow after consecutive failures.
//! - [`JitterPolicy`]: optional randomization of those delays.
//!
//! Both are pure value types: computing a delay never touches the scheduler,
//! which keeps the retry schedule independently testable.

mod backoff;
mod jitter;

pub use backoff::BackoffPolicy;
pub use jitter::JitterPolicy;
