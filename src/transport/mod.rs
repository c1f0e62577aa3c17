//! The boundary to the external realtime backend.
//!
//! The supervisor never talks to a concrete backend; it sees only the
//! [`Realtime`] trait (open a filtered subscription, get back an owned
//! [`LiveHandle`]) and delivers a payload-free [`ChangeSignal`] to be poked
//! on every relevant change.

mod handle;
mod realtime;

pub use handle::LiveHandle;
pub use realtime::{ChangeSignal, Realtime, RealtimeFn, RealtimeRef};
