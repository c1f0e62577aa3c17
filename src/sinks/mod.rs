//! Diagnostics sinks: where supervisor events end up.
//!
//! The manager publishes [`Event`](crate::events::Event)s on its bus; a
//! [`SinkSet`] fans them out to user-provided [`Sink`]s with per-sink
//! queues and panic isolation. The optional [`LogSink`] (feature `logging`)
//! renders events through `tracing`.

#[cfg(feature = "logging")]
mod log;
mod set;
mod sink;

#[cfg(feature = "logging")]
pub use log::LogSink;
pub use set::SinkSet;
pub use sink::Sink;
