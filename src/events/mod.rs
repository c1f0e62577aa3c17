//! Supervisor lifecycle events and the broadcast bus that carries them.
//!
//! Every observable action of the supervisor — connect attempts, retries,
//! the terminal give-up, callback and release failures — is published as an
//! [`Event`] on the [`Bus`]. Diagnostics sinks consume these events; nothing
//! in this module can fail past the supervisor's boundary.

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
