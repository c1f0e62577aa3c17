//! Error types used by the subscription supervisor.
//!
//! A single enum, [`SubscribeError`], covers every failure the supervisor can
//! observe:
//!
//! - [`SubscribeError::Connect`] — a connect attempt failed; retried with backoff.
//! - [`SubscribeError::Exhausted`] — the retry budget ran out; terminal give-up.
//! - [`SubscribeError::Callback`] — the consumer's change handler failed.
//! - [`SubscribeError::Release`] — releasing a live handle failed during teardown.
//!
//! Helper methods (`as_label`, `as_message`) produce stable strings for
//! logs/metrics, and [`SubscribeError::is_retryable`] tells the retry loop
//! which failures are worth another attempt.

use thiserror::Error;

/// # Errors observed while supervising a subscription.
///
/// None of these ever escape the supervisor as an unhandled fault: connect
/// failures are retried, callback and release failures are reported to the
/// diagnostics bus, and an exhausted retry budget becomes a terminal
/// give-up state.
#[non_exhaustive]
#[derive(Error, Debug, Clone)]
pub enum SubscribeError {
    /// A connect attempt against the realtime transport failed.
    #[error("connect failed: {error}")]
    Connect {
        /// The underlying transport error message.
        error: String,
    },

    /// Consecutive connect failures exceeded the retry budget.
    #[error("retries exhausted after {attempts} attempts: {error}")]
    Exhausted {
        /// Total consecutive failed attempts (including the first connect).
        attempts: u32,
        /// The last transport error message observed.
        error: String,
    },

    /// The consumer's change handler returned an error (or panicked).
    #[error("change handler failed: {error}")]
    Callback {
        /// The handler's error message or panic payload.
        error: String,
    },

    /// Releasing the live subscription handle failed.
    #[error("release failed: {error}")]
    Release {
        /// The underlying transport error message.
        error: String,
    },
}

impl SubscribeError {
    /// Creates a [`SubscribeError::Connect`] from a message.
    pub fn connect(error: impl Into<String>) -> Self {
        SubscribeError::Connect {
            error: error.into(),
        }
    }

    /// Creates a [`SubscribeError::Callback`] from a message.
    pub fn callback(error: impl Into<String>) -> Self {
        SubscribeError::Callback {
            error: error.into(),
        }
    }

    /// Creates a [`SubscribeError::Release`] from a message.
    pub fn release(error: impl Into<String>) -> Self {
        SubscribeError::Release {
            error: error.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use subvisor::SubscribeError;
    ///
    /// let err = SubscribeError::connect("refused");
    /// assert_eq!(err.as_label(), "connect_failed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            SubscribeError::Connect { .. } => "connect_failed",
            SubscribeError::Exhausted { .. } => "retries_exhausted",
            SubscribeError::Callback { .. } => "callback_failed",
            SubscribeError::Release { .. } => "release_failed",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            SubscribeError::Connect { error } => format!("connect: {error}"),
            SubscribeError::Exhausted { attempts, error } => {
                format!("exhausted after {attempts} attempts: {error}")
            }
            SubscribeError::Callback { error } => format!("callback: {error}"),
            SubscribeError::Release { error } => format!("release: {error}"),
        }
    }

    /// Indicates whether the error type is safe to retry.
    ///
    /// Only [`SubscribeError::Connect`] is retryable; everything else is
    /// either terminal or already handled in place.
    ///
    /// # Example
    /// ```
    /// use subvisor::SubscribeError;
    ///
    /// assert!(SubscribeError::connect("boom").is_retryable());
    /// assert!(!SubscribeError::release("boom").is_retryable());
    /// ```
    pub fn is_retryable(&self) -> bool {
        matches!(self, SubscribeError::Connect { .. })
    }
}
