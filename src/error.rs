//! Error types for the state store.

use thiserror::Error;

/// Errors surfaced by the state store.
///
/// Enqueuing after `clear()` is intentionally not represented here: those jobs
/// are dropped silently.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// State was read before any value was ever published.
    #[error("StateHolder was not created with a state value. Publish an initial state before reading it")]
    Uninitialized,

    /// No tokio runtime was available to build an execution context.
    #[error("No tokio runtime available: {0}")]
    NoRuntime(String),

    /// `drain()` was called while the driver loop owns the queues.
    #[error("StateProcessor is already running; drain() only works before start()")]
    AlreadyStarted,

    /// A reducer panicked while being drained.
    #[error("Reducer panicked: {message}")]
    ReducerPanicked { message: String },

    /// A read-action panicked while being drained.
    #[error("Read-action panicked: {message}")]
    ReadActionPanicked { message: String },
}

/// Convenience alias used throughout the crate.
pub type StoreResult<T> = Result<T, StoreError>;

/// Extract a printable message from a panic payload.
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn panic_message_handles_str_and_string() {
        let payload: Box<dyn std::any::Any + Send> = Box::new("boom");
        assert_eq!(panic_message(payload.as_ref()), "boom");

        let payload: Box<dyn std::any::Any + Send> = Box::new(format!("code {}", 7));
        assert_eq!(panic_message(payload.as_ref()), "code 7");

        let payload: Box<dyn std::any::Any + Send> = Box::new(42u8);
        assert_eq!(panic_message(payload.as_ref()), "unknown panic payload");
    }

    #[test]
    fn reducer_panicked_display() {
        let err = StoreError::ReducerPanicked {
            message: "bad".to_string(),
        };
        assert_eq!(err.to_string(), "Reducer panicked: bad");
    }
}
