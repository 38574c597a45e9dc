//! Base trait for intents (user/system actions).

/// Marker trait for intent objects.
///
/// Intents represent:
/// - User actions (button clicks, key presses)
/// - System events (responses, timers)
///
/// Intents are turned into reducer jobs by
/// [`VectorViewModel::dispatch`](crate::viewmodel::VectorViewModel::dispatch).
pub trait Intent: Send + 'static {}
