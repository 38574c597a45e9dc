//! Base trait for state held by a Vector store.

use std::fmt::Debug;

/// Marker trait for state objects.
///
/// States should be:
/// - Immutable (Clone to create new states)
/// - Self-contained (all data needed to render the view)
/// - Comparable (PartialEq for detecting changes)
///
/// `Send + Sync` is required because snapshots are handed to read-actions
/// running on other tasks.
pub trait VectorState: Clone + PartialEq + Debug + Send + Sync + 'static {}
