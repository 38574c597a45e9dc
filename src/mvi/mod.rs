//! Model-View-Intent (MVI) primitives.
//!
//! This module provides the base traits every Vector state container is
//! built on.
//!
//! # Architecture
//!
//! ```text
//! Intent ──→ Reducer ──→ StateStore ──→ StateObserver
//!    ↑                                       │
//!    └───────────────────────────────────────┘
//! ```
//!
//! - **State**: Immutable value describing everything a view needs
//! - **Intent**: User actions or system events
//! - **Reducer**: Pure function that transforms state based on intents

mod intent;
mod reducer;
mod state;

pub use intent::Intent;
pub use reducer::Reducer;
pub use state::VectorState;
