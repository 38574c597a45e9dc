//! Vector: a unidirectional (MVI) state container.
//!
//! A [`StateStore`] serializes reducers and read-actions for one state value
//! through a single driver task, and publishes every new state through a
//! conflated [`StateObserver`].

pub mod bench;
pub mod config;
pub mod error;
pub mod logger;
pub mod mvi;
pub mod state;
pub mod viewmodel;

pub use error::{StoreError, StoreResult};
pub use mvi::{Intent, Reducer, VectorState};
pub use state::{
    create_store, ExecutionContext, ProcessorStats, StartMode, StateHolder, StateObserver,
    StateProcessor, StateStore, StoreBuilder,
};
pub use viewmodel::{with_state, VectorViewModel};
