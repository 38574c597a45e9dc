//! The state store subsystem.
//!
//! - [`StateHolder`]: conflated cell with the current state
//! - [`StateProcessor`]: ordered, single-writer job processor
//! - [`StateStore`]: façade over both with a combined lifecycle

mod context;
mod factory;
mod holder;
mod job;
mod lifecycle;
mod processor;
mod store;

pub use context::ExecutionContext;
pub use factory::{create_holder, create_processor, create_store, StoreBuilder};
pub use holder::{StateHolder, StateObserver};
pub use job::{ReadFuture, ReadJob, ReducerJob};
pub use processor::{ProcessorStats, StartMode, StateProcessor};
pub use store::StateStore;
