//! Typed jobs accepted by the state processor.

use std::future::Future;
use std::pin::Pin;

/// Future returned by a read-action.
pub type ReadFuture = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// A state reducer: produces the next state from the current one.
///
/// Its return value is the only way it can change state. It may enqueue
/// further jobs on the same store while running.
pub struct ReducerJob<S> {
    reducer: Box<dyn FnOnce(&S) -> S + Send + 'static>,
}

impl<S> ReducerJob<S> {
    pub fn new(reducer: impl FnOnce(&S) -> S + Send + 'static) -> Self {
        Self {
            reducer: Box::new(reducer),
        }
    }

    pub fn apply(self, state: &S) -> S {
        (self.reducer)(state)
    }
}

/// A side effect run against a state snapshot. Never changes state.
pub struct ReadJob<S> {
    action: Box<dyn FnOnce(S) -> ReadFuture + Send + 'static>,
}

impl<S> ReadJob<S> {
    pub fn new<F, Fut>(action: F) -> Self
    where
        F: FnOnce(S) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        Self {
            action: Box::new(move |state| Box::pin(action(state)) as ReadFuture),
        }
    }

    /// Bind the snapshot and return the future to spawn.
    pub fn run(self, snapshot: S) -> ReadFuture {
        (self.action)(snapshot)
    }
}

/// Either kind of job, in the order the processor picked it.
pub(crate) enum Job<S> {
    Reduce(ReducerJob<S>),
    Read(ReadJob<S>),
}
