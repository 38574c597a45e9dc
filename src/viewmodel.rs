//! Host object owning one store for the lifetime of a screen or component.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::StoreResult;
use crate::logger::LoggerExt;
use crate::mvi::{Reducer, VectorState};
use crate::state::{create_store, ExecutionContext, StateObserver, StateStore};

/// Base host for Vector state.
///
/// Owns a [`StateStore`] and clears it exactly once, either through
/// [`on_cleared`](Self::on_cleared) or when dropped.
///
/// ```no_run
/// use vector_state::{ExecutionContext, VectorState, VectorViewModel};
///
/// #[derive(Debug, Clone, PartialEq)]
/// struct CounterState { count: i32 }
/// impl VectorState for CounterState {}
///
/// # async fn demo() {
/// let context = ExecutionContext::current().unwrap();
/// let view_model = VectorViewModel::new(CounterState { count: 0 }, context);
/// view_model.set_state(|s| CounterState { count: s.count + 1 });
/// view_model.with_state(|s| async move { println!("count = {}", s.count) });
/// # }
/// ```
pub struct VectorViewModel<S: VectorState> {
    store: StateStore<S>,
    cleared: AtomicBool,
}

impl<S: VectorState> VectorViewModel<S> {
    /// Create a view model with an eagerly started store on `context`.
    pub fn new(initial_state: S, context: ExecutionContext) -> Self {
        Self::with_store(create_store(initial_state, context))
    }

    /// Wrap a store built elsewhere (custom logger, lazy start, config).
    pub fn with_store(store: StateStore<S>) -> Self {
        Self {
            store,
            cleared: AtomicBool::new(false),
        }
    }

    /// The only sanctioned way to change state: enqueue a reducer.
    pub fn set_state(&self, reducer: impl FnOnce(&S) -> S + Send + 'static) {
        self.store.set_state(reducer);
    }

    /// Run `action` against state that reflects every reducer enqueued so far.
    pub fn with_state<F, Fut>(&self, action: F)
    where
        F: FnOnce(S) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.store.with_state(action);
    }

    /// Enqueue `intent` as a reducer job handled by `R`.
    pub fn dispatch<R>(&self, intent: R::Intent)
    where
        R: Reducer<State = S>,
    {
        self.store
            .set_state(move |state| R::reduce(state.clone(), intent));
    }

    /// The latest published state. Queued reducers are not reflected.
    pub fn current_state(&self) -> StoreResult<S> {
        self.store.current_state()
    }

    /// Subscribe to state updates.
    pub fn state(&self) -> StateObserver<S> {
        self.store.observable_state()
    }

    pub fn store(&self) -> &StateStore<S> {
        &self.store
    }

    /// Clear the store. Only the first call has an effect.
    pub fn on_cleared(&self) {
        if !self.cleared.swap(true, Ordering::SeqCst) {
            self.store
                .logger()
                .logd(|| "Clearing ViewModel".to_string());
            self.store.clear();
        }
    }

    pub fn is_cleared(&self) -> bool {
        self.cleared.load(Ordering::SeqCst)
    }
}

impl<S: VectorState> Drop for VectorViewModel<S> {
    fn drop(&mut self) {
        self.on_cleared();
    }
}

/// Run `block` synchronously on the view model's current state.
///
/// Unlike [`VectorViewModel::with_state`] this does not wait behind queued
/// reducers.
pub fn with_state<S, R>(view_model: &VectorViewModel<S>, block: impl FnOnce(&S) -> R) -> StoreResult<R>
where
    S: VectorState,
{
    let state = view_model.current_state()?;
    Ok(block(&state))
}
