//! Façade binding one holder and one processor under a single handle.

use std::future::Future;
use std::sync::Arc;

use crate::error::StoreResult;
use crate::logger::{LoggerExt, SharedLogger};
use crate::mvi::VectorState;
use crate::state::factory::StoreBuilder;
use crate::state::holder::{StateHolder, StateObserver};
use crate::state::processor::{ProcessorStats, StateProcessor};

/// Holds the current state and handles every job performed on it.
///
/// Cheap to clone: all clones share the same holder and processor, so a
/// reducer can capture a clone and enqueue follow-up jobs.
pub struct StateStore<S: VectorState> {
    holder: Arc<StateHolder<S>>,
    processor: StateProcessor<S>,
    logger: SharedLogger,
}

impl<S: VectorState> Clone for StateStore<S> {
    fn clone(&self) -> Self {
        Self {
            holder: Arc::clone(&self.holder),
            processor: self.processor.clone(),
            logger: Arc::clone(&self.logger),
        }
    }
}

impl<S: VectorState> StateStore<S> {
    /// Start configuring a store seeded with `initial_state`.
    pub fn builder(initial_state: S) -> StoreBuilder<S> {
        StoreBuilder::new(initial_state)
    }

    /// Compose an existing holder and processor.
    ///
    /// `processor` must have been created over `holder`.
    pub fn from_parts(
        holder: Arc<StateHolder<S>>,
        processor: StateProcessor<S>,
        logger: SharedLogger,
    ) -> Self {
        Self {
            holder,
            processor,
            logger,
        }
    }

    /// Enqueue a reducer. Reducers are applied one at a time, in FIFO order.
    pub fn set_state(&self, reducer: impl FnOnce(&S) -> S + Send + 'static) {
        self.processor.offer_reducer(reducer);
    }

    /// Enqueue a read-action that sees every reducer enqueued before it.
    pub fn with_state<F, Fut>(&self, action: F)
    where
        F: FnOnce(S) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.processor.offer_read(action);
    }

    /// The latest published state.
    ///
    /// Reducers still waiting in the queue are not reflected; use
    /// [`with_state`](Self::with_state) for an ordered read.
    pub fn current_state(&self) -> StoreResult<S> {
        self.holder.current_state()
    }

    /// Subscribe to conflated state updates.
    pub fn observable_state(&self) -> StateObserver<S> {
        self.holder.observe()
    }

    /// Start a lazily created store.
    pub fn start(&self) {
        self.processor.start();
    }

    /// See [`StateProcessor::drain`].
    pub async fn drain(&self) -> StoreResult<()> {
        self.processor.drain().await
    }

    /// Release everything this store holds. Idempotent.
    ///
    /// The processor is torn down before the holder so no reducer runs
    /// against a closed holder.
    pub fn clear(&self) {
        if !self.processor.is_cleared() {
            self.logger.logd(|| "Clearing State Store".to_string());
        }
        self.processor.teardown();
        self.holder.teardown();
    }

    pub fn is_cleared(&self) -> bool {
        self.processor.is_cleared() && self.holder.is_cleared()
    }

    pub fn stats(&self) -> ProcessorStats {
        self.processor.stats()
    }

    pub fn holder(&self) -> &Arc<StateHolder<S>> {
        &self.holder
    }

    pub fn processor(&self) -> &StateProcessor<S> {
        &self.processor
    }

    pub fn logger(&self) -> &SharedLogger {
        &self.logger
    }
}
