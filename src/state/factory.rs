//! Construction of holders, processors and stores.
//!
//! Everything is wired through explicit arguments; there is no lookup of
//! factories at runtime.

use std::sync::Arc;

use crate::config::StoreConfig;
use crate::error::StoreResult;
use crate::logger::{default_logger, SharedLogger};
use crate::mvi::VectorState;
use crate::state::context::ExecutionContext;
use crate::state::holder::StateHolder;
use crate::state::processor::{StartMode, StateProcessor};
use crate::state::store::StateStore;

/// Create an eagerly started store on `context` with the default logger.
pub fn create_store<S: VectorState>(initial_state: S, context: ExecutionContext) -> StateStore<S> {
    let logger = default_logger();
    let holder = create_holder(initial_state, Arc::clone(&logger));
    let processor = create_processor(Arc::clone(&holder), Arc::clone(&logger), context);
    StateStore::from_parts(holder, processor, logger)
}

/// Create a holder seeded with `initial_state`.
pub fn create_holder<S: VectorState>(initial_state: S, logger: SharedLogger) -> Arc<StateHolder<S>> {
    Arc::new(StateHolder::new(initial_state, logger))
}

/// Create an eagerly started processor over `holder`.
pub fn create_processor<S: VectorState>(
    holder: Arc<StateHolder<S>>,
    logger: SharedLogger,
    context: ExecutionContext,
) -> StateProcessor<S> {
    StateProcessor::new(holder, logger, context, StartMode::Eager)
}

/// Step-by-step configuration of a [`StateStore`].
pub struct StoreBuilder<S: VectorState> {
    initial_state: Option<S>,
    logger: Option<SharedLogger>,
    start_mode: StartMode,
    context: Option<ExecutionContext>,
}

impl<S: VectorState> StoreBuilder<S> {
    pub fn new(initial_state: S) -> Self {
        Self {
            initial_state: Some(initial_state),
            logger: None,
            start_mode: StartMode::Eager,
            context: None,
        }
    }

    /// A builder whose holder starts empty. Publish a state through
    /// [`StateStore::holder`] before any job or read touches it.
    pub fn uninitialized() -> Self {
        Self {
            initial_state: None,
            logger: None,
            start_mode: StartMode::Eager,
            context: None,
        }
    }

    pub fn logger(mut self, logger: SharedLogger) -> Self {
        self.logger = Some(logger);
        self
    }

    pub fn start_mode(mut self, start_mode: StartMode) -> Self {
        self.start_mode = start_mode;
        self
    }

    pub fn context(mut self, context: ExecutionContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Apply the start mode and logging settings from `config`.
    pub fn config(mut self, config: &StoreConfig) -> Self {
        self.start_mode = config.start_mode;
        self.logger = Some(config.logging.build_logger());
        self
    }

    /// Build the store.
    ///
    /// # Errors
    /// [`StoreError::NoRuntime`](crate::error::StoreError::NoRuntime) when no
    /// context was given and the caller is outside a tokio runtime.
    pub fn build(self) -> StoreResult<StateStore<S>> {
        let context = match self.context {
            Some(context) => context,
            None => ExecutionContext::current()?,
        };
        let logger = self.logger.unwrap_or_else(default_logger);
        let holder = Arc::new(match self.initial_state {
            Some(state) => StateHolder::new(state, Arc::clone(&logger)),
            None => StateHolder::uninitialized(Arc::clone(&logger)),
        });
        let processor = StateProcessor::new(
            Arc::clone(&holder),
            Arc::clone(&logger),
            context,
            self.start_mode,
        );
        Ok(StateStore::from_parts(holder, processor, logger))
    }
}
