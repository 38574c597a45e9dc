//! The single source of truth for "what is the current state".

use tokio::sync::watch;

use crate::error::{StoreError, StoreResult};
use crate::logger::{LoggerExt, SharedLogger};
use crate::mvi::VectorState;
use crate::state::lifecycle::ClearSignal;

/// Holds the current state in a conflated, single-slot cell.
///
/// The holder stores and broadcasts values; it never decides when an update
/// is accepted. All ordering lives in the processor.
pub struct StateHolder<S: VectorState> {
    sender: watch::Sender<Option<S>>,
    cleared: ClearSignal,
    logger: SharedLogger,
}

impl<S: VectorState> StateHolder<S> {
    /// Create a holder seeded with `initial_state`.
    pub fn new(initial_state: S, logger: SharedLogger) -> Self {
        let (sender, _) = watch::channel(Some(initial_state));
        Self {
            sender,
            cleared: ClearSignal::new(),
            logger,
        }
    }

    /// Create a holder with no state yet.
    ///
    /// A state must be published before [`current_state`](Self::current_state)
    /// is called, otherwise it fails with [`StoreError::Uninitialized`].
    pub fn uninitialized(logger: SharedLogger) -> Self {
        let (sender, _) = watch::channel(None);
        Self {
            sender,
            cleared: ClearSignal::new(),
            logger,
        }
    }

    /// The latest published state.
    ///
    /// # Errors
    /// [`StoreError::Uninitialized`] if nothing was ever published.
    pub fn current_state(&self) -> StoreResult<S> {
        self.sender
            .borrow()
            .as_ref()
            .cloned()
            .ok_or(StoreError::Uninitialized)
    }

    /// Overwrite the cell and wake subscribers. Ignored after teardown.
    pub fn publish(&self, new_state: S) {
        if self.cleared.is_cleared() {
            self.logger
                .logv(|| "Ignoring publish on a cleared StateHolder".to_string());
            return;
        }
        self.sender.send_replace(Some(new_state));
    }

    /// Subscribe to state updates.
    pub fn observe(&self) -> StateObserver<S> {
        StateObserver {
            receiver: self.sender.subscribe(),
            cleared: self.cleared.clone(),
            primed: false,
        }
    }

    pub fn is_cleared(&self) -> bool {
        self.cleared.is_cleared()
    }

    /// Stop accepting updates and close every observer. Idempotent.
    ///
    /// The last published value stays readable through `current_state`.
    pub fn teardown(&self) {
        if self.cleared.signal() {
            self.logger.logv(|| "Clearing State Holder".to_string());
        }
    }
}

/// A conflated subscription to a [`StateHolder`].
///
/// Only the newest value is kept: a slow consumer skips intermediate states
/// and never accumulates a backlog.
pub struct StateObserver<S: VectorState> {
    receiver: watch::Receiver<Option<S>>,
    cleared: ClearSignal,
    primed: bool,
}

impl<S: VectorState> StateObserver<S> {
    /// Wait for the next state.
    ///
    /// The first call yields the value current at subscribe time (if one
    /// exists). Returns `None` once the holder is torn down and the newest
    /// value has already been seen.
    pub async fn next(&mut self) -> Option<S> {
        if !self.primed {
            self.primed = true;
            if let Some(state) = self.receiver.borrow_and_update().clone() {
                return Some(state);
            }
        }

        loop {
            tokio::select! {
                biased;

                changed = self.receiver.changed() => {
                    if changed.is_err() {
                        return None;
                    }
                    if let Some(state) = self.receiver.borrow_and_update().clone() {
                        return Some(state);
                    }
                }
                _ = self.cleared.wait() => {
                    if self.receiver.has_changed().unwrap_or(false) {
                        if let Some(state) = self.receiver.borrow_and_update().clone() {
                            return Some(state);
                        }
                    }
                    return None;
                }
            }
        }
    }

    /// The newest value without waiting, marking it as seen.
    pub fn latest(&mut self) -> Option<S> {
        self.primed = true;
        self.receiver.borrow_and_update().clone()
    }

    /// Whether the holder behind this observer has been torn down.
    pub fn is_closed(&self) -> bool {
        self.cleared.is_cleared() || self.receiver.has_changed().is_err()
    }
}
