//! Execution context supplied by the host.

use std::future::Future;

use tokio::runtime::Handle;
use tokio::task::{AbortHandle, JoinSet};

use crate::error::{StoreError, StoreResult};

/// Opaque scheduling context a store runs on.
///
/// Wraps a tokio runtime handle so the host decides which pool the driver
/// loop and read-actions use.
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    handle: Handle,
}

impl ExecutionContext {
    /// Context for the runtime the caller is currently inside.
    ///
    /// # Errors
    /// Returns [`StoreError::NoRuntime`] when called outside a tokio runtime.
    pub fn current() -> StoreResult<Self> {
        Handle::try_current()
            .map(Self::from_handle)
            .map_err(|e| StoreError::NoRuntime(e.to_string()))
    }

    pub fn from_handle(handle: Handle) -> Self {
        Self { handle }
    }

    pub fn handle(&self) -> &Handle {
        &self.handle
    }

    pub(crate) fn spawn<F>(&self, future: F) -> tokio::task::JoinHandle<F::Output>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        self.handle.spawn(future)
    }

    pub(crate) fn spawn_into<F>(&self, tasks: &mut JoinSet<()>, future: F) -> AbortHandle
    where
        F: Future<Output = ()> + Send + 'static,
    {
        tasks.spawn_on(future, &self.handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn current_fails_outside_runtime() {
        assert!(matches!(
            ExecutionContext::current(),
            Err(StoreError::NoRuntime(_))
        ));
    }

    #[tokio::test]
    async fn current_inside_runtime() {
        let context = ExecutionContext::current().unwrap();
        let value = context.spawn(async { 7 }).await.unwrap();
        assert_eq!(value, 7);
    }
}
