use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::Notify;

/// One-shot "this component has been cleared" flag that tasks can await.
#[derive(Clone, Default)]
pub(crate) struct ClearSignal {
    cleared: Arc<AtomicBool>,
    notify: Arc<Notify>,
}

impl ClearSignal {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Returns true only for the call that performed the transition.
    pub(crate) fn signal(&self) -> bool {
        if !self.cleared.swap(true, Ordering::SeqCst) {
            self.notify.notify_waiters();
            return true;
        }
        false
    }

    pub(crate) fn is_cleared(&self) -> bool {
        self.cleared.load(Ordering::SeqCst)
    }

    pub(crate) async fn wait(&self) {
        // Register with Notify before checking the flag, otherwise a signal()
        // landing between the check and the await would be lost.
        let notified = self.notify.notified();
        tokio::pin!(notified);
        notified.as_mut().enable();
        if self.is_cleared() {
            return;
        }
        notified.await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn signal_transitions_once() {
        let signal = ClearSignal::new();
        assert!(!signal.is_cleared());
        assert!(signal.signal());
        assert!(!signal.signal());
        assert!(signal.is_cleared());
    }

    #[tokio::test]
    async fn wait_returns_immediately_when_already_cleared() {
        let signal = ClearSignal::new();
        signal.signal();
        tokio::time::timeout(Duration::from_millis(100), signal.wait())
            .await
            .expect("wait should not block after signal");
    }

    #[tokio::test]
    async fn wait_wakes_on_signal() {
        let signal = ClearSignal::new();
        let waiter = signal.clone();
        let task = tokio::spawn(async move { waiter.wait().await });
        tokio::time::sleep(Duration::from_millis(10)).await;
        signal.signal();
        tokio::time::timeout(Duration::from_secs(1), task)
            .await
            .expect("waiter should wake")
            .unwrap();
    }
}
