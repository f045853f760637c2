//! Cooperative cancellation.

use std::sync::Arc;
use tokio::sync::watch;

/// Clonable cancellation token observed at every suspension point of a run.
///
/// Cancelling is best-effort: in-flight model and tool futures are dropped
/// at the next suspension point, already-completed steps stay valid and
/// summarizable. Cancellation is one-way and idempotent.
#[derive(Debug, Clone)]
pub struct CancelToken {
    tx: Arc<watch::Sender<bool>>,
    rx: watch::Receiver<bool>,
}

impl CancelToken {
    /// Create a token in the not-cancelled state.
    pub fn new() -> Self {
        let (tx, rx) = watch::channel(false);
        Self {
            tx: Arc::new(tx),
            rx,
        }
    }

    /// Request cancellation. All clones observe it.
    pub fn cancel(&self) {
        let _ = self.tx.send(true);
    }

    /// Check the current state without suspending.
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Suspend until cancellation is requested.
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        if rx.wait_for(|cancelled| *cancelled).await.is_err() {
            // Sender gone without cancelling: cancellation can no longer
            // happen, so this future must never resolve.
            std::future::pending::<()>().await;
        }
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn starts_not_cancelled() {
        let token = CancelToken::new();
        assert!(!token.is_cancelled());
    }

    #[tokio::test]
    async fn cancel_is_visible_to_clones() {
        let token = CancelToken::new();
        let clone = token.clone();

        token.cancel();

        assert!(clone.is_cancelled());
        clone.cancelled().await;
    }

    #[tokio::test]
    async fn cancelled_future_stays_pending_until_cancel() {
        let token = CancelToken::new();
        let waiter = token.clone();

        let pending = tokio::time::timeout(Duration::from_millis(10), waiter.cancelled()).await;
        assert!(pending.is_err());

        token.cancel();
        tokio::time::timeout(Duration::from_millis(10), waiter.cancelled())
            .await
            .expect("resolves after cancel");
    }
}
