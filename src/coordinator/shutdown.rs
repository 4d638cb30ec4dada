// ABOUTME: One-shot broadcast shutdown signal built on a tokio watch channel.
// ABOUTME: Closing it releases every current and future waiter at once.

use std::sync::Arc;

use tokio::sync::watch;

/// One-shot broadcast signal shared by every task in a run.
///
/// The signal starts open and transitions to closed exactly once. Any number
/// of tasks may [`wait`](Shutdown::wait) on it, before or after the
/// transition; all of them are released together, with no per-task
/// acknowledgement. It is never reopened.
///
/// Clones share the same underlying signal.
#[derive(Debug, Clone)]
pub struct Shutdown {
    tx: Arc<watch::Sender<bool>>,
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

impl Shutdown {
    /// Create a new signal in the open state.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// Close the signal.
    ///
    /// Returns `true` if this call performed the transition, `false` if the
    /// signal was already closed. Closing twice is a no-op, never an error.
    pub(crate) fn raise(&self) -> bool {
        let was_closed = self.tx.send_replace(true);
        if !was_closed {
            tracing::debug!("shutdown signal raised");
        }
        !was_closed
    }

    /// Returns true once the signal has been closed.
    pub fn is_raised(&self) -> bool {
        *self.tx.borrow()
    }

    /// Wait until the signal is closed.
    ///
    /// Returns immediately if it already is. Cancel safe, so it can sit in a
    /// `tokio::select!` next to other work.
    pub async fn wait(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives as long as `self`, so this only returns on close.
        let _ = rx.wait_for(|closed| *closed).await;
    }
}
