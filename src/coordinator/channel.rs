// ABOUTME: Bounded multi-producer multi-consumer work channel.
// ABOUTME: Puts and takes block until a counterpart arrives or shutdown fires.

use std::sync::Arc;

use tokio::sync::{Mutex, mpsc};

use super::shutdown::Shutdown;

/// A bounded rendezvous point between many senders and many receivers.
///
/// Any holder of a clone may [`put`](WorkChannel::put) or
/// [`take`](WorkChannel::take). Receivers queue on an internal mutex, so each
/// value is delivered to exactly one taker. Ownership of a value moves fully
/// to the taker.
pub struct WorkChannel<T> {
    tx: mpsc::Sender<T>,
    rx: Arc<Mutex<mpsc::Receiver<T>>>,
    capacity: usize,
}

impl<T> Clone for WorkChannel<T> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
            rx: Arc::clone(&self.rx),
            capacity: self.capacity,
        }
    }
}

impl<T: Send> WorkChannel<T> {
    /// Create a channel holding at most `capacity` values in flight.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn bounded(capacity: usize) -> Self {
        assert!(capacity > 0, "capacity must be positive");

        let (tx, rx) = mpsc::channel(capacity);
        Self {
            tx,
            rx: Arc::new(Mutex::new(rx)),
            capacity,
        }
    }

    /// Offer a value, waiting for a free slot.
    ///
    /// Returns `Err(value)` if shutdown fired first. When a slot and shutdown
    /// are both ready either branch may be taken.
    pub async fn put(&self, value: T, shutdown: &Shutdown) -> Result<(), T> {
        tokio::select! {
            permit = self.tx.reserve() => match permit {
                Ok(permit) => {
                    permit.send(value);
                    Ok(())
                }
                Err(_) => Err(value),
            },
            () = shutdown.wait() => Err(value),
        }
    }

    /// Accept a value, waiting for one to arrive.
    ///
    /// Returns `None` if shutdown fired first. When a value and shutdown are
    /// both ready either branch may be taken.
    pub async fn take(&self, shutdown: &Shutdown) -> Option<T> {
        tokio::select! {
            value = self.recv() => value,
            () = shutdown.wait() => None,
        }
    }

    /// Configured capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of values currently queued.
    pub fn len(&self) -> usize {
        self.capacity - self.tx.capacity()
    }

    /// Returns true if nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    async fn recv(&self) -> Option<T> {
        self.rx.lock().await.recv().await
    }
}
