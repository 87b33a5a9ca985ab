//! Client mailbox
//!
//! This module defines the per-client state stored in a session: a bounded
//! FIFO channel plus a one-shot close guard.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, Mutex as AsyncMutex};

/// Receiving half of a mailbox, shared by every handle bound to the same client
pub(crate) type SharedReceiver<M> = Arc<AsyncMutex<mpsc::Receiver<M>>>;

/// Result of a single delivery attempt during a broadcast
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Message was enqueued
    Delivered,
    /// Mailbox was full, message dropped for this client
    Dropped,
    /// Mailbox was closed, nothing enqueued
    Closed,
}

/// Bounded mailbox for a single client
pub(crate) struct Mailbox<M> {
    /// Sending half; taken (and dropped) on close
    tx: Mutex<Option<mpsc::Sender<M>>>,

    /// Receiving half
    rx: SharedReceiver<M>,

    /// Set exactly once, by the first close
    closed: AtomicBool,
}

impl<M: Send + 'static> Mailbox<M> {
    /// Create an open mailbox holding at most `capacity` messages
    pub(super) fn new(capacity: usize) -> Self {
        let (tx, rx) = mpsc::channel(capacity.max(1));

        Self {
            tx: Mutex::new(Some(tx)),
            rx: Arc::new(AsyncMutex::new(rx)),
            closed: AtomicBool::new(false),
        }
    }

    /// Try to enqueue a message without waiting
    pub(super) fn offer(&self, message: M) -> Delivery {
        let tx = self.tx.lock().unwrap_or_else(PoisonError::into_inner);

        match tx.as_ref() {
            Some(tx) => match tx.try_send(message) {
                Ok(()) => Delivery::Delivered,
                Err(TrySendError::Full(_)) => Delivery::Dropped,
                Err(TrySendError::Closed(_)) => Delivery::Closed,
            },
            None => Delivery::Closed,
        }
    }

    /// Close the mailbox
    ///
    /// Only the first call performs the open -> closed transition and returns true.
    /// Messages already buffered stay available to receivers.
    pub(super) fn close(&self) -> bool {
        if self
            .closed
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return false;
        }

        // Dropping the only sender ends the stream once the buffer drains
        self.tx
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        true
    }

    /// Check whether the mailbox has been closed
    pub(super) fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Get a handle on the receiving half
    pub(super) fn receiver(&self) -> SharedReceiver<M> {
        Arc::clone(&self.rx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_offer_and_receive() {
        let mailbox = Mailbox::new(2);

        assert_eq!(mailbox.offer("a"), Delivery::Delivered);
        assert_eq!(mailbox.offer("b"), Delivery::Delivered);

        let rx = mailbox.receiver();
        let mut rx = rx.lock().await;
        assert_eq!(rx.recv().await, Some("a"));
        assert_eq!(rx.recv().await, Some("b"));
    }

    #[test]
    fn test_offer_full_drops() {
        let mailbox = Mailbox::new(1);

        assert_eq!(mailbox.offer(1), Delivery::Delivered);
        assert_eq!(mailbox.offer(2), Delivery::Dropped);
    }

    #[test]
    fn test_zero_capacity_raised() {
        let mailbox = Mailbox::new(0);

        assert_eq!(mailbox.offer(1u8), Delivery::Delivered);
        assert_eq!(mailbox.offer(2u8), Delivery::Dropped);
    }

    #[tokio::test]
    async fn test_close_once() {
        let mailbox = Mailbox::new(4);
        mailbox.offer("buffered");

        assert!(mailbox.close());
        assert!(!mailbox.close());
        assert!(mailbox.is_closed());
        assert_eq!(mailbox.offer("late"), Delivery::Closed);

        // Buffered message survives the close, then the stream ends
        let rx = mailbox.receiver();
        let mut rx = rx.lock().await;
        assert_eq!(rx.recv().await, Some("buffered"));
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_close() {
        let mailbox: Arc<Mailbox<u32>> = Arc::new(Mailbox::new(4));

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let mailbox = Arc::clone(&mailbox);
                tokio::spawn(async move { mailbox.close() })
            })
            .collect();

        let mut winners = 0;
        for handle in handles {
            if handle.await.unwrap() {
                winners += 1;
            }
        }

        assert_eq!(winners, 1);
    }
}
