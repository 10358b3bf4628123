// src/pipeline/queue.rs
// =============================================================================
// The bounded FIFO queue that carries URLs from the producer to the workers.
//
// How it works:
// - A crossbeam bounded channel holds at most `capacity` URLs
// - `WorkQueue::bounded` hands back the sending side and one receiver;
//   every worker gets its own clone of that receiver
// - `enqueue` blocks while the channel is full (backpressure)
// - `close` drops the only long-lived sender; workers drain what is left
//   and then see the channel as disconnected
// - The sending side holds no receiver, so once every worker is gone a
//   blocked `enqueue` wakes up with `Disconnected`
//
// Contract:
// - `close` must be called exactly once
// - `enqueue` must not be called after `close`
// Breaking either is a bug in the caller, so both panic.
// =============================================================================

use crossbeam::channel::{self, Receiver, Sender};
use std::sync::{Mutex, PoisonError};
use thiserror::Error;

/// Every receiver is gone, so nobody will ever take the URL.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no worker left to receive url {0}")]
pub struct Disconnected(pub String);

/// Sending side of the work queue, shared by the producer and the main flow.
#[derive(Debug)]
pub struct WorkQueue {
    // `None` once the queue has been closed
    sender: Mutex<Option<Sender<String>>>,
}

impl WorkQueue {
    /// Creates an open queue that buffers at most `capacity` URLs, together
    /// with the receiver the workers clone.
    pub fn bounded(capacity: usize) -> (Self, QueueReceiver) {
        let (sender, receiver) = channel::bounded(capacity);
        let queue = Self {
            sender: Mutex::new(Some(sender)),
        };
        (queue, QueueReceiver { receiver })
    }

    /// Appends `url` to the back of the queue, blocking while it is full.
    ///
    /// Returns `Err(Disconnected)` if every receiver has been dropped.
    ///
    /// # Panics
    ///
    /// Panics if the queue has already been closed.
    pub fn enqueue(&self, url: String) -> Result<(), Disconnected> {
        // Clone the sender out so the lock is not held while blocked on a
        // full channel
        let sender = match self.current_sender() {
            Some(sender) => sender,
            None => panic!("enqueue called on a closed work queue (url: {})", url),
        };

        sender.send(url).map_err(|err| Disconnected(err.into_inner()))
    }

    /// Marks the queue as finished. Items already queued stay receivable.
    ///
    /// # Panics
    ///
    /// Panics if the queue was already closed.
    pub fn close(&self) {
        let sender = self
            .sender
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        if sender.is_none() {
            panic!("work queue closed twice");
        }
    }

    /// Number of URLs currently waiting in the queue (0 once closed).
    pub fn pending(&self) -> usize {
        self.current_sender().map_or(0, |sender| sender.len())
    }

    fn current_sender(&self) -> Option<Sender<String>> {
        self.sender
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// Receiving side of the work queue, one per worker.
#[derive(Debug, Clone)]
pub struct QueueReceiver {
    receiver: Receiver<String>,
}

impl QueueReceiver {
    /// Blocks until a URL is available.
    ///
    /// Returns `None` once the queue is closed and fully drained.
    pub fn receive(&self) -> Option<String> {
        self.receiver.recv().ok()
    }
}
