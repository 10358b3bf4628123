// src/pipeline/signal.rs
// =============================================================================
// The two synchronization points of a run, kept as separate types:
//
// - CompletionSignal / CompletionWaiter: one-shot. The producer fires it
//   once after its last enqueue; the main flow waits on it once before
//   closing the queue.
// - CountingBarrier / BarrierToken: one token per worker. The main flow
//   waits until every token has been dropped before reading results.
//
// Both halves of the one-shot are consumed by value, so firing or waiting
// twice does not compile.
// =============================================================================

use crossbeam::channel::{self, Receiver, Sender};
use crossbeam::sync::WaitGroup;
use thiserror::Error;

/// The completion signal was dropped without being fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("completion signal dropped before it was fired")]
pub struct Abandoned;

/// Creates a connected one-shot signal pair.
pub fn completion_signal() -> (CompletionSignal, CompletionWaiter) {
    // Capacity 1 so firing never blocks, even if nobody waits yet
    let (sender, receiver) = channel::bounded(1);
    (CompletionSignal { sender }, CompletionWaiter { receiver })
}

#[derive(Debug)]
pub struct CompletionSignal {
    sender: Sender<()>,
}

impl CompletionSignal {
    pub fn complete(self) {
        // A waiter that already gave up is not an error for the firing side
        let _ = self.sender.send(());
    }
}

#[derive(Debug)]
pub struct CompletionWaiter {
    receiver: Receiver<()>,
}

impl CompletionWaiter {
    /// Blocks until the signal fires.
    ///
    /// Returns `Err(Abandoned)` if the signal was dropped unfired, which
    /// happens when the producer thread panics.
    pub fn wait(self) -> Result<(), Abandoned> {
        self.receiver.recv().map_err(|_| Abandoned)
    }
}

/// Counts registered tasks and lets one waiter block until all have ended.
#[derive(Debug, Default)]
pub struct CountingBarrier {
    group: WaitGroup,
    registered: usize,
}

impl CountingBarrier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one task to the count and hands back its token.
    pub fn register(&mut self) -> BarrierToken {
        self.registered += 1;
        BarrierToken {
            _group: self.group.clone(),
        }
    }

    pub fn registered(&self) -> usize {
        self.registered
    }

    /// Blocks until every token handed out by `register` has been dropped.
    pub fn wait(self) {
        self.group.wait();
    }
}

/// Held by a task for as long as it runs.
///
/// Dropping it (normally, or while unwinding from a panic) counts the task
/// as terminated.
#[derive(Debug)]
pub struct BarrierToken {
    _group: WaitGroup,
}

impl BarrierToken {
    pub fn arrive(self) {}
}

// -----------------------------------------------------------------------------
// NOTES:
//
// 1. What is a WaitGroup?
//    - crossbeam's counting barrier: every clone is one outstanding task
//    - wait() returns once all clones are gone
//    - Clones drop during panic unwinding too, so a crashed worker can never
//      leave the main flow stuck on the barrier
//
// 2. What does consuming `self` in complete() and wait() do?
//    - The value is gone after the first call, so a second call is a
//      compile error
// -----------------------------------------------------------------------------
