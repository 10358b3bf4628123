// src/pipeline/sink.rs
// =============================================================================
// Append-only collection of fetch outcomes, shared by all workers.
//
// Appends are serialized by a mutex. The main flow only drains the sink after
// the worker barrier has released, so the order seen by the reporter is the
// order in which workers finished their fetches.
// =============================================================================

use crate::fetch::FetchOutcome;
use std::sync::{Mutex, PoisonError};

#[derive(Debug, Default)]
pub struct ResultSink {
    outcomes: Mutex<Vec<FetchOutcome>>,
}

impl ResultSink {
    pub fn new() -> Self {
        Self::default()
    }

    // A poisoned lock only means another worker panicked mid-append; the
    // vector itself is still intact
    pub fn append(&self, outcome: FetchOutcome) -> usize {
        let mut outcomes = self.outcomes.lock().unwrap_or_else(PoisonError::into_inner);
        outcomes.push(outcome);
        outcomes.len()
    }

    /// Takes every outcome out of the sink, in append order.
    pub fn drain(&self) -> Vec<FetchOutcome> {
        let mut outcomes = self.outcomes.lock().unwrap_or_else(PoisonError::into_inner);
        std::mem::take(&mut *outcomes)
    }
}
