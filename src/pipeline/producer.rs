// src/pipeline/producer.rs
// =============================================================================
// The producer thread: pushes every URL onto the work queue in list order,
// then fires the completion signal. It prints nothing on stdout.
//
// The producer never closes the queue itself. The main flow does that once
// it has observed the completion signal.
//
// If every worker has gone away the producer stops early and drops the
// signal unfired, which the main flow sees as `Abandoned`.
// =============================================================================

use super::queue::WorkQueue;
use super::signal::CompletionSignal;
use super::PipelineError;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, warn};

pub const PRODUCER_THREAD_NAME: &str = "fetch-producer";

pub fn spawn_producer(
    urls: Vec<String>,
    queue: Arc<WorkQueue>,
    done: CompletionSignal,
) -> Result<JoinHandle<()>, PipelineError> {
    thread::Builder::new()
        .name(PRODUCER_THREAD_NAME.to_string())
        .spawn(move || {
            let total = urls.len();
            for url in urls {
                // Blocks here whenever the workers fall behind
                if let Err(err) = queue.enqueue(url) {
                    warn!(error = %err, "producer stopping early");
                    return;
                }
                debug!(queued = queue.pending(), "url enqueued");
            }
            debug!(total, "all urls enqueued");
            done.complete();
        })
        .map_err(|source| PipelineError::Spawn {
            name: PRODUCER_THREAD_NAME.to_string(),
            source,
        })
}
