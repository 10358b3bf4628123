// src/pipeline/worker.rs
// =============================================================================
// The worker pool: a fixed number of OS threads draining the work queue.
//
// Each worker loops:
// 1. Receive a URL (blocks while the queue is empty but still open)
// 2. If the queue is closed and drained, print "Ending process <n>" and stop
// 3. Otherwise print "Start fetching url <url> with process <n>", fetch it,
//    turn the result into a FetchOutcome and append it to the sink
//
// The two progress lines go to a shared writer (stdout in a real run), one
// whole line per lock, so lines from different workers never interleave.
// Fetch errors never stop a worker; they become failed outcomes.
// Every worker holds a barrier token for its whole life and drops it on the
// way out, which is what the main flow waits on.
// =============================================================================

use super::queue::QueueReceiver;
use super::signal::{BarrierToken, CountingBarrier};
use super::sink::ResultSink;
use super::PipelineError;
use crate::fetch::{FetchOutcome, Fetcher};
use std::io::{self, Write};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use tracing::{debug, info, warn};

/// Where workers print their progress lines.
pub type SharedOutput = Arc<Mutex<dyn Write + Send>>;

pub fn stdout_output() -> SharedOutput {
    Arc::new(Mutex::new(io::stdout()))
}

// Printed when a worker picks up a URL
pub fn start_line(url: &str, worker: usize) -> String {
    format!("Start fetching url {} with process {}", url, worker)
}

// Printed once when a worker finds the queue closed and drained
pub fn end_line(worker: usize) -> String {
    format!("Ending process {}", worker)
}

// Everything one worker thread needs, moved into the thread
struct Worker {
    id: usize,
    receiver: QueueReceiver,
    fetcher: Arc<dyn Fetcher>,
    sink: Arc<ResultSink>,
    output: SharedOutput,
}

impl Worker {
    fn run(self, token: BarrierToken) {
        loop {
            let url = match self.receiver.receive() {
                Some(url) => url,
                None => {
                    self.emit(&end_line(self.id));
                    break;
                }
            };

            self.emit(&start_line(&url, self.id));
            let result = self.fetcher.fetch(&url);
            let outcome = FetchOutcome::from_result(url, self.id, result);

            match outcome.error_detail() {
                None => debug!(
                    worker = self.id,
                    url = %outcome.url(),
                    status = ?outcome.status(),
                    "fetch succeeded"
                ),
                Some(detail) => info!(
                    worker = self.id,
                    url = %outcome.url(),
                    error = %detail,
                    "fetch failed"
                ),
            }

            let collected = self.sink.append(outcome);
            debug!(worker = self.id, collected, "outcome recorded");
        }

        token.arrive();
    }

    fn emit(&self, line: &str) {
        let mut output = self.output.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(err) = writeln!(output, "{}", line).and_then(|()| output.flush()) {
            warn!(worker = self.id, error = %err, "failed to write progress line");
        }
    }
}

/// Handles to the running worker threads.
#[derive(Debug)]
pub struct WorkerPool {
    handles: Vec<(String, JoinHandle<()>)>,
}

impl WorkerPool {
    // Spawns `count` workers numbered 1..=count, each registered on `barrier`
    //
    // `receiver` is consumed: afterwards only the workers hold receivers, so
    // the queue disconnects once they are all gone.
    // If a spawn fails, the workers already started keep running; the caller
    // is responsible for closing the queue so they can finish.
    pub fn spawn(
        count: usize,
        receiver: QueueReceiver,
        fetcher: Arc<dyn Fetcher>,
        sink: Arc<ResultSink>,
        output: SharedOutput,
        barrier: &mut CountingBarrier,
    ) -> Result<Self, PipelineError> {
        let mut handles = Vec::with_capacity(count);

        for id in 1..=count {
            let name = format!("fetch-worker-{}", id);
            let worker = Worker {
                id,
                receiver: receiver.clone(),
                fetcher: Arc::clone(&fetcher),
                sink: Arc::clone(&sink),
                output: Arc::clone(&output),
            };
            let token = barrier.register();

            let handle = thread::Builder::new()
                .name(name.clone())
                .spawn(move || worker.run(token))
                .map_err(|source| PipelineError::Spawn {
                    name: name.clone(),
                    source,
                })?;
            handles.push((name, handle));
        }

        debug!(workers = handles.len(), "worker pool started");
        Ok(Self { handles })
    }

    /// Joins every worker thread, reporting the first one that panicked.
    ///
    /// Only call after the barrier has released, so this never blocks for
    /// long.
    pub fn join(self) -> Result<(), PipelineError> {
        let mut result = Ok(());
        for (name, handle) in self.handles {
            if handle.join().is_err() && result.is_ok() {
                result = Err(PipelineError::Panicked(name));
            }
        }
        result
    }
}
