// src/pipeline/mod.rs
// =============================================================================
// This module runs one fetch pass over a list of URLs.
//
// Submodules:
// - queue: Bounded FIFO work queue between producer and workers
// - signal: One-shot completion signal and counting barrier
// - producer: Thread that enqueues the URLs
// - worker: Fixed pool of threads that fetch them
// - sink: Shared collection of outcomes
//
// Control flow of `Pipeline::run`:
// 1. Start the workers, then the producer; they run concurrently
// 2. Wait for the producer's completion signal
// 3. Close the queue
// 4. Wait on the barrier until every worker has terminated
// 5. Drain the sink and hand the outcomes back
//
// All state lives for exactly one call to `run`.
// =============================================================================

mod producer;
mod queue;
mod signal;
mod sink;
mod worker;

use crate::fetch::{FetchOutcome, Fetcher};
use producer::spawn_producer;
use queue::WorkQueue;
use signal::{completion_signal, Abandoned, CountingBarrier};
use sink::ResultSink;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};
use worker::{stdout_output, SharedOutput, WorkerPool};

/// Number of worker threads in the default configuration.
pub const DEFAULT_WORKERS: usize = 5;
/// Number of URLs the work queue buffers in the default configuration.
pub const DEFAULT_QUEUE_CAPACITY: usize = 6;

/// Sizes of the worker pool and work queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineConfig {
    pub workers: usize,
    pub queue_capacity: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}

/// Reasons a run could not complete. Fetch failures are not among them.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("the worker pool needs at least one worker")]
    NoWorkers,
    #[error("the work queue needs a capacity of at least one")]
    ZeroCapacity,
    #[error("failed to spawn thread '{name}'")]
    Spawn {
        name: String,
        #[source]
        source: std::io::Error,
    },
    #[error("thread '{0}' panicked")]
    Panicked(String),
    #[error("producer stopped before enqueueing every url")]
    ProducerAbandoned(#[from] Abandoned),
}

#[derive(Debug, Clone)]
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Result<Self, PipelineError> {
        if config.workers == 0 {
            return Err(PipelineError::NoWorkers);
        }
        if config.queue_capacity == 0 {
            return Err(PipelineError::ZeroCapacity);
        }
        Ok(Self { config })
    }

    pub fn config(&self) -> PipelineConfig {
        self.config
    }

    /// Fetches every URL once and returns one outcome per URL, in the order
    /// the fetches finished. Worker progress lines go to stdout.
    pub fn run<F>(&self, urls: Vec<String>, fetcher: F) -> Result<Vec<FetchOutcome>, PipelineError>
    where
        F: Fetcher + 'static,
    {
        self.run_with_output(urls, fetcher, stdout_output())
    }

    /// Same as `run`, with worker progress lines written to `output`.
    pub fn run_with_output<F>(
        &self,
        urls: Vec<String>,
        fetcher: F,
        output: SharedOutput,
    ) -> Result<Vec<FetchOutcome>, PipelineError>
    where
        F: Fetcher + 'static,
    {
        info!(
            urls = urls.len(),
            workers = self.config.workers,
            queue_capacity = self.config.queue_capacity,
            "starting fetch run"
        );

        let (queue, receiver) = WorkQueue::bounded(self.config.queue_capacity);
        let queue = Arc::new(queue);
        let sink = Arc::new(ResultSink::new());
        let fetcher: Arc<dyn Fetcher> = Arc::new(fetcher);
        let mut barrier = CountingBarrier::new();

        let pool = match WorkerPool::spawn(
            self.config.workers,
            receiver,
            fetcher,
            Arc::clone(&sink),
            output,
            &mut barrier,
        ) {
            Ok(pool) => pool,
            Err(err) => {
                // Let the workers that did start run dry before bailing out
                queue.close();
                barrier.wait();
                return Err(err);
            }
        };

        let (signal, producer_done) = completion_signal();
        let producer = match spawn_producer(urls, Arc::clone(&queue), signal) {
            Ok(handle) => handle,
            Err(err) => {
                queue.close();
                barrier.wait();
                pool.join()?;
                return Err(err);
            }
        };

        // Barrier 1: nothing may be closed before the producer is done
        let produced = producer_done.wait();
        queue.close();

        // Barrier 2: the sink is not read until every worker has terminated
        debug!(workers = barrier.registered(), "waiting for workers");
        barrier.wait();

        if producer.join().is_err() {
            return Err(PipelineError::Panicked(
                producer::PRODUCER_THREAD_NAME.to_string(),
            ));
        }
        // A dead worker pool is the usual reason the producer gave up, so it
        // is reported first
        pool.join()?;
        produced?;

        let outcomes = sink.drain();
        info!(outcomes = outcomes.len(), "fetch run finished");
        Ok(outcomes)
    }
}

// -----------------------------------------------------------------------------
// NOTES:
//
// 1. What is shared, and how?
//    - The queue, sink and fetcher are shared by threads that outlive any
//      single borrow, so they are reference counted
//    - Everything is created inside run() and dropped when it returns; there
//      is no global state
//
// 2. What if every worker dies?
//    - Only workers hold queue receivers, so the channel disconnects
//    - A producer blocked on a full queue wakes up, stops, and drops its
//      signal unfired; run() then reports the panicked worker
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::{FetchError, FetchResponse};
    use crate::report;
    use std::sync::Mutex;
    use std::thread;
    use std::time::{Duration, Instant};
    use worker::{end_line, start_line};

    // Answers from a fixed script: urls containing "fail" get a connection
    // error, everything else a 200
    struct ScriptedFetcher;

    impl Fetcher for ScriptedFetcher {
        fn fetch(&self, url: &str) -> Result<FetchResponse, FetchError> {
            if url.contains("fail") {
                Err(FetchError::Connect("connection refused".to_string()))
            } else {
                Ok(FetchResponse { status: 200 })
            }
        }
    }

    // Sleeps for a per-url delay and remembers when each fetch finished
    struct DelayedFetcher {
        finished_at: Mutex<Vec<Instant>>,
    }

    impl Fetcher for DelayedFetcher {
        fn fetch(&self, url: &str) -> Result<FetchResponse, FetchError> {
            let delay = if url.contains("slow") { 300 } else { 10 };
            thread::sleep(Duration::from_millis(delay));
            self.finished_at.lock().unwrap().push(Instant::now());
            Ok(FetchResponse { status: 200 })
        }
    }

    fn urls(count: usize) -> Vec<String> {
        (0..count).map(|i| format!("http://site-{}.test", i)).collect()
    }

    fn sorted_urls(outcomes: &[FetchOutcome]) -> Vec<String> {
        let mut urls: Vec<String> = outcomes.iter().map(|o| o.url().to_string()).collect();
        urls.sort();
        urls
    }

    #[test]
    fn test_default_config() {
        let config = PipelineConfig::default();
        assert_eq!(config.workers, 5);
        assert_eq!(config.queue_capacity, 6);
    }

    #[test]
    fn test_rejects_empty_pool_and_queue() {
        let no_workers = PipelineConfig {
            workers: 0,
            queue_capacity: 6,
        };
        assert!(matches!(Pipeline::new(no_workers), Err(PipelineError::NoWorkers)));

        let no_capacity = PipelineConfig {
            workers: 5,
            queue_capacity: 0,
        };
        assert!(matches!(Pipeline::new(no_capacity), Err(PipelineError::ZeroCapacity)));
    }

    #[test]
    fn test_ok_and_failing_url_end_to_end() {
        let pipeline = Pipeline::new(PipelineConfig::default()).unwrap();
        let input = vec!["http://ok.test".to_string(), "http://fail.test".to_string()];

        let outcomes = pipeline.run(input, ScriptedFetcher).unwrap();

        let mut output = Vec::new();
        report::write_report(&mut output, &outcomes).unwrap();
        let mut lines: Vec<String> = String::from_utf8(output)
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect();
        lines.sort();

        assert_eq!(
            lines,
            vec!["Couldn't fetch site http://fail.test", "http://ok.test"]
        );

        let failed = outcomes.iter().find(|o| o.url() == "http://fail.test").unwrap();
        assert!(!failed.succeeded());
        assert!(!failed.error_detail().unwrap_or_default().is_empty());
    }

    #[test]
    fn test_every_url_yields_exactly_one_outcome() {
        let input = urls(23);

        for (workers, queue_capacity) in [(1, 1), (1, 6), (5, 6), (8, 2), (23, 1), (23, 23)] {
            let pipeline = Pipeline::new(PipelineConfig {
                workers,
                queue_capacity,
            })
            .unwrap();

            let outcomes = pipeline.run(input.clone(), ScriptedFetcher).unwrap();

            assert_eq!(outcomes.len(), input.len(), "workers={} capacity={}", workers, queue_capacity);
            let mut expected = input.clone();
            expected.sort();
            assert_eq!(sorted_urls(&outcomes), expected);
        }
    }

    #[test]
    fn test_more_workers_than_urls() {
        let pipeline = Pipeline::new(PipelineConfig {
            workers: 10,
            queue_capacity: 6,
        })
        .unwrap();

        let outcomes = pipeline.run(urls(3), ScriptedFetcher).unwrap();
        assert_eq!(outcomes.len(), 3);
    }

    #[test]
    fn test_empty_url_list() {
        let pipeline = Pipeline::new(PipelineConfig::default()).unwrap();
        let outcomes = pipeline.run(Vec::new(), ScriptedFetcher).unwrap();
        assert!(outcomes.is_empty());
    }

    #[test]
    fn test_results_only_returned_after_slowest_fetch() {
        let fetcher = Arc::new(DelayedFetcher {
            finished_at: Mutex::new(Vec::new()),
        });
        let mut input = urls(9);
        input.insert(4, "http://slow.test".to_string());

        // Share the fetcher with the test through a thin wrapper
        struct Shared(Arc<DelayedFetcher>);
        impl Fetcher for Shared {
            fn fetch(&self, url: &str) -> Result<FetchResponse, FetchError> {
                self.0.fetch(url)
            }
        }

        let pipeline = Pipeline::new(PipelineConfig::default()).unwrap();
        let outcomes = pipeline.run(input, Shared(Arc::clone(&fetcher))).unwrap();
        let returned_at = Instant::now();

        let finished_at = fetcher.finished_at.lock().unwrap();
        assert_eq!(finished_at.len(), 10);
        assert!(finished_at.iter().all(|t| *t <= returned_at));

        // The slow fetch finishes last, so it is the last line reported
        assert_eq!(outcomes.last().unwrap().url(), "http://slow.test");
    }

    #[test]
    fn test_failures_do_not_stop_workers() {
        let input: Vec<String> = (0..12)
            .map(|i| format!("http://fail-{}.test", i))
            .collect();
        let pipeline = Pipeline::new(PipelineConfig::default()).unwrap();

        let outcomes = pipeline.run(input, ScriptedFetcher).unwrap();

        assert_eq!(outcomes.len(), 12);
        assert!(outcomes.iter().all(|o| !o.succeeded() && o.error_detail().is_some()));
    }

    #[test]
    fn test_progress_lines_for_every_url_and_worker() {
        let workers = 3;
        let pipeline = Pipeline::new(PipelineConfig {
            workers,
            queue_capacity: 2,
        })
        .unwrap();
        let buffer = Arc::new(Mutex::new(Vec::<u8>::new()));

        let input = urls(7);
        let outcomes = pipeline
            .run_with_output(input.clone(), ScriptedFetcher, buffer.clone())
            .unwrap();

        let text = String::from_utf8(buffer.lock().unwrap().clone()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), input.len() + workers);

        for outcome in &outcomes {
            let start = start_line(outcome.url(), outcome.worker());
            assert_eq!(lines.iter().filter(|l| **l == start).count(), 1, "{}", start);
        }
        for id in 1..=workers {
            let end = end_line(id);
            assert_eq!(lines.iter().filter(|l| **l == end).count(), 1, "{}", end);
        }
    }

    // Panics on every fetch
    struct PanickingFetcher;

    impl Fetcher for PanickingFetcher {
        fn fetch(&self, _url: &str) -> Result<FetchResponse, FetchError> {
            panic!("fetcher exploded");
        }
    }

    #[test]
    fn test_dead_worker_pool_returns_error_instead_of_hanging() {
        // One worker, one slot, many urls: the producer is blocked on a full
        // queue when the only worker dies
        let pipeline = Pipeline::new(PipelineConfig {
            workers: 1,
            queue_capacity: 1,
        })
        .unwrap();
        let buffer = Arc::new(Mutex::new(Vec::<u8>::new()));

        let result = pipeline.run_with_output(urls(10), PanickingFetcher, buffer);

        match result {
            Err(PipelineError::Panicked(name)) => assert_eq!(name, "fetch-worker-1"),
            other => panic!("expected a panicked worker, got {:?}", other),
        }
    }
}
