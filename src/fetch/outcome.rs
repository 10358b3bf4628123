// src/fetch/outcome.rs
// =============================================================================
// The record a worker produces after attempting one URL.
//
// An outcome is created once, moved into the result sink, and never touched
// again. Fields are private and the only way in is `success`, `failure`, or
// `from_result`, which keep `succeeded` and `error_detail` consistent: a
// successful outcome has no detail, a failed one always has one.
// =============================================================================

use super::{FetchError, FetchResponse};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOutcome {
    /// The URL that was fetched
    url: String,
    /// True when the server answered without a transport error
    succeeded: bool,
    /// Why the fetch failed, present only on failure
    error_detail: Option<String>,
    /// HTTP status of the response, present only on success
    status: Option<u16>,
    /// Number of the worker that performed the fetch (1-based)
    worker: usize,
}

impl FetchOutcome {
    pub fn success(url: String, worker: usize, response: FetchResponse) -> Self {
        Self {
            url,
            succeeded: true,
            error_detail: None,
            status: Some(response.status),
            worker,
        }
    }

    pub fn failure(url: String, worker: usize, error: &FetchError) -> Self {
        Self {
            url,
            succeeded: false,
            error_detail: Some(error.to_string()),
            status: None,
            worker,
        }
    }

    // Converts whatever the fetcher returned into an outcome
    pub fn from_result(
        url: String,
        worker: usize,
        result: Result<FetchResponse, FetchError>,
    ) -> Self {
        match result {
            Ok(response) => Self::success(url, worker, response),
            Err(error) => Self::failure(url, worker, &error),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn into_url(self) -> String {
        self.url
    }

    pub fn succeeded(&self) -> bool {
        self.succeeded
    }

    pub fn error_detail(&self) -> Option<&str> {
        self.error_detail.as_deref()
    }

    pub fn status(&self) -> Option<u16> {
        self.status
    }

    pub fn worker(&self) -> usize {
        self.worker
    }
}
