// src/fetch/http.rs
// =============================================================================
// This module fetches URLs over HTTP with a blocking reqwest client.
//
// Key behavior:
// - One GET per URL, default client settings, no timeout, no retries
// - The response body is never read; the response is dropped right away
// - Any response at all is a success (404 and 500 included)
// - Transport errors are sorted into FetchError variants
//
// Why blocking?
// - Each worker is an OS thread that owns its own loop
// - Blocking only parks that worker, not the whole process
// =============================================================================

use super::{FetchError, FetchResponse, Fetcher};
use reqwest::blocking::Client;
use std::error::Error as StdError;
use std::time::Duration;

/// Fetcher backed by a shared `reqwest::blocking::Client`.
///
/// The client pools connections internally and is safe to use from every
/// worker thread at once.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    // Builds the client once per run
    //
    // The blocking client defaults to a 30 second timeout, so it is switched
    // off explicitly. Redirects follow reqwest's default policy.
    pub fn new() -> reqwest::Result<Self> {
        let client = Client::builder().timeout(None::<Duration>).build()?;
        Ok(Self { client })
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<FetchResponse, FetchError> {
        let response = self.client.get(url).send().map_err(categorize_error)?;

        Ok(FetchResponse {
            status: response.status().as_u16(),
        })
    }
}

// Categorizes reqwest errors
//
// reqwest errors can happen for many reasons:
// - Network timeout
// - DNS resolution failure
// - Connection refused or reset
// - Too many redirects
// - Invalid URL or malformed response
fn categorize_error(error: reqwest::Error) -> FetchError {
    let detail = error.to_string();

    if error.is_timeout() {
        FetchError::Timeout(detail)
    } else if error.is_redirect() {
        FetchError::Redirect(detail)
    } else if error.is_connect() {
        if mentions_dns(&error) {
            FetchError::Dns(detail)
        } else {
            FetchError::Connect(detail)
        }
    } else {
        FetchError::Request(detail)
    }
}

// hyper reports resolver failures as connect errors; the resolver's own
// message sits somewhere down the source chain
fn mentions_dns(error: &reqwest::Error) -> bool {
    let mut current: Option<&dyn StdError> = Some(error);
    while let Some(err) = current {
        if err.to_string().to_lowercase().contains("dns") {
            return true;
        }
        current = err.source();
    }
    false
}
