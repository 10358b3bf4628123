// src/fetch/mod.rs
// =============================================================================
// This module performs the per-URL network fetch.
//
// Submodules:
// - http: The real fetcher, one blocking HTTP GET per URL
// - outcome: The recorded result of one attempted fetch
//
// The `Fetcher` trait is the seam between the worker pool and the network.
// Workers only ever see `dyn Fetcher`, so tests swap in stubs that answer
// instantly (or slowly, or with errors) without touching a socket.
// =============================================================================

mod http;
mod outcome;

pub use http::HttpFetcher;
pub use outcome::FetchOutcome;

use thiserror::Error;

/// What a fetch reports back when the server answered at all.
///
/// The status code is kept for diagnostics only. Any response counts as
/// success, whatever its status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchResponse {
    /// HTTP status code of the response
    pub status: u16,
}

/// Transport-level reasons a fetch can fail.
///
/// Every variant carries the underlying error text, so the rendered message
/// is never empty.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// Request timed out
    #[error("request timed out: {0}")]
    Timeout(String),
    /// Redirect chain was too long or looped
    #[error("too many redirects: {0}")]
    Redirect(String),
    /// Hostname did not resolve
    #[error("could not resolve hostname: {0}")]
    Dns(String),
    /// Host unreachable, connection refused or reset
    #[error("connection failed: {0}")]
    Connect(String),
    /// Anything else: malformed URL, broken response, protocol error
    #[error("request failed: {0}")]
    Request(String),
}

/// Something that can attempt to fetch a URL.
///
/// Shared by every worker at once, hence `Send + Sync`.
pub trait Fetcher: Send + Sync {
    /// Issues one request for `url`. Never retries.
    fn fetch(&self, url: &str) -> Result<FetchResponse, FetchError>;
}
