// src/logging.rs
// =============================================================================
// Sets up tracing for diagnostics.
//
// Diagnostics always go to stderr so stdout carries nothing but the worker
// lines and the report. The default filter only lets warnings through;
// --verbose turns on debug output for this crate, and RUST_LOG overrides both.
// A RUST_LOG that does not parse is not silently ignored: the defaults are
// used and a warning names the rejected value once the subscriber is up.
// =============================================================================

use crate::cli::LogFormat;
use anyhow::Result;
use std::env;
use tracing::warn;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub fn init(format: LogFormat, verbose: bool) -> Result<()> {
    let rust_log = env::var(EnvFilter::DEFAULT_ENV).ok();
    let (env_filter, rejected) = build_filter(rust_log.as_deref(), verbose);

    let registry = tracing_subscriber::registry().with(env_filter);
    match format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init()?,
        LogFormat::Text => registry
            .with(fmt::layer().with_thread_names(true).with_writer(std::io::stderr))
            .try_init()?,
    }

    if let Some((value, error)) = rejected {
        warn!(rust_log = %value, error = %error, "ignoring invalid RUST_LOG, using defaults");
    }

    Ok(())
}

/// Picks the filter from RUST_LOG when it is set and valid.
///
/// An unset (or empty) variable falls back to the defaults quietly. A value
/// that does not parse also falls back, and is handed back with the parse
/// error so the caller can report it.
fn build_filter(rust_log: Option<&str>, verbose: bool) -> (EnvFilter, Option<(String, String)>) {
    let value = match rust_log.map(str::trim) {
        Some(value) if !value.is_empty() => value,
        _ => return (EnvFilter::new(default_directives(verbose)), None),
    };

    match EnvFilter::try_new(value) {
        Ok(filter) => (filter, None),
        Err(err) => (
            EnvFilter::new(default_directives(verbose)),
            Some((value.to_string(), err.to_string())),
        ),
    }
}

fn default_directives(verbose: bool) -> &'static str {
    if verbose {
        "fetch_pool=debug,warn"
    } else {
        "warn"
    }
}
