// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// There is deliberately little to configure: the URL list, pool size and
// queue capacity are compiled in. The flags only control the diagnostic
// logging that goes to stderr.
// =============================================================================

use clap::{Parser, ValueEnum};

#[derive(Parser, Debug)]
#[command(
    name = "fetch-pool",
    version,
    about = "Fetch a fixed list of sites with a pool of worker threads",
    long_about = "fetch-pool fetches a compiled-in list of URLs using five worker threads \
                  fed by a bounded queue, then prints every URL that answered and a \
                  \"Couldn't fetch site\" line for every one that did not."
)]
pub struct Cli {
    /// Show debug diagnostics on stderr
    ///
    /// RUST_LOG, when set, takes precedence over this flag
    #[arg(short, long)]
    pub verbose: bool,

    /// Format of the diagnostic log lines
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable lines
    Text,
    /// One JSON object per line
    Json,
}
