// src/main.rs
// =============================================================================
// This is the entry point of fetch-pool.
//
// What happens here:
// 1. Parse command-line flags and set up diagnostic logging
// 2. Build the HTTP fetcher and the pipeline (5 workers, queue of 6)
// 3. Run the pipeline over the compiled-in URL list
// 4. Print the report
// 5. Exit with 0, whatever the number of failed fetches
//
// Exit code 2 is reserved for runs that could not happen at all (the HTTP
// client could not be built, a thread could not be spawned, a thread
// panicked).
// =============================================================================

mod cli;
mod fetch;
mod logging;
mod pipeline;
mod report;
mod urls;

use anyhow::{Context, Result};
use clap::Parser;
use cli::Cli;
use fetch::HttpFetcher;
use pipeline::{Pipeline, PipelineConfig};
use tracing::debug;

fn main() {
    let exit_code = match run() {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.log_format, cli.verbose).context("failed to set up logging")?;

    let pipeline = Pipeline::new(PipelineConfig::default())?;
    debug!(config = ?pipeline.config(), "pipeline configured");

    let fetcher = HttpFetcher::new().context("failed to build the HTTP client")?;
    let outcomes = pipeline
        .run(urls::default_urls(), fetcher)
        .context("fetch run did not complete")?;

    report::print_report(&outcomes).context("failed to write the report")?;
    Ok(())
}
