//! # SAR News Agent
//!
//! Finds recent news coverage of search-and-rescue (SAR) operations, screens
//! each article for relevance, and summarizes the ones that qualify.
//!
//! ## Features
//!
//! - Collects candidates from a NewsAPI-compatible search endpoint or by
//!   scraping a fixed list of text-friendly news sites
//! - Judges relevance by SAR vocabulary matching or with an
//!   OpenAI-compatible model
//! - Summarizes by extracting SAR sentences or with the same model
//! - Prints a console report and optionally writes a dated JSON report
//!
//! ## Usage
//!
//! ```sh
//! sar_news_agent -k flood -k rescue -j ./reports
//! ```
//!
//! ## Architecture
//!
//! 1. **Request**: only `{"action": "search_news"}` starts a run
//! 2. **Query**: up to 4 keywords from flags or an interactive prompt
//! 3. **Collection**: candidates from the selected source
//! 4. **Screening**: relevance verdict, then summary, per candidate
//! 5. **Output**: structured response, console report, JSON file

use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod api;
mod cli;
mod config;
mod error;
mod models;
mod outputs;
mod pipeline;
mod query;
mod relevance;
mod sources;
mod summarize;
mod utils;

use cli::Cli;
use config::AgentConfig;
use outputs::{json, report};
use pipeline::Pipeline;
use query::{FixedKeywords, KeywordPrompt};
use utils::ensure_writable_dir;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("sar_news_agent starting up");

    let args = Cli::parse();
    debug!(config = ?args.config, json_output_dir = ?args.json_output_dir, "Parsed CLI arguments");

    let config = AgentConfig::load(&args).inspect_err(|e| {
        error!(error = %e, "Invalid configuration");
    })?;
    info!(
        source = ?config.pipeline.source,
        relevance = ?config.pipeline.relevance,
        summarizer = ?config.pipeline.summarizer,
        concurrency = config.pipeline.concurrency,
        "Configuration resolved"
    );

    // Early check: ensure JSON output dir is writable
    if let Some(dir) = &args.json_output_dir {
        if let Err(e) = ensure_writable_dir(dir).await {
            error!(
                path = %dir,
                error = %e,
                "JSON output directory is not writable (fix perms or choose a different path)"
            );
            return Err(e.into());
        }
    }

    let pipeline = Pipeline::from_config(&config)?;

    let response = if args.keywords.is_empty() && !args.no_prompt {
        pipeline.handle(&args.request, &mut KeywordPrompt::stdio()).await
    } else {
        let mut keywords = FixedKeywords(args.keywords.clone());
        pipeline.handle(&args.request, &mut keywords).await
    };

    print!("{}", report::render(&response));

    if let Some(dir) = &args.json_output_dir {
        match json::write_report(&response, dir).await {
            Ok(path) => info!(path = %path.display(), "JSON report written"),
            Err(e) => error!(path = %dir, error = %e, "Failed to write JSON report"),
        }
    }

    if response.is_error() {
        warn!("Run finished with an error response");
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        items = response.items().len(),
        "Execution complete"
    );

    Ok(())
}
