//! Command-line interface definitions for the SAR news agent.
//!
//! This module defines the CLI arguments and options using the `clap` crate.
//! Credentials are read from the environment when not passed as flags.

use clap::Parser;

use crate::config::{SourceKind, StrategyKind};

/// Command-line arguments for the SAR news agent.
///
/// # Examples
///
/// ```sh
/// # Search NewsAPI for two keywords, judge and summarize with the model
/// sar_news_agent -k flood -k evacuation
///
/// # Scrape the configured sites and screen them with keyword matching only
/// sar_news_agent --source scrape --relevance keyword --summarizer keyword --no-prompt -k rescue
///
/// # Write the JSON report next to the console output
/// sar_news_agent -j ./reports -c ./agent.yaml
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to a YAML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Output directory for the JSON report
    #[arg(short, long)]
    pub json_output_dir: Option<String>,

    /// News search API key
    #[arg(long, env = "NEWS_API_KEY", hide_env_values = true)]
    pub news_api_key: Option<String>,

    /// Text-generation API key
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub openai_api_key: Option<String>,

    /// Where candidate articles come from
    #[arg(long, value_enum)]
    pub source: Option<SourceKind>,

    /// How candidates are judged for relevance
    #[arg(long, value_enum)]
    pub relevance: Option<StrategyKind>,

    /// How relevant candidates are summarized
    #[arg(long, value_enum)]
    pub summarizer: Option<StrategyKind>,

    /// Search keyword (repeatable, at most 4 are used)
    #[arg(short, long = "keyword")]
    pub keywords: Vec<String>,

    /// Never prompt for keywords on stdin
    #[arg(long)]
    pub no_prompt: bool,

    /// Inbound request as JSON
    #[arg(long, default_value = r#"{"action":"search_news"}"#)]
    pub request: String,

    /// Number of candidates evaluated at once
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Upper bound on model calls in one run
    #[arg(long)]
    pub max_model_calls: Option<usize>,

    /// Model name for classification and summarization
    #[arg(long)]
    pub model: Option<String>,
}
