//! Runtime configuration.
//!
//! Built once at start from three layers, highest precedence first: CLI
//! flags, an optional YAML file, and built-in defaults. The resulting
//! [`AgentConfig`] is immutable and handed to the pipeline explicitly.
//!
//! # YAML layout
//!
//! Every key is optional:
//!
//! ```yaml
//! pipeline: { source: scrape, relevance: model, summarizer: keyword, concurrency: 2 }
//! news_api: { endpoint: "https://newsapi.org/v2/top-headlines", language: en, page_size: 5 }
//! model: { base_url: "https://api.openai.com/v1", model: gpt-4o-mini, timeout_secs: 30 }
//! scrape:
//!   min_block_len: 50
//!   sites:
//!     - { name: CNN Lite, url: "https://lite.cnn.com" }
//! http: { timeout_secs: 10 }
//! limits: { classify_chars: 1500, summary_chars: 3000 }
//! ```

use clap::ValueEnum;
use serde::Deserialize;
use std::fmt;
use tracing::{info, instrument};

use crate::cli::Cli;
use crate::error::AgentError;

/// Candidate collection strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceKind {
    /// Keyword search against the news API.
    NewsApi,
    /// Scrape the configured site homepages.
    Scrape,
}

/// Relevance / summarization strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StrategyKind {
    /// SAR vocabulary matching, no external calls.
    Keyword,
    /// Delegate to the text-generation service.
    Model,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PipelineSettings {
    pub source: SourceKind,
    pub relevance: StrategyKind,
    pub summarizer: StrategyKind,
    /// Candidates evaluated at once; results keep discovery order.
    pub concurrency: usize,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            source: SourceKind::NewsApi,
            relevance: StrategyKind::Model,
            summarizer: StrategyKind::Model,
            concurrency: 1,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NewsApiSettings {
    pub endpoint: String,
    pub language: String,
    pub page_size: u32,
}

impl Default for NewsApiSettings {
    fn default() -> Self {
        Self {
            endpoint: "https://newsapi.org/v2/top-headlines".to_string(),
            language: "en".to_string(),
            page_size: 5,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ModelSettings {
    /// OpenAI-compatible API root, without the `/chat/completions` suffix.
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
    pub max_calls_per_run: usize,
    /// Whole words that make a classifier reply count as "relevant".
    pub affirmative_tokens: Vec<String>,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
            timeout_secs: 30,
            max_calls_per_run: 20,
            affirmative_tokens: vec!["yes".to_string(), "likely".to_string()],
        }
    }
}

/// A named site entry point for the scrape strategy.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SiteEntry {
    pub name: String,
    pub url: String,
}

impl SiteEntry {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScrapeSettings {
    pub sites: Vec<SiteEntry>,
    /// Text blocks at or below this many characters are dropped.
    pub min_block_len: usize,
    pub max_articles_per_site: usize,
    pub user_agent: String,
}

impl Default for ScrapeSettings {
    fn default() -> Self {
        Self {
            sites: vec![
                SiteEntry::new("CNN Lite", "https://lite.cnn.com"),
                SiteEntry::new("NPR Text", "https://text.npr.org"),
                SiteEntry::new("AP News", "https://apnews.com/hub/natural-disasters"),
                SiteEntry::new("BBC News", "https://www.bbc.com/news"),
            ],
            min_block_len: 50,
            max_articles_per_site: 10,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/124.0 Safari/537.36"
                .to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpSettings {
    pub timeout_secs: u64,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self { timeout_secs: 10 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LimitSettings {
    /// Content prefix sent to the classifier.
    pub classify_chars: usize,
    /// Content prefix sent to the summarizer.
    pub summary_chars: usize,
    /// Vocabulary sentences kept per candidate.
    pub keyword_sentences: usize,
    /// Sentences joined into a keyword summary.
    pub summary_sentences: usize,
}

impl Default for LimitSettings {
    fn default() -> Self {
        Self {
            classify_chars: 1500,
            summary_chars: 3000,
            keyword_sentences: 5,
            summary_sentences: 3,
        }
    }
}

/// API keys, read once at start.
#[derive(Clone, Default)]
pub struct Credentials {
    pub news_api_key: Option<String>,
    pub openai_api_key: Option<String>,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |k: &Option<String>| if k.is_some() { "<redacted>" } else { "<unset>" };
        f.debug_struct("Credentials")
            .field("news_api_key", &redact(&self.news_api_key))
            .field("openai_api_key", &redact(&self.openai_api_key))
            .finish()
    }
}

/// Everything the pipeline needs, resolved once.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    pub pipeline: PipelineSettings,
    pub news_api: NewsApiSettings,
    pub model: ModelSettings,
    pub scrape: ScrapeSettings,
    pub http: HttpSettings,
    pub limits: LimitSettings,
    #[serde(skip)]
    pub credentials: Credentials,
}

impl AgentConfig {
    /// Parse the YAML layer. An empty document yields the defaults.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, AgentError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(yaml).map_err(|e| AgentError::Config(e.to_string()))
    }

    /// Resolve the full configuration from the CLI and the optional file it names.
    #[instrument(level = "info", skip_all, fields(config = ?cli.config))]
    pub fn load(cli: &Cli) -> Result<Self, AgentError> {
        let mut config = match &cli.config {
            Some(path) => {
                let yaml = std::fs::read_to_string(path)?;
                info!(path = %path, "Loaded configuration file");
                Self::from_yaml_str(&yaml)?
            }
            None => Self::default(),
        };
        config.apply_cli(cli);
        config.validate()?;
        Ok(config)
    }

    fn apply_cli(&mut self, cli: &Cli) {
        if let Some(source) = cli.source {
            self.pipeline.source = source;
        }
        if let Some(relevance) = cli.relevance {
            self.pipeline.relevance = relevance;
        }
        if let Some(summarizer) = cli.summarizer {
            self.pipeline.summarizer = summarizer;
        }
        if let Some(concurrency) = cli.concurrency {
            self.pipeline.concurrency = concurrency;
        }
        if let Some(max_calls) = cli.max_model_calls {
            self.model.max_calls_per_run = max_calls;
        }
        if let Some(model) = &cli.model {
            self.model.model = model.clone();
        }
        self.credentials = Credentials {
            news_api_key: non_blank(cli.news_api_key.as_deref()),
            openai_api_key: non_blank(cli.openai_api_key.as_deref()),
        };
    }

    fn validate(&self) -> Result<(), AgentError> {
        if self.pipeline.concurrency == 0 {
            return Err(AgentError::Config("concurrency must be at least 1".to_string()));
        }
        if self.model.affirmative_tokens.iter().all(|t| t.trim().is_empty()) {
            return Err(AgentError::Config(
                "model.affirmative_tokens must name at least one word".to_string(),
            ));
        }
        Ok(())
    }

    /// Whether any selected stage calls the text-generation service.
    pub fn uses_model(&self) -> bool {
        self.pipeline.relevance == StrategyKind::Model
            || self.pipeline.summarizer == StrategyKind::Model
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_defaults() {
        let config = AgentConfig::default();
        assert_eq!(config.pipeline.source, SourceKind::NewsApi);
        assert_eq!(config.news_api.page_size, 5);
        assert_eq!(config.http.timeout_secs, 10);
        assert_eq!(config.limits.classify_chars, 1500);
        assert_eq!(config.limits.keyword_sentences, 5);
        assert!(!config.scrape.sites.is_empty());
        assert!(config.uses_model());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let yaml = r#"
pipeline:
  source: scrape
  relevance: keyword
scrape:
  min_block_len: 80
  sites:
    - name: Local Paper
      url: "https://paper.example.com"
"#;
        let config = AgentConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.pipeline.source, SourceKind::Scrape);
        assert_eq!(config.pipeline.relevance, StrategyKind::Keyword);
        assert_eq!(config.pipeline.summarizer, StrategyKind::Model);
        assert_eq!(config.scrape.min_block_len, 80);
        assert_eq!(config.scrape.sites, vec![SiteEntry::new("Local Paper", "https://paper.example.com")]);
        assert_eq!(config.model.model, "gpt-4o-mini");
    }

    #[test]
    fn test_bad_yaml_is_config_error() {
        let err = AgentConfig::from_yaml_str("pipeline: [1, 2").unwrap_err();
        assert_eq!(err.kind(), "config");
    }

    #[test]
    fn test_cli_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("agent.yaml");
        std::fs::write(&path, "pipeline:\n  source: scrape\nmodel:\n  model: file-model\n").unwrap();

        let cli = Cli::parse_from([
            "sar_news_agent",
            "-c",
            path.to_str().unwrap(),
            "--source",
            "news-api",
            "--model",
            "cli-model",
            "--news-api-key",
            "  ",
            "--openai-api-key",
            "sk-test",
        ]);
        let config = AgentConfig::load(&cli).unwrap();
        assert_eq!(config.pipeline.source, SourceKind::NewsApi);
        assert_eq!(config.model.model, "cli-model");
        assert!(config.credentials.news_api_key.is_none());
        assert_eq!(config.credentials.openai_api_key.as_deref(), Some("sk-test"));
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        let cli = Cli::parse_from(["sar_news_agent", "--concurrency", "0"]);
        assert!(AgentConfig::load(&cli).is_err());
    }

    #[test]
    fn test_credentials_debug_is_redacted() {
        let creds = Credentials {
            news_api_key: Some("secret-news".to_string()),
            openai_api_key: None,
        };
        let shown = format!("{creds:?}");
        assert!(!shown.contains("secret-news"));
        assert!(shown.contains("<redacted>"));
        assert!(shown.contains("<unset>"));
    }
}
