//! Candidate collection.
//!
//! Two interchangeable strategies sit behind [`CandidateSource`]:
//!
//! | Strategy | Module | Method | Notes |
//! |----------|--------|--------|-------|
//! | News API | [`news_api`] | keyword search | Needs `NEWS_API_KEY`; one request per run |
//! | Scrape | [`sites`] | HTML scraping | Fixed site list from configuration |
//!
//! Whatever goes wrong inside a strategy ends up in [`Collection::failures`]
//! next to whatever candidates were still found; collection itself never
//! fails. Only when every attempted unit (the one search, or every site)
//! failed does [`Collection::failed_entirely`] hold.

use reqwest::Client;
use std::collections::HashSet;
use std::time::Duration;
use tracing::{error, info};

use crate::config::{AgentConfig, SourceKind};
use crate::error::AgentError;
use crate::models::{ArticleCandidate, NO_URL};
use crate::query::Query;

pub mod html;
pub mod news_api;
pub mod sites;

use news_api::NewsApiSource;
use sites::SiteScraper;

/// Candidates found in one run plus the errors met along the way.
#[derive(Debug, Default)]
pub struct Collection {
    pub candidates: Vec<ArticleCandidate>,
    pub failures: Vec<AgentError>,
    /// Units of work tried: searches issued or sites visited.
    pub attempted: usize,
}

impl Collection {
    /// Result of a single successful unit of work.
    pub fn found(candidates: Vec<ArticleCandidate>) -> Self {
        Self {
            candidates,
            failures: Vec::new(),
            attempted: 1,
        }
    }

    /// Result of a single failed unit of work.
    pub fn failed(err: AgentError) -> Self {
        Self {
            candidates: Vec::new(),
            failures: vec![err],
            attempted: 1,
        }
    }

    /// Every attempted unit failed, so the empty result says nothing about the news.
    pub fn failed_entirely(&self) -> bool {
        self.attempted > 0 && self.failures.len() >= self.attempted
    }

    /// Drop repeated urls, keeping the first occurrence.
    ///
    /// Candidates carrying the [`NO_URL`] placeholder are all kept.
    pub fn dedup(mut self) -> Self {
        let before = self.candidates.len();
        let mut seen = HashSet::new();
        self.candidates
            .retain(|c| c.url == NO_URL || seen.insert(c.url.clone()));
        if self.candidates.len() < before {
            info!(dropped = before - self.candidates.len(), "Dropped duplicate candidates");
        }
        self
    }
}

/// Anything that can produce candidates for a query.
pub trait CandidateSource {
    async fn collect(&self, query: &Query) -> Collection;
}

/// The configured collection strategy.
#[derive(Debug)]
pub enum SourceStrategy {
    NewsApi(NewsApiSource),
    Scrape(SiteScraper),
}

/// HTTP client for news search and page fetches: bounded timeout, browser UA.
pub fn http_client(config: &AgentConfig) -> Result<Client, AgentError> {
    Ok(Client::builder()
        .timeout(Duration::from_secs(config.http.timeout_secs))
        .user_agent(config.scrape.user_agent.clone())
        .build()?)
}

impl SourceStrategy {
    pub fn from_config(config: &AgentConfig, client: Client) -> Self {
        match config.pipeline.source {
            SourceKind::NewsApi => SourceStrategy::NewsApi(NewsApiSource::new(
                client,
                config.news_api.clone(),
                config.credentials.news_api_key.clone(),
            )),
            SourceKind::Scrape => {
                SourceStrategy::Scrape(SiteScraper::new(client, config.scrape.clone()))
            }
        }
    }
}

impl CandidateSource for SourceStrategy {
    async fn collect(&self, query: &Query) -> Collection {
        let collection = match self {
            SourceStrategy::NewsApi(api) => match api.search(query).await {
                Ok(candidates) => Collection::found(candidates),
                Err(e) => {
                    error!(error = %e, "News search failed");
                    Collection::failed(e)
                }
            },
            SourceStrategy::Scrape(scraper) => scraper.collect().await,
        };
        collection.dedup()
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteEntry;
    use testing::serve;

    #[test]
    fn test_http_client_builds_from_config() {
        assert!(http_client(&AgentConfig::default()).is_ok());
    }

    #[test]
    fn test_dedup_keeps_first() {
        let collection = Collection {
            candidates: vec![
                ArticleCandidate::new("a", "https://x/1", "first"),
                ArticleCandidate::new("b", "https://x/2", "other"),
                ArticleCandidate::new("c", "https://x/1", "second"),
            ],
            ..Collection::default()
        }
        .dedup();
        assert_eq!(collection.candidates.len(), 2);
        assert_eq!(collection.candidates[0].content, "first");
    }

    #[test]
    fn test_dedup_keeps_every_url_less_candidate() {
        let collection = Collection {
            candidates: vec![
                ArticleCandidate::new("Flood rescue A", NO_URL, "a"),
                ArticleCandidate::new("Keyed", "https://x/1", "k"),
                ArticleCandidate::new("Flood rescue B", NO_URL, "b"),
                ArticleCandidate::new("Keyed again", "https://x/1", "k2"),
            ],
            ..Collection::default()
        }
        .dedup();
        let titles: Vec<&str> = collection.candidates.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, vec!["Flood rescue A", "Keyed", "Flood rescue B"]);
    }

    #[test]
    fn test_failed_entirely() {
        let mut collection = Collection {
            attempted: 2,
            ..Collection::default()
        };
        collection.failures.push(AgentError::from_status("web page", 503));
        assert!(!collection.failed_entirely());
        collection.failures.push(AgentError::Transport("reset".to_string()));
        assert!(collection.failed_entirely());
        assert!(!Collection::default().failed_entirely());
    }

    #[tokio::test]
    async fn test_news_api_failure_is_recorded() {
        let server = serve(vec![("/search", 401, "{}".to_string())]).await;
        let mut config = AgentConfig::default();
        config.news_api.endpoint = format!("{}/search", server.base);
        config.credentials.news_api_key = Some("bad".to_string());

        let source = SourceStrategy::from_config(&config, testing::client());
        let collection = source.collect(&Query::from_keywords(["rescue"])).await;
        assert!(collection.candidates.is_empty());
        assert_eq!(collection.failures.len(), 1);
        assert_eq!(collection.failures[0].kind(), "unauthorized");
        assert!(collection.failed_entirely());
    }

    #[tokio::test]
    async fn test_news_api_keeps_url_less_articles() {
        let server = serve(vec![(
            "/search",
            200,
            r#"{"articles":[
                {"title":"Flood rescue A","description":"Crews rescued ten people."},
                {"title":"Flood rescue B","description":"A boat rescued a family."}
            ]}"#
            .to_string(),
        )])
        .await;
        let mut config = AgentConfig::default();
        config.news_api.endpoint = format!("{}/search", server.base);
        config.credentials.news_api_key = Some("key".to_string());

        let source = SourceStrategy::from_config(&config, testing::client());
        let collection = source.collect(&Query::from_keywords(["rescue"])).await;
        let titles: Vec<&str> = collection.candidates.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, vec!["Flood rescue A", "Flood rescue B"]);
    }

    #[tokio::test]
    async fn test_scrape_strategy_dedups_across_sites() {
        let story = serve(vec![("/story", 200, "<p>short</p>".to_string())]).await;
        let page = format!(
            r#"<article><h2>Rescue</h2><a href="{}/story">x</a></article>"#,
            story.base
        );
        let one = serve(vec![("/", 200, page.clone())]).await;
        let two = serve(vec![("/", 200, page)]).await;
        let mut config = AgentConfig::default();
        config.pipeline.source = SourceKind::Scrape;
        config.scrape.sites = vec![
            SiteEntry::new("One", one.base.clone()),
            SiteEntry::new("Two", two.base.clone()),
        ];

        let source = SourceStrategy::from_config(&config, testing::client());
        let collection = source.collect(&Query::from_keywords(["rescue"])).await;
        assert_eq!(collection.candidates.len(), 1);
        assert_eq!(collection.candidates[0].url, format!("{}/story", story.base));
        assert_eq!(collection.candidates[0].title, "Rescue");
    }
}
