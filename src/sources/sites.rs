//! Homepage scraping across a fixed list of news sites.
//!
//! Each site is handled in two phases:
//!
//! 1. **Indexing**: fetch the entry page and pull article links out of
//!    article-like blocks, resolving relative links against the site url
//! 2. **Fetching**: download each linked page and reduce it to body text
//!
//! A site that fails to index is logged and contributes nothing; the other
//! sites are still scraped. A single article that fails to download is kept
//! with [`NO_CONTENT`] so relevance filtering drops it without a model call.

use reqwest::Client;
use tracing::{debug, error, info, instrument, warn};
use url::Url;

use crate::config::{ScrapeSettings, SiteEntry};
use crate::error::AgentError;
use crate::models::{ArticleCandidate, NO_CONTENT};
use crate::sources::Collection;
use crate::sources::html::{ArticleLink, article_links, page_text};

const SERVICE: &str = "web page";

#[derive(Debug)]
pub struct SiteScraper {
    client: Client,
    settings: ScrapeSettings,
}

impl SiteScraper {
    pub fn new(client: Client, settings: ScrapeSettings) -> Self {
        Self { client, settings }
    }

    #[instrument(level = "debug", skip(self))]
    async fn fetch_html(&self, url: &str) -> Result<String, AgentError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AgentError::from_status(SERVICE, status.as_u16()));
        }
        Ok(response.text().await?)
    }

    /// Article links on `site`'s entry page, capped per site.
    #[instrument(level = "info", skip_all, fields(site = %site.name))]
    pub async fn index_site(&self, site: &SiteEntry) -> Result<Vec<ArticleLink>, AgentError> {
        let base = Url::parse(&site.url)
            .map_err(|e| AgentError::Config(format!("bad url for site {}: {e}", site.name)))?;
        let html = self.fetch_html(&site.url).await?;

        let links: Vec<ArticleLink> = article_links(&html, &base)
            .into_iter()
            .take(self.settings.max_articles_per_site)
            .collect();

        info!(count = links.len(), source = %site.url, "Indexed article links");
        debug!(urls = ?links.iter().map(|l| &l.url).collect::<Vec<_>>(), "Article urls");
        Ok(links)
    }

    /// Body text of one article, [`NO_CONTENT`] when nothing readable is left.
    #[instrument(level = "info", skip_all, fields(%url))]
    pub async fn fetch_article_text(&self, url: &str) -> Result<String, AgentError> {
        let html = self.fetch_html(url).await?;
        let text = page_text(&html, self.settings.min_block_len);
        debug!(chars = text.chars().count(), "Parsed article");
        if text.is_empty() {
            Ok(NO_CONTENT.to_string())
        } else {
            Ok(text)
        }
    }

    /// Scrape every configured site in order.
    #[instrument(level = "info", skip_all, fields(sites = self.settings.sites.len()))]
    pub async fn collect(&self) -> Collection {
        let mut collection = Collection::default();

        for site in &self.settings.sites {
            collection.attempted += 1;
            let links = match self.index_site(site).await {
                Ok(links) => links,
                Err(e) => {
                    error!(site = %site.name, error = %e, "Site indexing failed; skipping site");
                    collection.failures.push(e);
                    continue;
                }
            };

            for link in links {
                let content = match self.fetch_article_text(&link.url).await {
                    Ok(text) => text,
                    Err(e) => {
                        warn!(url = %link.url, error = %e, "Article fetch failed");
                        NO_CONTENT.to_string()
                    }
                };
                collection
                    .candidates
                    .push(ArticleCandidate::new(link.title, link.url, content));
            }
        }

        info!(
            count = collection.candidates.len(),
            failed_sites = collection.failures.len(),
            "Scraped candidate articles"
        );
        collection
    }
}
