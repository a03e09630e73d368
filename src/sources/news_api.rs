//! Keyword search against a NewsAPI-compatible endpoint.
//!
//! One GET per run: the joined query, English only, capped page size. The
//! credential travels in the `X-Api-Key` header so it never shows up in
//! logged urls.
//!
//! # Response handling
//!
//! | Outcome | Result |
//! |---------|--------|
//! | 200 with `articles` | one candidate per entry, missing fields as sentinels |
//! | 200 without `articles` | no candidates |
//! | 401 | [`AgentError::Unauthorized`] |
//! | other non-2xx | [`AgentError::HttpStatus`] |
//! | body is not JSON | [`AgentError::Payload`] |

use reqwest::Client;
use serde_json::Value;
use std::fmt;
use tracing::{debug, info, instrument, warn};

use crate::config::NewsApiSettings;
use crate::error::AgentError;
use crate::models::{ArticleCandidate, NO_CONTENT, NO_TITLE, NO_URL};
use crate::query::Query;
use crate::utils::truncate_for_log;

const SERVICE: &str = "news search";

pub struct NewsApiSource {
    client: Client,
    settings: NewsApiSettings,
    api_key: Option<String>,
}

impl fmt::Debug for NewsApiSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewsApiSource")
            .field("settings", &self.settings)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

/// First non-blank string among `keys` of `entry`.
fn text_field<'a>(entry: &'a Value, keys: &[&str]) -> Option<&'a str> {
    keys.iter()
        .filter_map(|k| entry.get(*k).and_then(Value::as_str))
        .map(str::trim)
        .find(|s| !s.is_empty())
}

/// Turn a response body into candidates.
///
/// Content prefers the short `description`, then the longer `content`.
pub fn parse_articles(body: &str, limit: usize) -> Result<Vec<ArticleCandidate>, AgentError> {
    let payload: Value = serde_json::from_str(body)?;
    let entries = payload
        .get("articles")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();

    Ok(entries
        .iter()
        .take(limit)
        .map(|entry| {
            ArticleCandidate::new(
                text_field(entry, &["title"]).unwrap_or(NO_TITLE),
                text_field(entry, &["url"]).unwrap_or(NO_URL),
                text_field(entry, &["description", "content"]).unwrap_or(NO_CONTENT),
            )
        })
        .collect())
}

impl NewsApiSource {
    pub fn new(client: Client, settings: NewsApiSettings, api_key: Option<String>) -> Self {
        Self {
            client,
            settings,
            api_key,
        }
    }

    fn request_url(&self, query: &str) -> String {
        format!(
            "{}?q={}&language={}&pageSize={}",
            self.settings.endpoint,
            urlencoding::encode(query),
            urlencoding::encode(&self.settings.language),
            self.settings.page_size
        )
    }

    /// Search for `query`. An empty query returns no candidates without a request.
    #[instrument(level = "info", skip_all, fields(query = ?query.joined()))]
    pub async fn search(&self, query: &Query) -> Result<Vec<ArticleCandidate>, AgentError> {
        let Some(terms) = query.joined() else {
            warn!("No search query provided; skipping news search");
            return Ok(Vec::new());
        };
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(AgentError::MissingCredential { service: SERVICE })?;

        let response = self
            .client
            .get(self.request_url(&terms))
            .header("X-Api-Key", api_key)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "News search rejected the request");
            return Err(AgentError::from_status(SERVICE, status.as_u16()));
        }

        let body = response.text().await?;
        let candidates = parse_articles(&body, self.settings.page_size as usize).inspect_err(|e| {
            warn!(error = %e, body_preview = %truncate_for_log(&body, 200), "Unreadable news search payload");
        })?;

        info!(count = candidates.len(), "Received articles from news search");
        if let Some(first) = candidates.first() {
            debug!(title = %first.title, url = %first.url, "First article");
        }
        Ok(candidates)
    }
}
