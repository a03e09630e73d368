//! Data models for candidates, verdicts, and the agent's request/response envelope.
//!
//! This module defines the core data structures used throughout the application:
//! - [`ArticleCandidate`]: An article discovered by collection, not yet screened
//! - [`Verdict`]: The relevance decision for one candidate
//! - [`ResultItem`]: A relevant, summarized article (the externally visible unit)
//! - [`AgentRequest`] / [`AgentResponse`]: The structured command and reply
//!
//! Nothing here outlives a single pipeline run and nothing is mutated after
//! construction.

use crate::error::AgentError;
use serde::{Deserialize, Serialize};

/// Placeholder title for articles that arrive without one.
pub const NO_TITLE: &str = "No Title Available";
/// Placeholder url for articles that arrive without one.
pub const NO_URL: &str = "No URL Available";
/// Placeholder content for articles with no usable text.
pub const NO_CONTENT: &str = "No content available";
/// Summary used when there is nothing to summarize.
pub const NO_RELEVANT_CONTENT: &str = "No relevant content available to summarize.";
/// Message of the "ran fine, found nothing" response.
pub const NOTHING_FOUND: &str = "No SAR-related articles found after verification.";
/// The only action the agent understands.
pub const SEARCH_NEWS_ACTION: &str = "search_news";

/// An article discovered by collection.
///
/// The `url` is the unique key within one run. `content` may be the
/// [`NO_CONTENT`] sentinel when the source had no usable text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleCandidate {
    pub title: String,
    pub url: String,
    pub content: String,
}

impl ArticleCandidate {
    pub fn new(
        title: impl Into<String>,
        url: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            content: content.into(),
        }
    }

    /// `false` for empty, whitespace-only, or sentinel content.
    pub fn has_content(&self) -> bool {
        has_usable_content(&self.content)
    }
}

/// Shared predicate for "is this text worth sending anywhere".
pub fn has_usable_content(content: &str) -> bool {
    let trimmed = content.trim();
    !trimmed.is_empty() && trimmed != NO_CONTENT
}

/// Relevance decision for one candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub is_relevant: bool,
    pub explanation: String,
}

impl Verdict {
    pub fn relevant(explanation: impl Into<String>) -> Self {
        Self {
            is_relevant: true,
            explanation: explanation.into(),
        }
    }

    pub fn not_relevant(explanation: impl Into<String>) -> Self {
        Self {
            is_relevant: false,
            explanation: explanation.into(),
        }
    }
}

/// One relevant, summarized article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultItem {
    pub url: String,
    pub title: String,
    pub summary: String,
    /// Why the article was judged relevant.
    pub relevance: String,
}

/// Inbound command. Only [`SEARCH_NEWS_ACTION`] triggers the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentRequest {
    #[serde(default)]
    pub action: String,
}

impl AgentRequest {
    pub fn is_search_news(&self) -> bool {
        self.action == SEARCH_NEWS_ACTION
    }
}

/// Outbound reply. The `status` tag is the discriminant callers branch on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AgentResponse {
    /// Relevant articles, in discovery order.
    Results { items: Vec<ResultItem> },
    /// The run succeeded but nothing relevant turned up.
    NoRelevantArticles { message: String },
    /// A dependency or request error stopped the run.
    Error { kind: String, message: String },
}

impl AgentResponse {
    pub fn nothing_found() -> Self {
        AgentResponse::NoRelevantArticles {
            message: NOTHING_FOUND.to_string(),
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        AgentResponse::Error {
            kind: "invalid_request".to_string(),
            message: message.into(),
        }
    }

    pub fn from_error(err: &AgentError) -> Self {
        AgentResponse::Error {
            kind: err.kind().to_string(),
            message: err.to_string(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, AgentResponse::Error { .. })
    }

    pub fn items(&self) -> &[ResultItem] {
        match self {
            AgentResponse::Results { items } => items,
            _ => &[],
        }
    }
}
