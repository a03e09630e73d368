//! Pipeline orchestration: request → query → candidates → verdicts → summaries.
//!
//! [`Pipeline::handle`] is the only entry point callers need. It validates the
//! request, acquires the query, and runs the stages in order. Every outcome,
//! including dependency failures, comes back as an [`AgentResponse`]; nothing
//! escapes as an error.
//!
//! Candidates are evaluated `concurrency` at a time (1 by default) and the
//! results keep discovery order.

use futures::stream::{self, StreamExt};
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

use crate::api::{AskAsync, GuardedAsk, OpenAiChat};
use crate::config::AgentConfig;
use crate::error::AgentError;
use crate::models::{AgentRequest, AgentResponse, ArticleCandidate, ResultItem};
use crate::query::{KeywordSource, Query, acquire};
use crate::relevance::RelevanceStrategy;
use crate::sources::{CandidateSource, SourceStrategy, http_client};
use crate::summarize::Summarizer;

const INVALID_REQUEST: &str = r#"Invalid request. Use {"action": "search_news"} to fetch SAR news."#;
const NO_KEYWORDS: &str = "No search keywords provided; collection skipped.";

pub struct Pipeline<S, M> {
    source: S,
    model: M,
    relevance: RelevanceStrategy,
    summarizer: Summarizer,
    concurrency: usize,
    /// Service whose credential is required by the selected strategies but absent.
    missing_credential: Option<&'static str>,
}

impl Pipeline<SourceStrategy, GuardedAsk<OpenAiChat>> {
    /// Wire the production collaborators from `config`.
    pub fn from_config(config: &AgentConfig) -> Result<Self, AgentError> {
        let source = SourceStrategy::from_config(config, http_client(config)?);
        let chat = OpenAiChat::new(&config.model, config.credentials.openai_api_key.clone())?;
        let model = GuardedAsk::from_settings(chat, &config.model);
        Ok(Self::new(source, model, config))
    }
}

impl<S, M> Pipeline<S, M>
where
    S: CandidateSource,
    M: AskAsync,
{
    pub fn new(source: S, model: M, config: &AgentConfig) -> Self {
        let missing_credential = (config.uses_model()
            && config.credentials.openai_api_key.is_none())
        .then_some("text generation");

        Self {
            source,
            model,
            relevance: RelevanceStrategy::from_config(config),
            summarizer: Summarizer::from_config(config),
            concurrency: config.pipeline.concurrency.max(1),
            missing_credential,
        }
    }

    /// Handle one raw JSON request, reading keywords from `keywords` only when
    /// the request is valid.
    #[instrument(level = "info", skip_all)]
    pub async fn handle<K: KeywordSource>(&self, request: &str, keywords: &mut K) -> AgentResponse {
        let request: AgentRequest = match serde_json::from_str(request) {
            Ok(request) => request,
            Err(e) => {
                warn!(error = %e, "Unreadable request");
                return AgentResponse::invalid_request(INVALID_REQUEST);
            }
        };
        if !request.is_search_news() {
            warn!(action = %request.action, "Unknown action");
            return AgentResponse::invalid_request(INVALID_REQUEST);
        }

        let query = acquire(keywords);
        info!(query = ?query.joined(), "Search query");
        self.run(&query).await
    }

    /// Run the full pipeline for a pre-built query.
    #[instrument(level = "info", skip_all, fields(keywords = query.keywords().len()))]
    pub async fn run(&self, query: &Query) -> AgentResponse {
        let t0 = Instant::now();

        if let Some(service) = self.missing_credential {
            let err = AgentError::MissingCredential { service };
            warn!(error = %err, "Cannot run without credential");
            return AgentResponse::from_error(&err);
        }
        if query.is_empty() {
            warn!("Empty query; skipping collection");
            return AgentResponse::NoRelevantArticles {
                message: NO_KEYWORDS.to_string(),
            };
        }

        self.model.start_run();
        let mut collection = self.source.collect(query).await;
        let total = collection.candidates.len();
        info!(
            count = total,
            attempted = collection.attempted,
            failures = collection.failures.len(),
            "Collected candidates"
        );

        if collection.candidates.is_empty() {
            if collection.failed_entirely() {
                let first = collection.failures.swap_remove(0);
                return AgentResponse::from_error(&first);
            }
            return AgentResponse::nothing_found();
        }

        let items: Vec<ResultItem> = stream::iter(collection.candidates)
            .map(|candidate| self.evaluate(candidate, query))
            .buffered(self.concurrency)
            .filter_map(std::future::ready)
            .collect()
            .await;

        info!(
            candidates = total,
            relevant = items.len(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Pipeline finished"
        );

        if items.is_empty() {
            warn!("No SAR-related articles found after verification");
            AgentResponse::nothing_found()
        } else {
            AgentResponse::Results { items }
        }
    }

    /// Verdict and, for relevant candidates, summary.
    async fn evaluate(&self, candidate: ArticleCandidate, query: &Query) -> Option<ResultItem> {
        if !candidate.has_content() {
            debug!(url = %candidate.url, "Skipping candidate without content");
            return None;
        }

        let verdict = self.relevance.judge(&self.model, &candidate.content, query).await;
        debug!(url = %candidate.url, relevant = verdict.is_relevant, "Verdict");
        if !verdict.is_relevant {
            return None;
        }

        let summary = self.summarizer.summarize(&self.model, &candidate.content).await;
        Some(ResultItem {
            url: candidate.url,
            title: candidate.title,
            summary,
            relevance: verdict.explanation,
        })
    }
}
