//! Summarization of relevant candidates.
//!
//! - **Keyword**: join the first few SAR sentences of the article. Pure and
//!   deterministic, so identical content always yields the identical summary.
//! - **Model**: ask the text-generation service for a 3-4 sentence synopsis
//!   of a bounded prefix of the article.
//!
//! Neither strategy fails: empty content short-circuits to
//! [`NO_RELEVANT_CONTENT`], and a failed model call becomes an inline error
//! string in the summary.

use tracing::{debug, instrument, warn};

use crate::api::AskAsync;
use crate::config::{AgentConfig, StrategyKind};
use crate::models::{NO_RELEVANT_CONTENT, has_usable_content};
use crate::relevance::relevant_sentences;
use crate::utils::{prefix_chars, truncate_for_log};

#[derive(Debug, Clone)]
pub struct KeywordSummarizer {
    pub max_sentences: usize,
}

impl KeywordSummarizer {
    pub fn summarize(&self, content: &str) -> String {
        if !has_usable_content(content) {
            return NO_RELEVANT_CONTENT.to_string();
        }
        let sentences = relevant_sentences(content, self.max_sentences);
        if sentences.is_empty() {
            NO_RELEVANT_CONTENT.to_string()
        } else {
            sentences.join(" ")
        }
    }
}

#[derive(Debug, Clone)]
pub struct ModelSummarizer {
    /// Characters of content included in the prompt.
    pub max_chars: usize,
}

impl ModelSummarizer {
    pub fn prompt(&self, content: &str) -> String {
        format!(
            "Summarize the following news article in 3-4 sentences while preserving key details:\n\n{}",
            prefix_chars(content, self.max_chars)
        )
    }

    #[instrument(level = "info", skip_all)]
    pub async fn summarize<M: AskAsync>(&self, model: &M, content: &str) -> String {
        if !has_usable_content(content) {
            return NO_RELEVANT_CONTENT.to_string();
        }
        match model.ask(&self.prompt(content)).await {
            Ok(summary) => {
                debug!(preview = %truncate_for_log(&summary, 200), "Model summary");
                summary
            }
            Err(e) => {
                warn!(error = %e, "Summarization failed");
                format!("Error generating summary: {e}")
            }
        }
    }
}

/// The configured summarization strategy.
#[derive(Debug, Clone)]
pub enum Summarizer {
    Keyword(KeywordSummarizer),
    Model(ModelSummarizer),
}

impl Summarizer {
    pub fn from_config(config: &AgentConfig) -> Self {
        match config.pipeline.summarizer {
            StrategyKind::Keyword => Summarizer::Keyword(KeywordSummarizer {
                max_sentences: config.limits.summary_sentences,
            }),
            StrategyKind::Model => Summarizer::Model(ModelSummarizer {
                max_chars: config.limits.summary_chars,
            }),
        }
    }

    pub async fn summarize<M: AskAsync>(&self, model: &M, content: &str) -> String {
        match self {
            Summarizer::Keyword(keyword) => keyword.summarize(content),
            Summarizer::Model(generator) => generator.summarize(model, content).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::ScriptedAsk;
    use crate::error::AgentError;
    use crate::models::NO_CONTENT;

    const ARTICLE: &str = "Rescuers reached the stranded climbers at dawn. The weather was clear. \
                           A helicopter evacuated two of them. Emergency crews stayed overnight. \
                           Four survivors were treated for exposure. The park reopened on Monday.";

    #[test]
    fn test_keyword_summary_joins_top_sentences() {
        let summarizer = KeywordSummarizer { max_sentences: 3 };
        assert_eq!(
            summarizer.summarize(ARTICLE),
            "Rescuers reached the stranded climbers at dawn. A helicopter evacuated two of them. \
             Emergency crews stayed overnight."
        );
    }

    #[test]
    fn test_keyword_summary_is_idempotent() {
        let summarizer = KeywordSummarizer { max_sentences: 3 };
        assert_eq!(summarizer.summarize(ARTICLE), summarizer.summarize(ARTICLE));
    }

    #[test]
    fn test_keyword_summary_without_matches() {
        let summarizer = KeywordSummarizer { max_sentences: 3 };
        assert_eq!(summarizer.summarize("Markets closed higher."), NO_RELEVANT_CONTENT);
        assert_eq!(summarizer.summarize(NO_CONTENT), NO_RELEVANT_CONTENT);
    }

    #[tokio::test]
    async fn test_model_summary() {
        let model = ScriptedAsk::new().reply("SAR teams rescued a stranded hiker near the ridge.");
        let summarizer = ModelSummarizer { max_chars: 3000 };
        let summary = summarizer.summarize(&model, "SAR teams saved a hiker.").await;
        assert_eq!(summary, "SAR teams rescued a stranded hiker near the ridge.");
        assert!(model.prompts.lock().unwrap()[0].contains("3-4 sentences"));
    }

    #[tokio::test]
    async fn test_model_summary_skips_empty_content() {
        let model = ScriptedAsk::new().reply("should not be used");
        let summarizer = ModelSummarizer { max_chars: 3000 };
        assert_eq!(summarizer.summarize(&model, "").await, NO_RELEVANT_CONTENT);
        assert_eq!(summarizer.summarize(&model, NO_CONTENT).await, NO_RELEVANT_CONTENT);
        assert_eq!(model.call_count(), 0);
    }

    #[tokio::test]
    async fn test_model_failure_becomes_inline_error() {
        let model = ScriptedAsk::new().fail(AgentError::Timeout { after_secs: 30 });
        let summarizer = ModelSummarizer { max_chars: 3000 };
        let summary = summarizer.summarize(&model, "Flood rescue underway.").await;
        assert!(summary.starts_with("Error generating summary:"));
        assert!(summary.contains("timed out"));
    }

    #[test]
    fn test_summary_prompt_is_bounded() {
        let summarizer = ModelSummarizer { max_chars: 10 };
        let prompt = summarizer.prompt("0123456789ABCDEF");
        assert!(prompt.ends_with("0123456789"));
    }
}
