//! Relevance filtering: does a candidate concern search-and-rescue work?
//!
//! Two strategies share one entry point, [`RelevanceStrategy::judge`]:
//!
//! - **Keyword**: split the text into sentences and keep those mentioning the
//!   SAR vocabulary. Relevant iff at least one sentence survives.
//! - **Model**: ask the text-generation service a yes/no question about a
//!   bounded prefix of the text and read the reply with [`is_affirmative`].
//!
//! Candidates without usable content are never sent to the model, and a
//! failed model call counts as "not relevant".

use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, instrument, warn};

use crate::api::AskAsync;
use crate::config::{AgentConfig, StrategyKind};
use crate::models::{Verdict, has_usable_content};
use crate::query::Query;
use crate::utils::{prefix_chars, truncate_for_log};

/// SAR-domain terms, matched case-insensitively as substrings.
pub const SAR_VOCABULARY: &[&str] = &[
    "search and rescue",
    "rescue",
    "missing person",
    "missing",
    "evacuat",
    "disaster",
    "emergency",
    "stranded",
    "survivor",
    "trapped",
    "lifeboat",
    "coast guard",
    "avalanche",
    "flood",
    "earthquake",
    "wildfire",
    "hurricane",
    "first responder",
];

/// Words that flip the meaning of the affirmative token right after them.
const NEGATORS: &[&str] = &["not", "no", "never", "isn't", "isn’t"];

static SENTENCE_BREAK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[.!?]+\s+").expect("sentence break pattern is valid"));

/// Split text on sentence-ending punctuation followed by whitespace.
///
/// Punctuation stays with its sentence; blank pieces are dropped.
pub fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    for m in SENTENCE_BREAK.find_iter(text) {
        let end = m.start() + m.as_str().trim_end().len();
        let sentence = text[start..end].trim();
        if !sentence.is_empty() {
            sentences.push(sentence);
        }
        start = m.end();
    }
    let tail = text[start..].trim();
    if !tail.is_empty() {
        sentences.push(tail);
    }
    sentences
}

/// Vocabulary terms present in `text`.
pub fn matched_terms(text: &str) -> Vec<&'static str> {
    let lowered = text.to_lowercase();
    SAR_VOCABULARY
        .iter()
        .copied()
        .filter(|term| lowered.contains(term))
        .collect()
}

/// The first `cap` sentences of `text` that mention the SAR vocabulary.
pub fn relevant_sentences(text: &str, cap: usize) -> Vec<&str> {
    split_sentences(text)
        .into_iter()
        .filter(|s| !matched_terms(s).is_empty())
        .take(cap)
        .collect()
}

/// Decide whether a classifier reply means "relevant".
///
/// The reply is lower-cased and split into words (apostrophes stay inside
/// words). It is affirmative when:
/// - it does not open with the word "no", and
/// - some word equals one of `tokens` and the word before it is not a
///   negator ("not", "no", "never", "isn't").
///
/// So "Yes, this concerns a rescue" and "Likely relevant" pass, while
/// "No, not related", "unlikely", and "not likely" do not.
pub fn is_affirmative(reply: &str, tokens: &[String]) -> bool {
    let lowered = reply.to_lowercase();
    let words: Vec<&str> = lowered
        .split(|c: char| !(c.is_alphanumeric() || c == '\'' || c == '’'))
        .filter(|w| !w.is_empty())
        .collect();

    if words.first().is_some_and(|w| *w == "no") {
        return false;
    }

    words.iter().enumerate().any(|(i, word)| {
        let is_token = tokens.iter().any(|t| t.trim().eq_ignore_ascii_case(word));
        let negated = i > 0 && NEGATORS.contains(&words[i - 1]);
        is_token && !negated
    })
}

/// Vocabulary-matching relevance check.
#[derive(Debug, Clone)]
pub struct KeywordRelevance {
    pub max_sentences: usize,
}

impl KeywordRelevance {
    pub fn judge(&self, content: &str) -> Verdict {
        if !has_usable_content(content) {
            return Verdict::not_relevant("Article has no valid content to analyze.");
        }
        let sentences = relevant_sentences(content, self.max_sentences);
        if sentences.is_empty() {
            return Verdict::not_relevant("No SAR-related terms found in the article.");
        }
        let terms = sentences
            .iter()
            .flat_map(|s| matched_terms(s))
            .unique()
            .join(", ");
        Verdict::relevant(format!(
            "{} sentence(s) mention SAR terms: {}",
            sentences.len(),
            terms
        ))
    }
}

/// Model-backed relevance check.
#[derive(Debug, Clone)]
pub struct ModelRelevance {
    /// Characters of content included in the prompt.
    pub max_chars: usize,
    pub affirmative_tokens: Vec<String>,
}

impl ModelRelevance {
    pub fn prompt(&self, content: &str, query: &Query) -> String {
        let terms = query.joined().unwrap_or_else(|| "(none)".to_string());
        format!(
            "Determine if the following article is relevant to Search and Rescue (SAR) efforts \
             based on the search words: {terms}.\n\
             If the article is related to SAR operations (e.g., rescues, missing persons, \
             disaster response), return 'Yes' with a brief explanation.\n\
             Otherwise, return 'No'.\n\n\
             Article:\n{}",
            prefix_chars(content, self.max_chars)
        )
    }

    #[instrument(level = "info", skip_all)]
    pub async fn judge<M: AskAsync>(&self, model: &M, content: &str, query: &Query) -> Verdict {
        if !has_usable_content(content) {
            debug!("Skipping classification of empty content");
            return Verdict::not_relevant("Article has no valid content to analyze.");
        }

        match model.ask(&self.prompt(content, query)).await {
            Ok(reply) => {
                let explanation = reply.to_lowercase();
                let relevant = is_affirmative(&explanation, &self.affirmative_tokens);
                debug!(
                    relevant,
                    reply_preview = %truncate_for_log(&explanation, 200),
                    "Classifier replied"
                );
                Verdict {
                    is_relevant: relevant,
                    explanation,
                }
            }
            Err(e) => {
                warn!(error = %e, "Relevance check failed; treating as not relevant");
                Verdict::not_relevant(format!("Relevance check failed: {e}"))
            }
        }
    }
}

/// The configured relevance strategy.
#[derive(Debug, Clone)]
pub enum RelevanceStrategy {
    Keyword(KeywordRelevance),
    Model(ModelRelevance),
}

impl RelevanceStrategy {
    pub fn from_config(config: &AgentConfig) -> Self {
        match config.pipeline.relevance {
            StrategyKind::Keyword => RelevanceStrategy::Keyword(KeywordRelevance {
                max_sentences: config.limits.keyword_sentences,
            }),
            StrategyKind::Model => RelevanceStrategy::Model(ModelRelevance {
                max_chars: config.limits.classify_chars,
                affirmative_tokens: config.model.affirmative_tokens.clone(),
            }),
        }
    }

    pub async fn judge<M: AskAsync>(&self, model: &M, content: &str, query: &Query) -> Verdict {
        match self {
            RelevanceStrategy::Keyword(keyword) => keyword.judge(content),
            RelevanceStrategy::Model(classifier) => classifier.judge(model, content, query).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::ScriptedAsk;
    use crate::error::AgentError;
    use crate::models::NO_CONTENT;
    use crate::sources::html::page_text;

    fn tokens() -> Vec<String> {
        vec!["yes".to_string(), "likely".to_string()]
    }

    fn classifier() -> ModelRelevance {
        ModelRelevance {
            max_chars: 1500,
            affirmative_tokens: tokens(),
        }
    }

    #[test]
    fn test_split_sentences() {
        let text = "Crews searched overnight. Was anyone hurt? No!  The ridge is closed.";
        assert_eq!(
            split_sentences(text),
            vec![
                "Crews searched overnight.",
                "Was anyone hurt?",
                "No!",
                "The ridge is closed."
            ]
        );
        assert!(split_sentences("   ").is_empty());
        // no whitespace after the dot, so no break
        assert_eq!(split_sentences("v1.2 released"), vec!["v1.2 released"]);
    }

    #[test]
    fn test_relevant_sentences_are_capped_and_matching() {
        let text = (0..9)
            .map(|i| format!("Rescue crew {i} arrived. The weather was calm."))
            .join(" ");
        let kept = relevant_sentences(&text, 5);
        assert_eq!(kept.len(), 5);
        assert!(kept.iter().all(|s| !matched_terms(s).is_empty()));
    }

    #[test]
    fn test_relevant_sentences_from_html_respect_cap_and_vocabulary() {
        let html = r#"<html><body><article>
            <p>The coast guard launched a search after a boat capsized near the harbour entrance late on Friday.</p>
            <p>Local cafes reported a quiet weekend with fewer tourists than usual across the whole town.</p>
            <p>Volunteers said the FLOOD waters rose quickly. Residents were trapped on roofs. Helicopters circled overhead for hours.</p>
            <p>Evacuations continued into Saturday. Survivors were taken to the school gym. Officials promised an emergency fund.</p>
        </article></body></html>"#;
        let text = page_text(html, 20);
        let kept = relevant_sentences(&text, 5);
        assert!(!kept.is_empty());
        assert!(kept.len() <= 5);
        for sentence in &kept {
            let lowered = sentence.to_lowercase();
            assert!(SAR_VOCABULARY.iter().any(|t| lowered.contains(t)), "{sentence}");
        }
        assert!(!kept.iter().any(|s| s.contains("quiet weekend")));
    }

    #[test]
    fn test_affirmative_predicate() {
        let t = tokens();
        assert!(is_affirmative("Yes, this article is related to SAR operations.", &t));
        assert!(is_affirmative("YES.", &t));
        assert!(is_affirmative("This is likely relevant to a rescue.", &t));
        assert!(!is_affirmative("No, this article is not related to SAR operations.", &t));
        assert!(!is_affirmative("Not related.", &t));
        assert!(!is_affirmative("Unlikely to involve rescuers.", &t));
        assert!(!is_affirmative("It is not likely to be relevant.", &t));
        assert!(!is_affirmative("Eyes on the storm", &t));
        assert!(!is_affirmative("", &t));
    }

    #[test]
    fn test_affirmative_predicate_uses_configured_tokens() {
        let strict = vec!["yes".to_string()];
        assert!(!is_affirmative("Likely relevant", &strict));
        assert!(is_affirmative("yes", &strict));
    }

    #[test]
    fn test_keyword_verdicts() {
        let keyword = KeywordRelevance { max_sentences: 5 };
        let verdict = keyword.judge("Rescuers found the missing hiker. The trail reopened.");
        assert!(verdict.is_relevant);
        assert!(verdict.explanation.contains("rescue"));
        assert!(verdict.explanation.contains("missing"));

        assert!(!keyword.judge("The football team won the championship.").is_relevant);
        assert!(!keyword.judge(NO_CONTENT).is_relevant);
    }

    #[tokio::test]
    async fn test_empty_content_never_reaches_model() {
        let model = ScriptedAsk::new().reply("yes");
        let query = Query::from_keywords(["rescue"]);
        for content in ["", "   ", NO_CONTENT] {
            let verdict = classifier().judge(&model, content, &query).await;
            assert!(!verdict.is_relevant);
        }
        assert_eq!(model.call_count(), 0);
    }

    #[tokio::test]
    async fn test_model_affirmative_reply() {
        let model = ScriptedAsk::new().reply("Yes, this article is related to SAR operations.");
        let query = Query::from_keywords(["rescue"]);
        let verdict = classifier()
            .judge(&model, "Rescue teams saved 5 people.", &query)
            .await;
        assert!(verdict.is_relevant);
        assert!(verdict.explanation.contains("sar operations"));

        let prompt = model.prompts.lock().unwrap()[0].clone();
        assert!(prompt.contains("search words: rescue"));
        assert!(prompt.contains("Rescue teams saved 5 people."));
    }

    #[tokio::test]
    async fn test_model_negative_reply() {
        let model = ScriptedAsk::new().reply("No, this article is not related to SAR operations.");
        let query = Query::from_keywords(["sports"]);
        let verdict = classifier()
            .judge(&model, "Football team wins championship.", &query)
            .await;
        assert!(!verdict.is_relevant);
        assert!(verdict.explanation.contains("not related to sar operations"));
    }

    #[tokio::test]
    async fn test_model_failure_fails_closed() {
        let model = ScriptedAsk::new().fail(AgentError::Transport("connection reset".to_string()));
        let verdict = classifier()
            .judge(&model, "Rescuers reached the cave.", &Query::default())
            .await;
        assert!(!verdict.is_relevant);
        assert!(verdict.explanation.contains("connection reset"));
    }

    #[test]
    fn test_prompt_is_bounded() {
        let long = "a".repeat(5000);
        let prompt = classifier().prompt(&long, &Query::default());
        assert!(prompt.contains(&"a".repeat(1500)));
        assert!(!prompt.contains(&"a".repeat(1501)));
    }
}
