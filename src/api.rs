//! Text-generation API interaction with a per-call timeout and a per-run budget.
//!
//! Both relevance classification and summarization go through this module,
//! with different prompts.
//!
//! # Architecture
//!
//! - [`AskAsync`]: Core trait defining async LLM interaction
//! - [`OpenAiChat`]: OpenAI-compatible `chat/completions` client
//! - [`GuardedAsk`]: Decorator that bounds every call in time and caps the
//!   number of calls issued in one run
//!
//! Calls are one-shot. A failed call is reported to the caller, which decides
//! how to degrade; nothing here retries.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};
use tokio::time::timeout;
use tracing::{debug, error, instrument, warn};

use crate::config::ModelSettings;
use crate::error::AgentError;
use crate::utils::truncate_for_log;

const SERVICE: &str = "text generation";

/// Trait for async LLM interaction.
///
/// Implementors send a single user prompt and return the model's reply text.
/// This abstraction lets decorators and test doubles stand in for the real
/// service.
pub trait AskAsync {
    /// Send `prompt` to the model and return its reply.
    async fn ask(&self, prompt: &str) -> Result<String, AgentError>;

    /// Called once at the start of every pipeline run.
    fn start_run(&self) {}
}

impl<T: AskAsync> AskAsync for &T {
    async fn ask(&self, prompt: &str) -> Result<String, AgentError> {
        (**self).ask(prompt).await
    }

    fn start_run(&self) {
        (**self).start_run()
    }
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ReplyMessage,
}

#[derive(Deserialize)]
struct ReplyMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Pull the reply text out of a `chat/completions` response body.
fn parse_chat_reply(body: &str) -> Result<String, AgentError> {
    let response: ChatResponse = serde_json::from_str(body)?;
    let reply = response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .map(|content| content.trim().to_string())
        .ok_or_else(|| AgentError::Payload("no choices in model response".to_string()))?;
    if reply.is_empty() {
        return Err(AgentError::Model("model returned an empty reply".to_string()));
    }
    Ok(reply)
}

/// OpenAI-compatible chat client.
pub struct OpenAiChat {
    client: Client,
    api_key: Option<String>,
    base_url: String,
    model: String,
}

impl OpenAiChat {
    pub fn new(settings: &ModelSettings, api_key: Option<String>) -> Result<Self, AgentError> {
        let client = Client::builder().build()?;
        Ok(Self {
            client,
            api_key,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            model: settings.model.clone(),
        })
    }
}

impl fmt::Debug for OpenAiChat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiChat")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish()
    }
}

impl AskAsync for OpenAiChat {
    #[instrument(level = "info", skip_all, fields(model = %self.model))]
    async fn ask(&self, prompt: &str) -> Result<String, AgentError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(AgentError::MissingCredential { service: SERVICE })?;

        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        let t0 = Instant::now();
        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "Model call rejected");
            return Err(AgentError::from_status(SERVICE, status.as_u16()));
        }

        let body = response.text().await?;
        let reply = parse_chat_reply(&body)?;
        debug!(
            elapsed_ms = t0.elapsed().as_millis() as u64,
            reply_preview = %truncate_for_log(&reply, 200),
            "Model replied"
        );
        Ok(reply)
    }
}

/// Decorator bounding each call by `call_timeout` and the run by `max_calls`.
///
/// The budget counts attempted calls, so a call that times out still uses
/// its slot. [`AskAsync::start_run`] gives the next run a fresh budget.
pub struct GuardedAsk<T> {
    inner: T,
    call_timeout: Duration,
    max_calls: usize,
    calls: AtomicUsize,
}

impl<T> GuardedAsk<T>
where
    T: AskAsync,
{
    pub fn new(inner: T, call_timeout: Duration, max_calls: usize) -> Self {
        Self {
            inner,
            call_timeout,
            max_calls,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn from_settings(inner: T, settings: &ModelSettings) -> Self {
        Self::new(
            inner,
            Duration::from_secs(settings.timeout_secs),
            settings.max_calls_per_run,
        )
    }
}

impl<T> fmt::Debug for GuardedAsk<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GuardedAsk")
            .field("call_timeout", &self.call_timeout)
            .field("max_calls", &self.max_calls)
            .field("calls", &self.calls.load(Ordering::SeqCst))
            .finish()
    }
}

impl<T> AskAsync for GuardedAsk<T>
where
    T: AskAsync,
{
    #[instrument(level = "info", skip_all)]
    async fn ask(&self, prompt: &str) -> Result<String, AgentError> {
        let slot = self.calls.fetch_add(1, Ordering::SeqCst);
        if slot >= self.max_calls {
            warn!(limit = self.max_calls, "Model call budget exhausted");
            return Err(AgentError::BudgetExhausted {
                limit: self.max_calls,
            });
        }

        let t0 = Instant::now();
        match timeout(self.call_timeout, self.inner.ask(prompt)).await {
            Ok(result) => {
                if let Err(e) = &result {
                    warn!(
                        elapsed_ms = t0.elapsed().as_millis() as u64,
                        error = %e,
                        "Model call failed"
                    );
                }
                result
            }
            Err(_) => {
                error!(timeout = ?self.call_timeout, "Model call timed out");
                Err(AgentError::Timeout {
                    after_secs: self.call_timeout.as_secs(),
                })
            }
        }
    }

    fn start_run(&self) {
        self.calls.store(0, Ordering::SeqCst);
        self.inner.start_run();
    }
}
