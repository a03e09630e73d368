//! Error taxonomy for the agent.
//!
//! Every external call site (news search, page fetch, text generation) turns
//! one of these into a degraded result instead of letting it escape the
//! pipeline. The [`AgentError::kind`] discriminant is what callers see in the
//! structured response.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AgentError {
    #[error("missing credential for {service}")]
    MissingCredential { service: &'static str },

    #[error("unauthorized: {service} rejected the credential")]
    Unauthorized { service: &'static str },

    #[error("{service} returned HTTP {status}")]
    HttpStatus { service: &'static str, status: u16 },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("call timed out after {after_secs}s")]
    Timeout { after_secs: u64 },

    #[error("unexpected payload: {0}")]
    Payload(String),

    #[error("model call budget of {limit} exhausted for this run")]
    BudgetExhausted { limit: usize },

    #[error("model error: {0}")]
    Model(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AgentError {
    /// Stable snake_case discriminant for structured responses.
    pub fn kind(&self) -> &'static str {
        match self {
            AgentError::MissingCredential { .. } => "missing_credential",
            AgentError::Unauthorized { .. } => "unauthorized",
            AgentError::HttpStatus { .. } => "http_status",
            AgentError::Transport(_) => "transport",
            AgentError::Timeout { .. } => "timeout",
            AgentError::Payload(_) => "payload",
            AgentError::BudgetExhausted { .. } => "budget_exhausted",
            AgentError::Model(_) => "model",
            AgentError::Config(_) => "config",
            AgentError::Io(_) => "io",
        }
    }

    /// Map a non-success HTTP status from `service` onto the taxonomy.
    pub fn from_status(service: &'static str, status: u16) -> Self {
        if status == 401 {
            AgentError::Unauthorized { service }
        } else {
            AgentError::HttpStatus { service, status }
        }
    }
}

impl From<reqwest::Error> for AgentError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            // reqwest does not expose the configured duration on the error
            AgentError::Transport(format!("request timed out: {err}"))
        } else {
            AgentError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for AgentError {
    fn from(err: serde_json::Error) -> Self {
        AgentError::Payload(err.to_string())
    }
}
