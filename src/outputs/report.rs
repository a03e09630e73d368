//! Plain-text rendering of a response for the terminal.

use std::fmt::Write;

use crate::models::AgentResponse;

/// Render `response` as a numbered list of articles, or its message.
pub fn render(response: &AgentResponse) -> String {
    let mut out = String::new();
    match response {
        AgentResponse::Results { items } => {
            let _ = writeln!(out, "SAR-related news ({} article(s))", items.len());
            for (i, item) in items.iter().enumerate() {
                let _ = writeln!(out);
                let _ = writeln!(out, "{}. {}", i + 1, item.title);
                let _ = writeln!(out, "   URL: {}", item.url);
                let _ = writeln!(out, "   Summary: {}", item.summary);
                let _ = writeln!(out, "   Relevance: {}", item.relevance);
            }
        }
        AgentResponse::NoRelevantArticles { message } => {
            let _ = writeln!(out, "{message}");
        }
        AgentResponse::Error { kind, message } => {
            let _ = writeln!(out, "Error ({kind}): {message}");
        }
    }
    out
}
