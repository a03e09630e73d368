//! Utility functions for string trimming, edition naming, and file system checks.
//!
//! This module provides helper functions used throughout the application:
//! - Character-safe prefixes for model prompts and log previews
//! - Whitespace normalization for scraped text
//! - Time classification for report file naming
//! - File system validation for output directories

use chrono::{Local, NaiveTime, Timelike};
use std::fs as stdfs;
use tokio::fs;
use tracing::{info, instrument};

use crate::error::AgentError;

/// Longest prefix of `s` holding at most `max_chars` characters.
///
/// Never splits a multi-byte character.
pub fn prefix_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Truncate a string for logging purposes.
///
/// Long strings are truncated to `max` characters with an ellipsis and
/// byte count indicator appended.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log(&"a".repeat(500), 10), "aaaaaaaaaa…(+490 bytes)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    let head = prefix_chars(s, max);
    if head.len() == s.len() {
        s.to_string()
    } else {
        format!("{}…(+{} bytes)", head, s.len() - head.len())
    }
}

/// Collapse runs of whitespace into single spaces and trim the ends.
pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Classify a wall-clock time into morning, afternoon, or evening.
///
/// - **Morning**: 00:00 - 08:00
/// - **Afternoon**: 08:00 - 16:00
/// - **Evening**: 16:00 - 24:00
pub fn edition_for(time: NaiveTime) -> &'static str {
    match time.hour() {
        0..8 => "morning",
        8..16 => "afternoon",
        _ => "evening",
    }
}

/// Edition name for the current local time.
#[instrument]
pub fn time_of_day() -> String {
    let tod = Local::now().time();
    let which = edition_for(tod);
    tracing::debug!(%tod, %which, "Computed time_of_day");
    which.to_string()
}

/// Ensure a directory exists and is writable.
///
/// Creates the directory if it doesn't exist, then writes and removes a
/// probe file.
#[instrument(level = "info", skip_all, fields(path = %path))]
pub async fn ensure_writable_dir(path: &str) -> Result<(), AgentError> {
    fs::create_dir_all(path).await?;
    // Sync write keeps the error surface small
    let probe_path = format!("{}/..__probe_write__", path.trim_end_matches('/'));
    stdfs::File::create(&probe_path)?;
    let _ = stdfs::remove_file(&probe_path);
    info!("Output directory is writable");
    Ok(())
}
