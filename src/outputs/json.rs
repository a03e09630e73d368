//! JSON report output.
//!
//! The serialized [`AgentResponse`] lands in one file per edition:
//! `{json_output_dir}/{date}_{time_of_day}.json`. A second run in the same
//! edition overwrites the first.

use chrono::{Local, NaiveDate};
use std::path::PathBuf;
use tokio::fs;
use tracing::{error, info, instrument};

use crate::error::AgentError;
use crate::models::AgentResponse;
use crate::utils::{ensure_writable_dir, time_of_day};

/// File path for the report of `date`'s `edition`.
pub fn report_path(json_output_dir: &str, date: NaiveDate, edition: &str) -> PathBuf {
    PathBuf::from(json_output_dir).join(format!("{date}_{edition}.json"))
}

/// Write `response` for the current local date and edition.
///
/// Returns the path written.
#[instrument(level = "info", skip_all, fields(json_output_dir = %json_output_dir))]
pub async fn write_report(
    response: &AgentResponse,
    json_output_dir: &str,
) -> Result<PathBuf, AgentError> {
    let path = report_path(json_output_dir, Local::now().date_naive(), &time_of_day());
    write_report_to(response, json_output_dir, path).await
}

async fn write_report_to(
    response: &AgentResponse,
    json_output_dir: &str,
    path: PathBuf,
) -> Result<PathBuf, AgentError> {
    if let Err(e) = ensure_writable_dir(json_output_dir).await {
        error!(error = %e, "JSON output directory is not writable");
        return Err(e);
    }

    let json = serde_json::to_string_pretty(response)?;
    info!(path = %path.display(), "Writing JSON");
    fs::write(&path, json).await?;
    info!(path = %path.display(), "Wrote JSON report");
    Ok(path)
}
