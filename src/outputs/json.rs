//! JSON output of a crawled archive.
//!
//! # Output Structure
//!
//! ```text
//! json_output_dir/
//! └── data-elixir_2026-10-19.json
//! ```
//!
//! The file records the newsletter name, the crawl time, the distinct issue
//! numbers, and every row in crawl order.

use crate::models::{ArchiveTable, ItemRow};
use crate::utils::slugify;
use chrono::Local;
use serde::Serialize;
use std::error::Error;
use std::path::PathBuf;
use tokio::fs;
use tracing::{error, info, instrument};

#[derive(Debug, Serialize)]
struct ArchiveExport<'a> {
    newsletter: &'a str,
    crawled_at: String,
    issues: Vec<&'a str>,
    rows: &'a [ItemRow],
}

/// Serialize `archive` to `{json_output_dir}/{slug}_{date}.json`.
///
/// # Arguments
///
/// * `newsletter` - Display name, slugified for the file name
/// * `archive` - Rows to write
/// * `json_output_dir` - Base directory, created if missing
///
/// # Returns
///
/// The path of the written file, or an error if serialization, directory
/// creation or the write fails.
#[instrument(level = "info", skip(archive), fields(rows = archive.len()))]
pub async fn write_archive(
    newsletter: &str,
    archive: &ArchiveTable,
    json_output_dir: &str,
) -> Result<PathBuf, Box<dyn Error>> {
    let now = Local::now();
    let export = ArchiveExport {
        newsletter,
        crawled_at: now.to_rfc3339(),
        issues: archive.issue_numbers(),
        rows: &archive.rows,
    };
    let json = serde_json::to_string_pretty(&export)?;

    if let Err(e) = fs::create_dir_all(json_output_dir).await {
        error!(%json_output_dir, error = %e, "Failed to create JSON dir");
        return Err(e.into());
    }

    let path = PathBuf::from(json_output_dir).join(format!(
        "{}_{}.json",
        slugify(newsletter),
        now.date_naive()
    ));
    fs::write(&path, json).await?;
    info!(path = %path.display(), "Wrote archive JSON");
    Ok(path)
}
