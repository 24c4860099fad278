//! Helpers shared across the crawler: HTTP plumbing, request pacing, string
//! shortening for logs, and output directory checks.

use crate::config::{NewsletterConfig, Pacing};
use crate::error::CrawlError;
use rand::{Rng, rng};
use reqwest::Client;
use std::error::Error;
use std::path::Path;
use std::time::Duration;
use tokio::fs;
use tracing::{debug, instrument};

/// Build the HTTP client shared by every request of a crawl.
///
/// The client keeps connections alive between requests and sends the
/// configured User-Agent. No timeout is applied unless the config sets one.
pub fn build_client(config: &NewsletterConfig) -> Result<Client, CrawlError> {
    let mut builder = Client::builder().user_agent(config.user_agent.as_str());
    if let Some(timeout) = config.request_timeout() {
        builder = builder.timeout(timeout);
    }
    Ok(builder.build()?)
}

/// GET `url` and return the body as text. Non-success statuses are errors.
#[instrument(level = "debug", skip(client))]
pub async fn fetch_html(client: &Client, url: &str) -> Result<String, CrawlError> {
    let response = client.get(url).send().await?.error_for_status()?;
    let body = response.text().await?;
    debug!(bytes = body.len(), "Fetched page");
    Ok(body)
}

/// Draw a pause uniformly from the pacing bounds.
pub fn random_delay(pacing: &Pacing) -> Duration {
    let secs = if pacing.max_delay_secs > pacing.min_delay_secs {
        rng().random_range(pacing.min_delay_secs..=pacing.max_delay_secs)
    } else {
        pacing.min_delay_secs
    };
    Duration::from_secs_f64(secs.max(0.0))
}

/// Shorten `s` to at most `max` characters for log and error output.
///
/// Long strings keep their first `max` characters followed by
/// `"…(+N bytes)"`.
pub fn truncate_for_log(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        None => s.to_string(),
        Some((cut, _)) => format!("{}…(+{} bytes)", &s[..cut], s.len() - cut),
    }
}

/// Convert a label to a file-name friendly slug.
///
/// ```ignore
/// assert_eq!(slugify("Data Elixir"), "data-elixir");
/// ```
pub fn slugify(label: &str) -> String {
    label
        .to_lowercase()
        .replace(|c: char| !c.is_alphanumeric() && c != ' ' && c != '-', "")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
}

/// Create `path` if needed and confirm the crawler can write into it.
///
/// Runs before any request is made so a bad output location is reported
/// without spending a whole crawl first.
///
/// # Arguments
///
/// * `path` - Output directory for JSON or Markdown files
///
/// # Errors
///
/// Any I/O error from creating the directory or writing and removing a
/// marker file inside it.
#[instrument(level = "info", skip_all, fields(path = %path))]
pub async fn ensure_writable_dir(path: &str) -> Result<(), Box<dyn Error>> {
    let dir = Path::new(path);
    fs::create_dir_all(dir).await?;

    let marker = dir.join(".newsletter_crawler_write_check");
    fs::write(&marker, b"ok").await?;
    fs::remove_file(&marker).await?;

    debug!("Output directory accepts writes");
    Ok(())
}
