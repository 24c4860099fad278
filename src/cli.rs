//! Command-line interface definitions.
//!
//! Every option overrides the matching field of the config file (or the
//! built-in Data Elixir defaults when no file is given).

use crate::config::NewsletterConfig;
use crate::error::ConfigError;
use clap::Parser;

/// Crawl a newsletter archive into a flat table of items.
///
/// # Examples
///
/// ```sh
/// # Discover the latest issue and crawl everything before it
/// newsletter_crawler -j ./json
///
/// # Crawl two specific issues of another newsletter layout
/// newsletter_crawler -j ./json -c weekly.yaml --issues 101,102
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Output directory for the JSON table
    #[arg(short, long)]
    pub json_output_dir: String,

    /// Output directory for a Markdown digest (skipped when unset)
    #[arg(short, long)]
    pub markdown_output_dir: Option<String>,

    /// Optional path to a newsletter config YAML file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Newsletter label used in output file names
    #[arg(long)]
    pub name: Option<String>,

    /// Base URL that issue suffixes are appended to
    #[arg(long, env = "NEWSLETTER_ARCHIVE_URL")]
    pub archive_url: Option<String>,

    /// Archive front page used to discover the latest issue
    #[arg(long, env = "NEWSLETTER_FRONT_PAGE")]
    pub front_page: Option<String>,

    /// Comma-separated issue suffixes to crawl instead of discovering them
    #[arg(short, long, value_delimiter = ',')]
    pub issues: Option<Vec<String>>,

    /// Minimum pause between requests, in seconds
    #[arg(long)]
    pub min_delay: Option<f64>,

    /// Maximum pause between requests, in seconds
    #[arg(long)]
    pub max_delay: Option<f64>,

    /// Per-request timeout in seconds (none by default)
    #[arg(long)]
    pub timeout: Option<u64>,
}

impl Cli {
    /// Load the config file, if any, and apply command-line overrides.
    pub fn resolve_config(&self) -> Result<NewsletterConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => NewsletterConfig::load(path)?,
            None => NewsletterConfig::default(),
        };

        if let Some(name) = &self.name {
            config.name.clone_from(name);
        }
        if let Some(url) = &self.archive_url {
            config.archive_url.clone_from(url);
        }
        if let Some(url) = &self.front_page {
            config.archive_front_page.clone_from(url);
        }
        if let Some(min) = self.min_delay {
            config.pacing.min_delay_secs = min;
        }
        if let Some(max) = self.max_delay {
            config.pacing.max_delay_secs = max;
        }
        if self.timeout.is_some() {
            config.request_timeout_secs = self.timeout;
        }

        config.validate()?;
        Ok(config)
    }
}
