//! Error types for crawling and configuration.
//!
//! Every failure aborts the crawl that raised it. There is no retry layer and
//! no partial result, so these variants exist to say *what* went wrong, not to
//! drive recovery.

use thiserror::Error;

/// Failures raised while fetching or parsing newsletter pages.
#[derive(Debug, Error)]
pub enum CrawlError {
    /// Network failure or a non-success HTTP status.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// A node the layout requires was not present on the page.
    #[error("missing {field} in {context}")]
    MissingElement {
        field: &'static str,
        context: String,
    },

    /// The issue page contained no category sections.
    #[error("no category sections found at {url}")]
    NoCategories { url: String },

    /// The front page heading did not end in a parseable issue number.
    #[error("could not parse latest issue number from {raw:?}")]
    IssueNumber { raw: String },

    /// A category listed a different number of item titles and summaries.
    #[error("category {category:?} has {titles} item titles but {summaries} summaries")]
    MismatchedItems {
        category: String,
        titles: usize,
        summaries: usize,
    },
}

/// Failures raised while loading a newsletter configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid YAML in config file: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}
