//! Newsletter page scraping.
//!
//! Scraping happens in three layers:
//!
//! 1. [`extract`]: select nodes by [`NodeSelector`](crate::layout::NodeSelector) and clean their text
//! 2. [`issue`]: turn one issue page into an [`IssueTable`](crate::models::IssueTable)
//! 3. [`archive`]: discover issues and crawl them one after another
//!
//! All requests are made in sequence through one shared HTTP client.

pub mod archive;
pub mod extract;
pub mod issue;
