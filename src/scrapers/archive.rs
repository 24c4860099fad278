//! Archive crawling.
//!
//! The crawler walks issues in order: it builds each issue URL by appending
//! a suffix to the archive URL, scrapes the page, appends the rows, and
//! pauses for a random interval before the next request. The first failing
//! issue aborts the whole crawl.

use crate::config::NewsletterConfig;
use crate::error::CrawlError;
use crate::models::{ArchiveTable, IssueTable};
use crate::scrapers::extract::{first_child_text, select_first};
use crate::scrapers::issue;
use crate::utils::{build_client, fetch_html, random_delay};
use reqwest::Client;
use scraper::Html;
use tokio::time::sleep;
use tracing::{info, instrument};

/// Sequential crawler over one newsletter archive.
///
/// Owns the HTTP client for its lifetime so connections are reused across
/// issues.
#[derive(Debug)]
pub struct Crawler {
    client: Client,
    config: NewsletterConfig,
}

impl Crawler {
    /// Build a crawler and its HTTP client.
    ///
    /// # Arguments
    ///
    /// * `config` - Archive URLs, pacing, User-Agent and page layout
    ///
    /// # Errors
    ///
    /// [`CrawlError::Http`] when the client cannot be built.
    pub fn new(config: NewsletterConfig) -> Result<Self, CrawlError> {
        let client = build_client(&config)?;
        Ok(Self { client, config })
    }

    /// Read the newest issue number from the archive front page.
    ///
    /// Takes the first text child of the first issue heading and parses its
    /// last three characters, so a heading ending in `"042"` yields `42`.
    ///
    /// # Errors
    ///
    /// Fails on a request error, a front page without the heading, or a
    /// heading whose tail is not a number.
    #[instrument(level = "info", skip(self), fields(url = %self.config.archive_front_page))]
    pub async fn latest_issue(&self) -> Result<u32, CrawlError> {
        let body = fetch_html(&self.client, &self.config.archive_front_page).await?;
        let document = Html::parse_document(&body);
        let selector = &self.config.layout.latest_issue;

        let heading = select_first(document.root_element(), selector).ok_or_else(|| {
            CrawlError::MissingElement {
                field: "latest issue heading",
                context: self.config.archive_front_page.clone(),
            }
        })?;
        let text = first_child_text(heading).unwrap_or_default();
        let latest = parse_trailing_issue_number(&text)?;
        info!(latest, "Discovered latest issue");
        Ok(latest)
    }

    pub async fn scrape_issue(&self, url: &str) -> Result<IssueTable, CrawlError> {
        issue::scrape_issue(&self.client, &self.config.layout, url).await
    }

    /// Crawl the given issue suffixes, or every issue before the latest one
    /// when none are given.
    ///
    /// # Arguments
    ///
    /// * `issue_suffixes` - Strings appended to `archive_url`; `None` means
    ///   `"1"` up to, but excluding, [`Crawler::latest_issue`]
    ///
    /// # Returns
    ///
    /// Every issue's rows in crawl order. If any issue fails, only the error
    /// comes back and the rows gathered so far are dropped.
    #[instrument(level = "info", skip_all, fields(newsletter = %self.config.name))]
    pub async fn crawl_archive(&self, issue_suffixes: Option<Vec<String>>) -> Result<ArchiveTable, CrawlError> {
        let suffixes = match issue_suffixes {
            Some(suffixes) => suffixes,
            None => discovered_suffixes(self.latest_issue().await?),
        };
        let urls: Vec<String> = suffixes
            .iter()
            .map(|suffix| format!("{}{}", self.config.archive_url, suffix))
            .collect();

        let total = urls.len();
        info!(total, "Starting archive crawl");

        let mut archive = ArchiveTable::default();
        for (i, url) in urls.iter().enumerate() {
            info!(position = i + 1, total, %url, "Scraping issue");
            let issue = self.scrape_issue(url).await?;
            archive.append(issue);

            let delay = random_delay(&self.config.pacing);
            info!(?delay, rows = archive.len(), "Pausing before next request");
            sleep(delay).await;
        }

        info!(issues = total, rows = archive.len(), "Archive crawl complete");
        Ok(archive)
    }
}

/// Suffixes `"1"` up to, but excluding, the latest issue number.
fn discovered_suffixes(latest: u32) -> Vec<String> {
    (1..latest).map(|num| num.to_string()).collect()
}

fn parse_trailing_issue_number(text: &str) -> Result<u32, CrawlError> {
    let chars: Vec<char> = text.chars().collect();
    let tail: String = chars[chars.len().saturating_sub(3)..].iter().collect();
    tail.trim()
        .parse()
        .map_err(|_| CrawlError::IssueNumber { raw: text.to_string() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Pacing;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn issue_page(num: u32, items: &[&str]) -> String {
        let mut body = format!(
            r#"<html><body><h1>Issue #{num}</h1><time class="published">Mar. {num}, 2021</time>
               <section class="category cc-news"><span class="category__title__text">News</span>"#
        );
        for item in items {
            body.push_str(&format!(
                r#"<h3 class="item__title"><a href="/go/{item}">{item}</a></h3><span class="item__summary">about {item}</span>"#
            ));
        }
        body.push_str("</section></body></html>");
        body
    }

    fn test_crawler(server: &MockServer) -> Crawler {
        Crawler::new(NewsletterConfig {
            name: "Test Letter".to_string(),
            archive_url: format!("{}/issues/", server.uri()),
            archive_front_page: format!("{}/issues", server.uri()),
            pacing: Pacing::none(),
            ..Default::default()
        })
        .unwrap()
    }

    async fn mount_issue(server: &MockServer, num: u32, items: &[&str], times: u64) {
        Mock::given(method("GET"))
            .and(path(format!("/issues/{num}")))
            .respond_with(ResponseTemplate::new(200).set_body_string(issue_page(num, items)))
            .expect(times)
            .mount(server)
            .await;
    }

    #[test]
    fn test_parse_trailing_issue_number() {
        assert_eq!(parse_trailing_issue_number("Issue 042").unwrap(), 42);
        assert_eq!(parse_trailing_issue_number("Data Elixir #312").unwrap(), 312);
        assert_eq!(parse_trailing_issue_number("7").unwrap(), 7);
        assert!(matches!(
            parse_trailing_issue_number("Latest issue"),
            Err(CrawlError::IssueNumber { .. })
        ));
        assert!(parse_trailing_issue_number("").is_err());
    }

    #[test]
    fn test_discovered_suffixes_exclude_latest() {
        assert_eq!(discovered_suffixes(4), ["1", "2", "3"]);
        assert!(discovered_suffixes(1).is_empty());
    }

    #[tokio::test]
    async fn test_latest_issue_from_front_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/issues"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"<h2 class="item__heading">Issue 042<small>new</small></h2>
                   <h2 class="item__heading">Issue 041</h2>"#,
            ))
            .mount(&server)
            .await;

        assert_eq!(test_crawler(&server).latest_issue().await.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_user_agent_is_sent() {
        use wiremock::matchers::header;

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/issues/1"))
            .and(header("User-Agent", "Chrome66.0"))
            .respond_with(ResponseTemplate::new(200).set_body_string(issue_page(1, &["a"])))
            .expect(1)
            .mount(&server)
            .await;

        let table = test_crawler(&server).scrape_issue(&format!("{}/issues/1", server.uri())).await.unwrap();
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0].link.as_deref(), Some("/go/a"));
    }

    #[tokio::test]
    async fn test_explicit_suffixes_crawl_in_order() {
        let server = MockServer::start().await;
        mount_issue(&server, 1, &["a", "b"], 1).await;
        mount_issue(&server, 2, &["c"], 1).await;
        mount_issue(&server, 3, &["never"], 0).await;

        let archive = test_crawler(&server)
            .crawl_archive(Some(vec!["1".to_string(), "2".to_string()]))
            .await
            .unwrap();

        let titles: Vec<_> = archive.rows.iter().map(|r| r.item_title.as_str()).collect();
        assert_eq!(titles, ["a", "b", "c"]);
        assert_eq!(archive.issue_numbers(), ["Issue1", "Issue2"]);
        assert_eq!(archive.rows[2].date.as_deref(), Some("Mar22021"));
    }

    #[tokio::test]
    async fn test_discovery_crawls_everything_before_latest() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/issues"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string(r#"<h2 class="item__heading">Issue 003</h2>"#),
            )
            .expect(1)
            .mount(&server)
            .await;
        mount_issue(&server, 1, &["a"], 1).await;
        mount_issue(&server, 2, &["b"], 1).await;
        mount_issue(&server, 3, &["c"], 0).await;

        let archive = test_crawler(&server).crawl_archive(None).await.unwrap();
        assert_eq!(archive.len(), 2);
        assert_eq!(archive.issue_numbers(), ["Issue1", "Issue2"]);
    }

    #[tokio::test]
    async fn test_failure_on_second_issue_aborts_crawl() {
        let server = MockServer::start().await;
        mount_issue(&server, 1, &["a"], 1).await;
        Mock::given(method("GET"))
            .and(path("/issues/2"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;
        mount_issue(&server, 3, &["c"], 0).await;

        let result = test_crawler(&server)
            .crawl_archive(Some(vec!["1".into(), "2".into(), "3".into()]))
            .await;
        assert!(matches!(result, Err(CrawlError::Http(_))));
    }

    #[tokio::test]
    async fn test_issue_without_categories_aborts_crawl() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/issues/1"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<h1>Issue 1</h1>"))
            .mount(&server)
            .await;

        let result = test_crawler(&server).crawl_archive(Some(vec!["1".into()])).await;
        assert!(matches!(result, Err(CrawlError::NoCategories { .. })));
    }
}
