//! Issue page scraping.
//!
//! An issue page holds a heading with the issue number, a publish date, and a
//! run of category sections. Each category has a title and a list of items,
//! and every item contributes one [`ItemRow`].

use crate::error::CrawlError;
use crate::layout::Layout;
use crate::models::{IssueMetadata, IssueTable, ItemRow};
use crate::scrapers::extract::{
    extract_text, first_anchor_href, first_child_text, node_text, select_all, select_first,
    strip_non_alphanumeric,
};
use crate::utils::{fetch_html, truncate_for_log};
use itertools::izip;
use reqwest::Client;
use scraper::{ElementRef, Html};
use std::iter::repeat;
use tracing::{debug, info, instrument};
use url::Url;

/// Parse one category section into rows.
///
/// The category link is the `href` of the first anchor inside the first item
/// title, and every row of the category carries it. Without such an anchor
/// every row's link is `None`. Rows carry no issue metadata yet.
///
/// # Arguments
///
/// * `category` - A node matched by the layout's `category` selector
/// * `layout` - Selectors and text cleaning options
/// * `base` - Issue URL, used only when `layout.resolve_links` is set
///
/// # Returns
///
/// One [`ItemRow`] per item title, in document order.
///
/// # Errors
///
/// [`CrawlError::MissingElement`] when the section has no title, and
/// [`CrawlError::MismatchedItems`] when the numbers of item titles and
/// summaries differ.
pub fn parse_category(
    category: ElementRef<'_>,
    layout: &Layout,
    base: Option<&Url>,
) -> Result<Vec<ItemRow>, CrawlError> {
    let category_title = extract_text(category, &layout.category_title, &layout.clean_pattern)
        .into_iter()
        .next()
        .map(|title| finish_text(layout, title))
        .ok_or_else(|| CrawlError::MissingElement {
            field: "category title",
            context: truncate_for_log(&category.html(), 200),
        })?;

    let titles: Vec<String> = extract_text(category, &layout.item_title, &layout.clean_pattern)
        .into_iter()
        .map(|title| finish_text(layout, title))
        .collect();
    let summaries: Vec<String> = extract_text(category, &layout.item_summary, &layout.clean_pattern)
        .into_iter()
        .map(|summary| finish_text(layout, summary))
        .collect();

    if titles.len() != summaries.len() {
        return Err(CrawlError::MismatchedItems {
            category: category_title,
            titles: titles.len(),
            summaries: summaries.len(),
        });
    }

    let link = select_first(category, &layout.item_title)
        .and_then(first_anchor_href)
        .map(|href| match base {
            Some(base) if layout.resolve_links => resolve_link(base, &href),
            _ => href,
        });

    debug!(category = %category_title, items = titles.len(), ?link, "Parsed category");
    Ok(izip!(titles, summaries, repeat(link))
        .map(|(item_title, item_summary, link)| ItemRow {
            issue_num: None,
            date: None,
            category_title: category_title.clone(),
            item_title,
            item_summary,
            link,
        })
        .collect())
}

fn finish_text(layout: &Layout, text: String) -> String {
    if layout.trim_text {
        text.trim().to_string()
    } else {
        text
    }
}

fn resolve_link(base: &Url, href: &str) -> String {
    base.join(href)
        .map(|resolved| resolved.to_string())
        .unwrap_or_else(|_| href.to_string())
}

/// Read the issue number and publish date, keeping only letters and digits.
///
/// A field whose selector is unset in the layout comes back as `None`. A
/// configured selector that matches nothing is an error.
pub fn extract_issue_metadata(document: &Html, layout: &Layout) -> Result<IssueMetadata, CrawlError> {
    let root = document.root_element();

    let issue_num = match &layout.issue_heading {
        Some(selector) => {
            let heading = select_first(root, selector).ok_or_else(|| CrawlError::MissingElement {
                field: "issue heading",
                context: format!("<{}>", selector.tag),
            })?;
            let text = first_child_text(heading).ok_or_else(|| CrawlError::MissingElement {
                field: "issue heading text",
                context: truncate_for_log(&heading.html(), 200),
            })?;
            Some(strip_non_alphanumeric(&text))
        }
        None => None,
    };

    let date = match &layout.date {
        Some(selector) => {
            let node = select_first(root, selector).ok_or_else(|| CrawlError::MissingElement {
                field: "publish date",
                context: format!("<{}>", selector.tag),
            })?;
            Some(strip_non_alphanumeric(&node_text(node)))
        }
        None => None,
    };

    Ok(IssueMetadata { issue_num, date })
}

/// Turn a parsed issue page into its table of rows.
///
/// Rows follow document order across categories, and all of them carry the
/// page's issue number and date.
pub fn parse_issue_page(document: &Html, url: &str, layout: &Layout) -> Result<IssueTable, CrawlError> {
    let categories = select_all(document.root_element(), &layout.category);
    if categories.is_empty() {
        return Err(CrawlError::NoCategories {
            url: url.to_string(),
        });
    }

    let base = Url::parse(url).ok();
    let mut rows = Vec::new();
    for category in &categories {
        rows.extend(parse_category(*category, layout, base.as_ref())?);
    }

    let metadata = extract_issue_metadata(document, layout)?;
    for row in &mut rows {
        row.issue_num.clone_from(&metadata.issue_num);
        row.date.clone_from(&metadata.date);
    }

    info!(
        %url,
        issue_num = ?metadata.issue_num,
        date = ?metadata.date,
        categories = categories.len(),
        rows = rows.len(),
        "Parsed issue"
    );
    Ok(IssueTable {
        url: url.to_string(),
        metadata,
        rows,
    })
}

/// Fetch one issue page and parse it.
///
/// # Arguments
///
/// * `client` - Shared HTTP client carrying the configured User-Agent
/// * `layout` - Selectors for the issue page
/// * `url` - Full issue URL
///
/// # Returns
///
/// The issue's [`IssueTable`], or the first error met while fetching or
/// parsing.
#[instrument(level = "info", skip(client, layout))]
pub async fn scrape_issue(client: &Client, layout: &Layout, url: &str) -> Result<IssueTable, CrawlError> {
    let body = fetch_html(client, url).await?;
    let document = Html::parse_document(&body);
    parse_issue_page(&document, url, layout)
}
