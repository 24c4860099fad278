//! Tabular records produced by the crawler.
//!
//! - [`ItemRow`]: one newsletter item, flattened with its issue and category
//! - [`IssueMetadata`]: issue number and publish date read from an issue page
//! - [`IssueTable`]: the rows of one issue, in document order
//! - [`ArchiveTable`]: issue tables concatenated in crawl order
//!
//! Serialized field order matches the column order
//! `issue_num, date, category_title, item_title, item_summary, link`.

use itertools::Itertools;
use serde::{Deserialize, Serialize};

/// One newsletter item.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ItemRow {
    pub issue_num: Option<String>,
    pub date: Option<String>,
    pub category_title: String,
    pub item_title: String,
    pub item_summary: String,
    /// `None` when the item title carries no anchor.
    pub link: Option<String>,
}

/// Issue number and date, both reduced to ASCII letters and digits.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct IssueMetadata {
    pub issue_num: Option<String>,
    pub date: Option<String>,
}

/// Rows for a single issue. Every row shares the same issue number and date.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct IssueTable {
    pub url: String,
    pub metadata: IssueMetadata,
    pub rows: Vec<ItemRow>,
}

/// All crawled rows, issue by issue.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ArchiveTable {
    pub rows: Vec<ItemRow>,
}

impl ArchiveTable {
    pub fn append(&mut self, issue: IssueTable) {
        self.rows.extend(issue.rows);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Distinct issue numbers in the order they were crawled.
    pub fn issue_numbers(&self) -> Vec<&str> {
        self.rows
            .iter()
            .filter_map(|row| row.issue_num.as_deref())
            .unique()
            .collect()
    }
}
