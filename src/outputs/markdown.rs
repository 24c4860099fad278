//! Markdown rendering of a crawled archive.
//!
//! One `##` heading per issue, one `###` heading per category within it, and
//! a bullet per item. Items with a link render their title as a Markdown link.

use crate::models::{ArchiveTable, ItemRow};
use crate::utils::slugify;
use itertools::Itertools;
use std::error::Error;
use std::path::PathBuf;
use tokio::fs;
use tracing::{info, instrument};

pub fn archive_to_markdown(newsletter: &str, archive: &ArchiveTable) -> String {
    let mut md = format!("# {newsletter}\n");

    let by_issue = archive
        .rows
        .iter()
        .chunk_by(|row| (row.issue_num.as_deref(), row.date.as_deref()));
    for ((issue_num, date), rows) in &by_issue {
        md.push_str(&format!("\n## {}", issue_num.unwrap_or("Unnumbered issue")));
        if let Some(date) = date {
            md.push_str(&format!(" ({date})"));
        }
        md.push('\n');

        let by_category = rows.chunk_by(|row| row.category_title.as_str());
        for (category, items) in &by_category {
            md.push_str(&format!("\n### {category}\n\n"));
            for item in items {
                md.push_str(&item_line(item));
            }
        }
    }
    md
}

fn item_line(item: &ItemRow) -> String {
    let title = match &item.link {
        Some(link) => format!("[{}]({})", item.item_title, link),
        None => item.item_title.clone(),
    };
    if item.item_summary.is_empty() {
        format!("- **{title}**\n")
    } else {
        format!("- **{title}**: {}\n", item.item_summary)
    }
}

/// Write the rendered archive to `{markdown_output_dir}/{slug}.md`.
#[instrument(level = "info", skip(archive))]
pub async fn write_markdown(
    newsletter: &str,
    archive: &ArchiveTable,
    markdown_output_dir: &str,
) -> Result<PathBuf, Box<dyn Error>> {
    fs::create_dir_all(markdown_output_dir).await?;
    let path = PathBuf::from(markdown_output_dir).join(format!("{}.md", slugify(newsletter)));
    fs::write(&path, archive_to_markdown(newsletter, archive)).await?;
    info!(path = %path.display(), "Wrote archive Markdown");
    Ok(path)
}
