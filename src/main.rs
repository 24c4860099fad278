//! # Newsletter Crawler
//!
//! Fetches a newsletter's archive, scrapes every issue page, and flattens the
//! result into one table with a row per item:
//! `issue_num, date, category_title, item_title, item_summary, link`.
//!
//! ## Usage
//!
//! ```sh
//! newsletter_crawler -j ./json -m ./markdown
//! ```
//!
//! ## Architecture
//!
//! 1. **Discovery**: read the latest issue number from the archive front page
//!    (skipped when `--issues` is given)
//! 2. **Crawling**: fetch and parse each issue in order, pausing a random
//!    0.5 to 2 seconds between requests
//! 3. **Output**: write the table as JSON and, optionally, a Markdown digest
//!
//! The crawl is strictly sequential and stops at the first failing issue.

use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod config;
mod error;
mod layout;
mod models;
mod outputs;
mod scrapers;
mod utils;

use cli::Cli;
use outputs::{json, markdown};
use scrapers::archive::Crawler;
use utils::ensure_writable_dir;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("newsletter_crawler starting up");

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    let config = args.resolve_config()?;
    info!(
        name = %config.name,
        archive_url = %config.archive_url,
        front_page = %config.archive_front_page,
        "Resolved newsletter config"
    );

    // Fail before crawling rather than after
    if let Err(e) = ensure_writable_dir(&args.json_output_dir).await {
        error!(
            path = %args.json_output_dir,
            error = %e,
            "JSON output directory is not writable (fix perms or choose a different path)"
        );
        return Err(e);
    }

    let name = config.name.clone();
    let crawler = Crawler::new(config)?;
    let archive = match crawler.crawl_archive(args.issues.clone()).await {
        Ok(archive) => archive,
        Err(e) => {
            error!(error = %e, "Crawl aborted");
            return Err(e.into());
        }
    };

    if archive.is_empty() {
        warn!("Crawl finished without any rows; writing an empty table");
    }

    let json_path = json::write_archive(&name, &archive, &args.json_output_dir).await?;
    info!(path = %json_path.display(), rows = archive.len(), "JSON output written");

    if let Some(dir) = &args.markdown_output_dir {
        let md_path = markdown::write_markdown(&name, &archive, dir).await?;
        info!(path = %md_path.display(), "Markdown output written");
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        issues = archive.issue_numbers().len(),
        rows = archive.len(),
        "Execution complete"
    );

    Ok(())
}
