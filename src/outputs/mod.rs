//! Output writers for a crawled [`ArchiveTable`](crate::models::ArchiveTable).
//!
//! - [`json`]: the full table as JSON, for downstream analysis
//! - [`markdown`]: a readable digest grouped by issue and category
//!
//! ```text
//! json_output_dir/
//! └── data-elixir_2026-10-19.json
//!
//! markdown_output_dir/
//! └── data-elixir.md
//! ```

pub mod json;
pub mod markdown;
