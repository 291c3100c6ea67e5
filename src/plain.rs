//! Plain-text output for `--plain` mode
//!
//! Formats the same information as the terminal UI header and grid as lines of
//! text, one item per line.

use chrono::Local;

use crate::data::{ItemFetchResult, Source};

/// Formats a fetch result for printing to stdout
pub fn format_result(source: Source, ttl_secs: i64, result: &ItemFetchResult) -> String {
    let mut out = String::new();

    out.push_str("Cache Test\n");
    out.push_str(&format!(
        "Fetches all {} from {} ({})\n",
        source.label().to_lowercase(),
        source.api_name(),
        source.homepage()
    ));
    out.push_str(&format!("Cached for {} seconds\n", ttl_secs));
    out.push_str(&format!(
        "Fetched at: {}\n",
        result.fetched_at.with_timezone(&Local).format("%H:%M:%S")
    ));
    out.push_str(&format!(
        "Total {}: {}\n\n",
        source.label(),
        result.items.len()
    ));

    for item in &result.items {
        out.push_str(&format!(
            "{:>4}  {}  |  {}  |  {}\n",
            item.id,
            item.name,
            item.detail_line(),
            item.category
        ));
    }

    out
}
