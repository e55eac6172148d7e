//! `failures` command: songs whose latest crawl failed.

use std::fmt::Write as _;

use streamtally_core::Platform;
use streamtally_metrics::{get_failure_page, FailureListing};

use crate::OutputFormat;

/// Fetch one page of crawl failures inside a read snapshot and print it.
///
/// # Errors
///
/// Returns an error if the query fails.
pub(crate) async fn run_failures(
    pool: &sqlx::PgPool,
    page: i64,
    size: i64,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let mut snapshot = streamtally_db::begin_read_snapshot(pool).await?;
    let listing = get_failure_page(&mut snapshot, page, size).await?;
    snapshot.finish().await?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&listing)?),
        OutputFormat::Table => print!("{}", render_failures_table(&listing)),
    }
    Ok(())
}

pub(crate) fn render_failures_table(listing: &FailureListing) -> String {
    let mut out = String::new();
    if listing.failures.is_empty() {
        let _ = writeln!(out, "no crawl failures recorded");
        return out;
    }

    let _ = writeln!(out, "{:<18}{:<24}{:<30}PLATFORMS", "FAILED AT", "ARTIST", "TITLE");
    for failure in &listing.failures {
        let platforms: Vec<&str> = failure
            .failed_platforms
            .iter()
            .copied()
            .map(Platform::as_str)
            .collect();
        let _ = writeln!(
            out,
            "{:<18}{:<24}{:<30}{}",
            failure.failed_at.format("%Y-%m-%d %H:%M"),
            truncate(&failure.artist, 22),
            truncate(&failure.title, 28),
            platforms.join(", ")
        );
    }

    let p = &listing.page;
    let _ = writeln!(
        out,
        "page {} of {} ({} songs)",
        p.page_number, p.total_pages, p.total_elements
    );
    out
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        format!("{}...", text.chars().take(max_chars - 3).collect::<String>())
    } else {
        text.to_string()
    }
}
