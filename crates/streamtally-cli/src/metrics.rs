//! `metrics` command: one page of a song's date-grouped metrics.

use std::fmt::Write as _;

use clap::Args;
use streamtally_core::MetricFilter;
use streamtally_metrics::{get_page, MetricsPage, MetricsQuery};
use uuid::Uuid;

use crate::OutputFormat;

#[derive(Debug, Args)]
pub(crate) struct MetricsArgs {
    /// Song id
    #[arg(long)]
    pub song: Uuid,
    /// MELON, GENIE, YOUTUBE or YOUTUBE_MUSIC; unknown values are ignored
    #[arg(long)]
    pub platform: Option<String>,
    /// Earliest date to include (YYYY-MM-DD)
    #[arg(long)]
    pub start: Option<String>,
    /// Latest date to include (YYYY-MM-DD)
    #[arg(long)]
    pub end: Option<String>,
    /// 1-based page number
    #[arg(long, default_value_t = 1)]
    pub page: i64,
    /// Page size: 10, 20, 50 or 100
    #[arg(long)]
    pub size: Option<i64>,
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,
}

impl MetricsArgs {
    pub(crate) fn to_query(&self, default_size: u32) -> MetricsQuery {
        MetricsQuery {
            song_id: self.song,
            filter: MetricFilter::parse(
                self.platform.as_deref(),
                self.start.as_deref(),
                self.end.as_deref(),
            ),
            ui_page: self.page,
            requested_size: self.size.unwrap_or_else(|| i64::from(default_size)),
        }
    }
}

/// Fetch one metrics page inside a read snapshot and print it.
///
/// # Errors
///
/// Returns an error if the song does not exist or any query fails.
pub(crate) async fn run_metrics(
    pool: &sqlx::PgPool,
    args: &MetricsArgs,
    default_size: u32,
) -> anyhow::Result<()> {
    let query = args.to_query(default_size);
    let mut snapshot = streamtally_db::begin_read_snapshot(pool).await?;
    let page = get_page(&mut snapshot, &query).await?;
    snapshot.finish().await?;

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&page)?),
        OutputFormat::Table => print!("{}", render_metrics_table(&page)),
    }
    Ok(())
}

/// Render a metrics page as plain text, one block per date.
pub(crate) fn render_metrics_table(page: &MetricsPage) -> String {
    let mut out = String::new();
    let song = &page.song;
    let _ = writeln!(out, "{} - {} ({})", song.artist, song.title, song.id);

    if page.date_groups.is_empty() {
        let _ = writeln!(out, "no metrics on this page");
    }

    for group in &page.date_groups {
        let _ = writeln!(out);
        let _ = writeln!(out, "{}", group.date.format("%Y-%m-%d"));
        let _ = writeln!(
            out,
            "  {:<15}{:>12}{:>10}{:>12}{:>10}",
            "PLATFORM", "VIEWS", "+/-", "LISTENERS", "+/-"
        );
        for entry in &group.platform_entries {
            let _ = writeln!(
                out,
                "  {:<15}{:>12}{:>10}{:>12}{:>10}",
                entry.platform.as_str(),
                entry.views.to_string(),
                entry.views_delta.to_string(),
                entry.listeners.to_string(),
                entry.listeners_delta.to_string(),
            );
        }
        for video in &group.video_infos {
            let views = video
                .view_count
                .map_or_else(|| "pending".to_string(), |c| c.to_string());
            let _ = writeln!(
                out,
                "  video #{} {} [{}] views {} ({})",
                video.track_order, video.video_title, video.channel, views, video.video_url
            );
        }
    }

    let p = &page.page;
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "page {} of {} ({} records, {} per page)",
        p.page_number, p.total_pages, p.total_elements, p.page_size
    );
    out
}
