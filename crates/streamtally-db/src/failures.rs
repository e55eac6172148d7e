//! Read queries over `crawl_failures`.

use chrono::{DateTime, Utc};
use sqlx::PgConnection;
use streamtally_core::{parse_platform_list, CrawlFailure, StorePage};
use uuid::Uuid;

use crate::DbError;

/// A `crawl_failures` row joined with its song's artist and title.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CrawlFailureRow {
    pub song_id: Uuid,
    pub artist: String,
    pub title: String,
    pub failed_at: DateTime<Utc>,
    /// Comma-separated, e.g. `MELON,GENIE`.
    pub failed_platforms: String,
}

impl From<CrawlFailureRow> for CrawlFailure {
    fn from(row: CrawlFailureRow) -> Self {
        CrawlFailure {
            failed_platforms: parse_platform_list(&row.failed_platforms),
            song_id: row.song_id,
            artist: row.artist,
            title: row.title,
            failed_at: row.failed_at,
        }
    }
}

/// Fetches one page of crawl failures, newest first, plus the total count.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if either query fails.
pub async fn fetch_failure_page(
    conn: &mut PgConnection,
    page: StorePage,
) -> Result<(Vec<CrawlFailure>, i64), DbError> {
    let rows = sqlx::query_as::<_, CrawlFailureRow>(
        "SELECT f.song_id, s.artist, s.title, f.failed_at, f.failed_platforms \
         FROM crawl_failures f \
         JOIN songs s ON s.id = f.song_id \
         ORDER BY f.failed_at DESC, f.id DESC \
         LIMIT $1 OFFSET $2",
    )
    .bind(page.limit())
    .bind(page.offset())
    .fetch_all(&mut *conn)
    .await?;

    let total_elements = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM crawl_failures")
        .fetch_one(&mut *conn)
        .await?;

    Ok((rows.into_iter().map(CrawlFailure::from).collect(), total_elements))
}
