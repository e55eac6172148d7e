//! Read queries over `tracking_windows` and `video_view_snapshots`.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgConnection;
use streamtally_core::{Count, TrackingWindow, VideoViewSnapshot};
use uuid::Uuid;

use crate::DbError;

/// A row from the `tracking_windows` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TrackingWindowRow {
    pub id: i64,
    pub song_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub channel: String,
    pub video_title: String,
    pub video_url: String,
    pub track_order: i32,
    pub upload_at: Option<DateTime<Utc>>,
    pub is_active: bool,
}

impl From<TrackingWindowRow> for TrackingWindow {
    fn from(row: TrackingWindowRow) -> Self {
        TrackingWindow {
            id: row.id,
            song_id: row.song_id,
            start_date: row.start_date,
            end_date: row.end_date,
            channel: row.channel,
            video_title: row.video_title,
            video_url: row.video_url,
            track_order: row.track_order,
            upload_at: row.upload_at,
            active: row.is_active,
        }
    }
}

/// A row from the `video_view_snapshots` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct VideoViewSnapshotRow {
    pub tracking_window_id: i64,
    pub snapshot_date: NaiveDate,
    /// `NULL` until the crawler has attempted the day.
    pub view_count: Option<i64>,
}

impl From<VideoViewSnapshotRow> for VideoViewSnapshot {
    fn from(row: VideoViewSnapshotRow) -> Self {
        VideoViewSnapshot {
            tracking_window_id: row.tracking_window_id,
            date: row.snapshot_date,
            view_count: row.view_count.map(Count::from_raw),
        }
    }
}

/// Returns every window of `song_id` that intersects `[min_date, max_date]`,
/// active or not, ordered by track order then id.
///
/// `is_active` only tells the crawler whether to keep collecting views; a
/// deactivated window still describes what promoted the song on its dates.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn fetch_windows_overlapping(
    conn: &mut PgConnection,
    song_id: Uuid,
    min_date: NaiveDate,
    max_date: NaiveDate,
) -> Result<Vec<TrackingWindow>, DbError> {
    let rows = sqlx::query_as::<_, TrackingWindowRow>(
        "SELECT id, song_id, start_date, end_date, channel, video_title, video_url, \
                track_order, upload_at, is_active \
         FROM tracking_windows \
         WHERE song_id = $1 AND start_date <= $3 AND end_date >= $2 \
         ORDER BY track_order, id",
    )
    .bind(song_id)
    .bind(min_date)
    .bind(max_date)
    .fetch_all(conn)
    .await?;

    Ok(rows.into_iter().map(TrackingWindow::from).collect())
}

/// Returns the snapshots of the given windows dated within `[min_date, max_date]`.
///
/// An empty `window_ids` slice still runs the query and matches nothing.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn fetch_snapshots(
    conn: &mut PgConnection,
    window_ids: &[i64],
    min_date: NaiveDate,
    max_date: NaiveDate,
) -> Result<Vec<VideoViewSnapshot>, DbError> {
    let rows = sqlx::query_as::<_, VideoViewSnapshotRow>(
        "SELECT tracking_window_id, snapshot_date, view_count \
         FROM video_view_snapshots \
         WHERE tracking_window_id = ANY($1) \
           AND snapshot_date BETWEEN $2 AND $3 \
         ORDER BY tracking_window_id, snapshot_date",
    )
    .bind(window_ids)
    .bind(min_date)
    .bind(max_date)
    .fetch_all(conn)
    .await?;

    Ok(rows.into_iter().map(VideoViewSnapshot::from).collect())
}
