//! Read queries over `metric_records`.
//!
//! Duplicate rows for one `(song, platform, date)` are collapsed in SQL with
//! `DISTINCT ON`, keeping the most recently recorded one.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgConnection;
use streamtally_core::{Count, MetricFilter, MetricRecord, Platform, StorePage};
use uuid::Uuid;

use crate::DbError;

/// A row from `metric_records`, with `platform` read as text.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MetricRecordRow {
    pub song_id: Uuid,
    pub platform: String,
    pub metric_date: NaiveDate,
    pub views: i64,
    pub listeners: i64,
    pub recorded_at: DateTime<Utc>,
}

impl TryFrom<MetricRecordRow> for MetricRecord {
    type Error = DbError;

    fn try_from(row: MetricRecordRow) -> Result<Self, Self::Error> {
        let platform = row
            .platform
            .parse::<Platform>()
            .map_err(|_| DbError::UnknownPlatform(row.platform.clone()))?;
        Ok(MetricRecord {
            song_id: row.song_id,
            platform,
            date: row.metric_date,
            views: Count::from_raw(row.views),
            listeners: Count::from_raw(row.listeners),
            recorded_at: row.recorded_at,
        })
    }
}

/// Fetches one page of authoritative records for a song, newest date first
/// and platforms in enum order, plus the size of the whole filtered set.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if either query fails, or
/// [`DbError::UnknownPlatform`] if a row carries a platform this build does
/// not know.
pub async fn fetch_metric_page(
    conn: &mut PgConnection,
    song_id: Uuid,
    filter: &MetricFilter,
    page: StorePage,
) -> Result<(Vec<MetricRecord>, i64), DbError> {
    let platform = filter.platform.map(Platform::as_str);

    let rows = sqlx::query_as::<_, MetricRecordRow>(
        "WITH latest AS ( \
             SELECT DISTINCT ON (m.platform, m.metric_date) \
                    m.song_id, m.platform, m.metric_date, m.views, m.listeners, m.recorded_at \
             FROM metric_records m \
             WHERE m.song_id = $1 \
               AND ($2::streaming_platform IS NULL OR m.platform = $2::streaming_platform) \
               AND ($3::date IS NULL OR m.metric_date >= $3::date) \
               AND ($4::date IS NULL OR m.metric_date <= $4::date) \
             ORDER BY m.platform, m.metric_date, m.recorded_at DESC, m.id DESC \
         ) \
         SELECT l.song_id, l.platform::text AS platform, l.metric_date, l.views, l.listeners, \
                l.recorded_at \
         FROM latest l \
         ORDER BY l.metric_date DESC, l.platform ASC \
         LIMIT $5 OFFSET $6",
    )
    .bind(song_id)
    .bind(platform)
    .bind(filter.start_date)
    .bind(filter.end_date)
    .bind(page.limit())
    .bind(page.offset())
    .fetch_all(&mut *conn)
    .await?;

    let total_elements = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM ( \
             SELECT DISTINCT m.platform, m.metric_date \
             FROM metric_records m \
             WHERE m.song_id = $1 \
               AND ($2::streaming_platform IS NULL OR m.platform = $2::streaming_platform) \
               AND ($3::date IS NULL OR m.metric_date >= $3::date) \
               AND ($4::date IS NULL OR m.metric_date <= $4::date) \
         ) keys",
    )
    .bind(song_id)
    .bind(platform)
    .bind(filter.start_date)
    .bind(filter.end_date)
    .fetch_one(&mut *conn)
    .await?;

    let records = rows
        .into_iter()
        .map(MetricRecord::try_from)
        .collect::<Result<Vec<_>, _>>()?;
    Ok((records, total_elements))
}

/// Fetches the authoritative record of each platform on one date, or of a
/// single platform when `platform` is given.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails, or
/// [`DbError::UnknownPlatform`] for an unrecognised platform value.
pub async fn fetch_metrics_on_date(
    conn: &mut PgConnection,
    song_id: Uuid,
    platform: Option<Platform>,
    date: NaiveDate,
) -> Result<Vec<MetricRecord>, DbError> {
    let rows = sqlx::query_as::<_, MetricRecordRow>(
        "SELECT DISTINCT ON (m.platform) \
                m.song_id, m.platform::text AS platform, m.metric_date, m.views, m.listeners, \
                m.recorded_at \
         FROM metric_records m \
         WHERE m.song_id = $1 \
           AND m.metric_date = $2 \
           AND ($3::streaming_platform IS NULL OR m.platform = $3::streaming_platform) \
         ORDER BY m.platform, m.recorded_at DESC, m.id DESC",
    )
    .bind(song_id)
    .bind(date)
    .bind(platform.map(Platform::as_str))
    .fetch_all(conn)
    .await?;

    rows.into_iter().map(MetricRecord::try_from).collect()
}
