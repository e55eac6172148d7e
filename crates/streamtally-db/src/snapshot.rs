//! A read-only, repeatable-read transaction that backs every store trait.

use chrono::NaiveDate;
use sqlx::{PgPool, Postgres, Transaction};
use streamtally_core::{
    MetricRecord, Platform, SongSummary, StorePage, TrackingWindow, VideoViewSnapshot,
};
use streamtally_metrics::{
    FailurePage, FailureStore, MetricPage, MetricPageRequest, MetricStore, SongCatalog,
    StoreError, WindowStore,
};
use uuid::Uuid;

use crate::{failures, metrics, songs, windows, DbError};

/// All queries issued through one `PgReadSnapshot` observe the same
/// committed state of the database.
pub struct PgReadSnapshot {
    tx: Transaction<'static, Postgres>,
}

/// Opens a `REPEATABLE READ, READ ONLY` transaction on the pool.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if a connection cannot be acquired or the
/// isolation level cannot be set.
pub async fn begin_read_snapshot(pool: &PgPool) -> Result<PgReadSnapshot, DbError> {
    let mut tx = pool.begin().await?;
    sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
        .execute(&mut *tx)
        .await?;
    Ok(PgReadSnapshot { tx })
}

impl PgReadSnapshot {
    /// Ends the snapshot. Dropping it without calling this rolls back, which
    /// is equally harmless for a read-only transaction.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Sqlx`] if the commit fails.
    pub async fn finish(self) -> Result<(), DbError> {
        self.tx.commit().await?;
        Ok(())
    }
}

impl SongCatalog for PgReadSnapshot {
    async fn find_song(&mut self, song_id: Uuid) -> Result<Option<SongSummary>, StoreError> {
        songs::find_song(&mut self.tx, song_id)
            .await
            .map_err(StoreError::new)
    }
}

impl MetricStore for PgReadSnapshot {
    async fn fetch_metric_page(
        &mut self,
        request: &MetricPageRequest,
    ) -> Result<MetricPage, StoreError> {
        let (records, total_elements) = metrics::fetch_metric_page(
            &mut self.tx,
            request.song_id,
            &request.filter,
            request.page,
        )
        .await
        .map_err(StoreError::new)?;
        Ok(MetricPage {
            records,
            total_elements,
        })
    }

    async fn fetch_metrics_on_date(
        &mut self,
        song_id: Uuid,
        platform: Option<Platform>,
        date: NaiveDate,
    ) -> Result<Vec<MetricRecord>, StoreError> {
        metrics::fetch_metrics_on_date(&mut self.tx, song_id, platform, date)
            .await
            .map_err(StoreError::new)
    }
}

impl WindowStore for PgReadSnapshot {
    async fn fetch_windows_overlapping(
        &mut self,
        song_id: Uuid,
        min_date: NaiveDate,
        max_date: NaiveDate,
    ) -> Result<Vec<TrackingWindow>, StoreError> {
        windows::fetch_windows_overlapping(&mut self.tx, song_id, min_date, max_date)
            .await
            .map_err(StoreError::new)
    }

    async fn fetch_snapshots(
        &mut self,
        window_ids: &[i64],
        min_date: NaiveDate,
        max_date: NaiveDate,
    ) -> Result<Vec<VideoViewSnapshot>, StoreError> {
        windows::fetch_snapshots(&mut self.tx, window_ids, min_date, max_date)
            .await
            .map_err(StoreError::new)
    }
}

impl FailureStore for PgReadSnapshot {
    async fn fetch_failure_page(&mut self, page: StorePage) -> Result<FailurePage, StoreError> {
        let (failures, total_elements) = failures::fetch_failure_page(&mut self.tx, page)
            .await
            .map_err(StoreError::new)?;
        Ok(FailurePage {
            failures,
            total_elements,
        })
    }
}
