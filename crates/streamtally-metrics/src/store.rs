//! Read contracts the engine consumes.
//!
//! Every method takes `&mut self` so one implementation can run all of an
//! invocation's queries on a single snapshot transaction.

use std::future::Future;

use chrono::NaiveDate;
use streamtally_core::{
    CrawlFailure, MetricFilter, MetricRecord, Platform, SongSummary, StorePage, TrackingWindow,
    VideoViewSnapshot,
};
use uuid::Uuid;

use crate::error::StoreError;

/// One filtered, paginated slice of a song's metric records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricPageRequest {
    pub song_id: Uuid,
    pub filter: MetricFilter,
    pub page: StorePage,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetricPage {
    /// Ordered by date descending, then fixed platform order.
    pub records: Vec<MetricRecord>,
    /// Row count of the whole filtered set, not just this slice.
    pub total_elements: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FailurePage {
    /// Newest failure first.
    pub failures: Vec<CrawlFailure>,
    pub total_elements: i64,
}

pub trait SongCatalog {
    fn find_song(
        &mut self,
        song_id: Uuid,
    ) -> impl Future<Output = Result<Option<SongSummary>, StoreError>> + Send;
}

pub trait MetricStore {
    /// Fetches one page of records. At most one record per `(platform, date)`
    /// is returned: the most recently recorded one.
    fn fetch_metric_page(
        &mut self,
        request: &MetricPageRequest,
    ) -> impl Future<Output = Result<MetricPage, StoreError>> + Send;

    /// Fetches the authoritative records of one date, for one platform or for
    /// all of them when `platform` is `None`.
    fn fetch_metrics_on_date(
        &mut self,
        song_id: Uuid,
        platform: Option<Platform>,
        date: NaiveDate,
    ) -> impl Future<Output = Result<Vec<MetricRecord>, StoreError>> + Send;
}

pub trait WindowStore {
    /// Windows whose `[start_date, end_date]` intersects `[min_date, max_date]`.
    fn fetch_windows_overlapping(
        &mut self,
        song_id: Uuid,
        min_date: NaiveDate,
        max_date: NaiveDate,
    ) -> impl Future<Output = Result<Vec<TrackingWindow>, StoreError>> + Send;

    fn fetch_snapshots(
        &mut self,
        window_ids: &[i64],
        min_date: NaiveDate,
        max_date: NaiveDate,
    ) -> impl Future<Output = Result<Vec<VideoViewSnapshot>, StoreError>> + Send;
}

pub trait FailureStore {
    fn fetch_failure_page(
        &mut self,
        page: StorePage,
    ) -> impl Future<Output = Result<FailurePage, StoreError>> + Send;
}
