//! Entry points that run a whole metrics or failure-listing request.

use serde::Serialize;
use streamtally_core::{
    to_store_page, CrawlFailure, DateGroup, MetricFilter, PageWindow, SongSummary,
    DEFAULT_PAGE_SIZE,
};
use uuid::Uuid;

use crate::assemble::{assemble_date_groups, PageSlice};
use crate::error::MetricsError;
use crate::store::{FailureStore, MetricPageRequest, MetricStore, SongCatalog, WindowStore};

/// A request for one page of a song's metrics, as a caller phrases it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricsQuery {
    pub song_id: Uuid,
    pub filter: MetricFilter,
    /// 1-based; values below 1 are clamped.
    pub ui_page: i64,
    /// Sizes outside the allowed set fall back to the default.
    pub requested_size: i64,
}

impl MetricsQuery {
    /// First page at the default size, no filters.
    #[must_use]
    pub fn new(song_id: Uuid) -> Self {
        Self {
            song_id,
            filter: MetricFilter::default(),
            ui_page: 1,
            requested_size: i64::from(DEFAULT_PAGE_SIZE),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricsPage {
    pub song: SongSummary,
    pub date_groups: Vec<DateGroup>,
    pub page: PageWindow,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailureListing {
    pub failures: Vec<CrawlFailure>,
    pub page: PageWindow,
}

/// Fetches one page of a song's metric records and assembles it into
/// delta-annotated date groups.
///
/// Pagination counts raw records, so a date can straddle two pages. A page
/// past the end comes back empty with correct totals.
///
/// # Errors
///
/// Returns [`MetricsError::SongNotFound`] if the song does not exist, or
/// [`MetricsError::StoreUnavailable`] if any query fails.
pub async fn get_page<S>(store: &mut S, query: &MetricsQuery) -> Result<MetricsPage, MetricsError>
where
    S: SongCatalog + MetricStore + WindowStore,
{
    let song = store
        .find_song(query.song_id)
        .await?
        .ok_or(MetricsError::SongNotFound(query.song_id))?;

    let page = to_store_page(query.ui_page, query.requested_size);
    let request = MetricPageRequest {
        song_id: query.song_id,
        filter: query.filter,
        page,
    };
    let fetched = store.fetch_metric_page(&request).await?;
    let window = PageWindow::from_total(page, fetched.total_elements);

    let rows_through_page = page.offset().saturating_add(len_as_i64(fetched.records.len()));
    let slice = PageSlice {
        song_id: query.song_id,
        platform: query.filter.platform,
        more_rows_follow: rows_through_page < fetched.total_elements,
        records: fetched.records,
    };

    tracing::debug!(
        song_id = %query.song_id,
        page = window.page_number,
        size = window.page_size,
        total = window.total_elements,
        records = slice.records.len(),
        "fetched metric page"
    );

    let date_groups = assemble_date_groups(store, slice).await?;

    Ok(MetricsPage {
        song,
        date_groups,
        page: window,
    })
}

/// Lists songs whose most recent crawl failed, newest failure first.
///
/// # Errors
///
/// Returns [`MetricsError::StoreUnavailable`] if the query fails.
pub async fn get_failure_page<S>(
    store: &mut S,
    ui_page: i64,
    requested_size: i64,
) -> Result<FailureListing, MetricsError>
where
    S: FailureStore,
{
    let page = to_store_page(ui_page, requested_size);
    let fetched = store.fetch_failure_page(page).await?;
    Ok(FailureListing {
        failures: fetched.failures,
        page: PageWindow::from_total(page, fetched.total_elements),
    })
}

fn len_as_i64(len: usize) -> i64 {
    i64::try_from(len).unwrap_or(i64::MAX)
}
