//! Batched loading of tracking-window video metadata for a date range.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use streamtally_core::{Count, VideoInfo};
use uuid::Uuid;

use crate::error::StoreError;
use crate::store::WindowStore;

/// Video metadata keyed by calendar date.
pub type VideosByDate = BTreeMap<NaiveDate, Vec<VideoInfo>>;

/// Loads every tracking window of `song_id` active within `[min_date, max_date]`
/// together with its daily view snapshots.
///
/// Issues exactly two store queries no matter how many dates or windows the
/// range covers. Every date in the range that at least one window contains
/// gets an entry, with videos ordered by track order then window id. A window
/// without a snapshot for a date yields `view_count: None`.
///
/// # Errors
///
/// Returns [`StoreError`] if either query fails.
pub async fn load_windows_and_views<S>(
    store: &mut S,
    song_id: Uuid,
    min_date: NaiveDate,
    max_date: NaiveDate,
) -> Result<VideosByDate, StoreError>
where
    S: WindowStore,
{
    let mut windows = store
        .fetch_windows_overlapping(song_id, min_date, max_date)
        .await?;
    windows.sort_by_key(|w| (w.track_order, w.id));

    let window_ids: Vec<i64> = windows.iter().map(|w| w.id).collect();
    let snapshots = store
        .fetch_snapshots(&window_ids, min_date, max_date)
        .await?;

    tracing::debug!(
        %song_id,
        %min_date,
        %max_date,
        windows = windows.len(),
        snapshots = snapshots.len(),
        "loaded tracking windows"
    );

    let view_counts: HashMap<(i64, NaiveDate), Option<Count>> = snapshots
        .into_iter()
        .map(|s| ((s.tracking_window_id, s.date), s.view_count))
        .collect();

    let mut by_date = VideosByDate::new();
    if windows.is_empty() {
        return Ok(by_date);
    }

    for date in min_date.iter_days().take_while(|d| *d <= max_date) {
        let infos: Vec<VideoInfo> = windows
            .iter()
            .filter(|w| w.contains(date))
            .map(|w| {
                let view_count = view_counts.get(&(w.id, date)).copied().flatten();
                VideoInfo::from_window(w, view_count)
            })
            .collect();
        if !infos.is_empty() {
            by_date.insert(date, infos);
        }
    }

    Ok(by_date)
}
