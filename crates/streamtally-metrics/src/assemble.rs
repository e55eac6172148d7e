//! Turns one page of raw metric records into delta-annotated date groups.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use chrono::NaiveDate;
use streamtally_core::{delta_against, DateGroup, MetricRecord, Platform, PlatformEntry};
use uuid::Uuid;

use crate::error::StoreError;
use crate::store::{MetricStore, WindowStore};
use crate::video::load_windows_and_views;

type DayRecords = BTreeMap<Platform, MetricRecord>;
type RecordsByDate = BTreeMap<NaiveDate, DayRecords>;

/// A page of records plus what the assembler needs to know about its context.
#[derive(Debug, Clone)]
pub struct PageSlice {
    pub song_id: Uuid,
    /// Platform filter the page was fetched with; previous-day lookups use it too.
    pub platform: Option<Platform>,
    pub records: Vec<MetricRecord>,
    /// True when rows exist past this page, so the oldest date may be split.
    pub more_rows_follow: bool,
}

/// Groups a page of records by date and annotates each entry with its
/// day-over-day delta and the videos active on that date.
///
/// Dates come out newest first, entries in fixed platform order. Only dates
/// present in the page produce a group. Previous-day values come from the
/// page itself where possible; the day before the oldest date is fetched in
/// one query, and a second query fills in the oldest date when the page may
/// have cut it off. Video metadata is loaded once for the whole date span.
///
/// An empty page yields no groups and issues no queries.
///
/// # Errors
///
/// Returns [`StoreError`] from any failed store query, unchanged.
pub async fn assemble_date_groups<S>(
    store: &mut S,
    slice: PageSlice,
) -> Result<Vec<DateGroup>, StoreError>
where
    S: MetricStore + WindowStore,
{
    let PageSlice {
        song_id,
        platform,
        records,
        more_rows_follow,
    } = slice;

    let page = collapse(records);
    let (Some(&min_date), Some(&max_date)) = (page.keys().next(), page.keys().next_back()) else {
        return Ok(Vec::new());
    };

    let mut outside = RecordsByDate::new();
    let mut queries = 0_usize;

    if let Some(boundary) = min_date.pred_opt() {
        let prior = store
            .fetch_metrics_on_date(song_id, platform, boundary)
            .await?;
        queries += 1;
        outside.extend(collapse(prior));
    }

    if more_rows_follow && oldest_date_needs_fill(&page, min_date) {
        let fill = store
            .fetch_metrics_on_date(song_id, platform, min_date)
            .await?;
        queries += 1;
        tracing::debug!(%song_id, %min_date, rows = fill.len(), "filled split oldest date");
        outside.extend(collapse(fill));
    }

    let mut videos = load_windows_and_views(store, song_id, min_date, max_date).await?;
    queries += 2;

    tracing::debug!(
        %song_id,
        dates = page.len(),
        queries,
        "assembled date groups"
    );

    let groups = page
        .iter()
        .rev()
        .map(|(&date, day)| {
            let platform_entries = day
                .values()
                .map(|record| {
                    let previous = previous_day(&page, &outside, date, record.platform);
                    annotate(record, previous)
                })
                .collect();
            DateGroup {
                date,
                platform_entries,
                video_infos: videos.remove(&date).unwrap_or_default(),
            }
        })
        .collect();

    Ok(groups)
}

/// Indexes records by date and platform, keeping the latest recorded one per key.
fn collapse(records: impl IntoIterator<Item = MetricRecord>) -> RecordsByDate {
    let mut by_date = RecordsByDate::new();
    for record in records {
        match by_date.entry(record.date).or_default().entry(record.platform) {
            Entry::Vacant(slot) => {
                slot.insert(record);
            }
            Entry::Occupied(mut slot) => {
                if record.recorded_at > slot.get().recorded_at {
                    slot.insert(record);
                }
            }
        }
    }
    by_date
}

/// Whether the day after `min_date` has a platform that `min_date` lacks in the page.
fn oldest_date_needs_fill(page: &RecordsByDate, min_date: NaiveDate) -> bool {
    let Some(next_day) = min_date.succ_opt().and_then(|d| page.get(&d)) else {
        return false;
    };
    let oldest = page.get(&min_date);
    next_day
        .keys()
        .any(|platform| oldest.is_none_or(|day| !day.contains_key(platform)))
}

fn previous_day<'a>(
    page: &'a RecordsByDate,
    outside: &'a RecordsByDate,
    date: NaiveDate,
    platform: Platform,
) -> Option<&'a MetricRecord> {
    let prev = date.pred_opt()?;
    page.get(&prev)
        .and_then(|day| day.get(&platform))
        .or_else(|| outside.get(&prev).and_then(|day| day.get(&platform)))
}

fn annotate(record: &MetricRecord, previous: Option<&MetricRecord>) -> PlatformEntry {
    PlatformEntry {
        platform: record.platform,
        views: record.views,
        listeners: record.listeners,
        views_delta: delta_against(record.views, previous.map(|p| p.views)),
        listeners_delta: delta_against(record.listeners, previous.map(|p| p.listeners)),
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use streamtally_core::Count;

    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn record(platform: Platform, day: NaiveDate, views: i64, hour: u32) -> MetricRecord {
        MetricRecord {
            song_id: Uuid::nil(),
            platform,
            date: day,
            views: Count::from_raw(views),
            listeners: Count::Unavailable,
            recorded_at: Utc.with_ymd_and_hms(2024, 6, 1, hour, 0, 0).unwrap(),
        }
    }

    #[test]
    fn collapse_keeps_latest_recorded_duplicate() {
        let day = date(2024, 1, 1);
        let collapsed = collapse(vec![
            record(Platform::Melon, day, 100, 9),
            record(Platform::Melon, day, 120, 18),
            record(Platform::Melon, day, 110, 12),
        ]);
        assert_eq!(collapsed[&day][&Platform::Melon].views, Count::Known(120));
    }

    #[test]
    fn fill_needed_only_when_oldest_date_lacks_a_platform() {
        let (d1, d2) = (date(2024, 1, 1), date(2024, 1, 2));
        let complete = collapse(vec![
            record(Platform::Melon, d2, 1, 0),
            record(Platform::Genie, d2, 1, 0),
            record(Platform::Melon, d1, 1, 0),
            record(Platform::Genie, d1, 1, 0),
        ]);
        assert!(!oldest_date_needs_fill(&complete, d1));

        let split = collapse(vec![
            record(Platform::Melon, d2, 1, 0),
            record(Platform::Genie, d2, 1, 0),
            record(Platform::Melon, d1, 1, 0),
        ]);
        assert!(oldest_date_needs_fill(&split, d1));
    }

    #[test]
    fn previous_day_prefers_page_then_outside() {
        let (d1, d2) = (date(2024, 1, 1), date(2024, 1, 2));
        let page = collapse(vec![record(Platform::Melon, d2, 150, 0)]);
        let outside = collapse(vec![record(Platform::Melon, d1, 100, 0)]);
        let prev = previous_day(&page, &outside, d2, Platform::Melon).expect("previous");
        assert_eq!(prev.views, Count::Known(100));
        assert!(previous_day(&page, &outside, d2, Platform::Genie).is_none());
    }

    #[test]
    fn annotate_uses_unavailable_without_previous() {
        let entry = annotate(&record(Platform::Melon, date(2024, 1, 1), 100, 0), None);
        assert_eq!(entry.views_delta, streamtally_core::Delta::Unavailable);
    }
}
