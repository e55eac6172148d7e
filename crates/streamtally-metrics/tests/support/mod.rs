//! In-memory store that records every query it serves.

#![allow(dead_code)]

use std::collections::BTreeMap;

use chrono::{NaiveDate, TimeZone, Utc};
use streamtally_core::{
    Count, CrawlFailure, MetricRecord, Platform, SongSummary, StorePage, TrackingWindow,
    VideoViewSnapshot,
};
use streamtally_metrics::{
    FailurePage, FailureStore, MetricPage, MetricPageRequest, MetricStore, SongCatalog,
    StoreError, WindowStore,
};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Call {
    FindSong,
    MetricPage,
    MetricsOnDate(NaiveDate),
    WindowsOverlapping,
    Snapshots,
    FailurePage,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    pub songs: Vec<SongSummary>,
    pub records: Vec<MetricRecord>,
    pub windows: Vec<TrackingWindow>,
    pub snapshots: Vec<VideoViewSnapshot>,
    pub failures: Vec<CrawlFailure>,
    pub calls: Vec<Call>,
    /// The first call equal to this one fails instead of answering.
    pub fail_on: Option<Call>,
}

impl MemoryStore {
    pub fn with_song(song_id: Uuid) -> Self {
        Self {
            songs: vec![song(song_id)],
            ..Self::default()
        }
    }

    /// Calls other than the song lookup.
    pub fn data_queries(&self) -> usize {
        self.calls.iter().filter(|c| **c != Call::FindSong).count()
    }

    fn record_call(&mut self, call: Call) -> Result<(), StoreError> {
        self.calls.push(call);
        if self.fail_on == Some(call) {
            return Err(StoreError::new(format!("injected failure on {call:?}")));
        }
        Ok(())
    }

    /// Latest record per `(platform, date)` among those matching `keep`.
    fn authoritative(&self, keep: impl Fn(&MetricRecord) -> bool) -> Vec<MetricRecord> {
        let mut latest: BTreeMap<(NaiveDate, Platform), &MetricRecord> = BTreeMap::new();
        for record in self.records.iter().filter(|r| keep(*r)) {
            let key = (record.date, record.platform);
            match latest.get(&key) {
                Some(existing) if existing.recorded_at >= record.recorded_at => {}
                _ => {
                    latest.insert(key, record);
                }
            }
        }
        latest.into_values().cloned().collect()
    }
}

impl SongCatalog for MemoryStore {
    async fn find_song(&mut self, song_id: Uuid) -> Result<Option<SongSummary>, StoreError> {
        self.record_call(Call::FindSong)?;
        Ok(self.songs.iter().find(|s| s.id == song_id).cloned())
    }
}

impl MetricStore for MemoryStore {
    async fn fetch_metric_page(
        &mut self,
        request: &MetricPageRequest,
    ) -> Result<MetricPage, StoreError> {
        self.record_call(Call::MetricPage)?;
        let filter = request.filter;
        let mut rows = self.authoritative(|r| {
            r.song_id == request.song_id
                && filter.platform.is_none_or(|p| p == r.platform)
                && filter.start_date.is_none_or(|d| r.date >= d)
                && filter.end_date.is_none_or(|d| r.date <= d)
        });
        rows.sort_by(|a, b| b.date.cmp(&a.date).then(a.platform.cmp(&b.platform)));

        let total_elements = i64::try_from(rows.len()).unwrap();
        let offset = usize::try_from(request.page.offset()).unwrap();
        let limit = usize::try_from(request.page.limit()).unwrap();
        let records = rows.into_iter().skip(offset).take(limit).collect();
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
        self.record_call(Call::MetricsOnDate(date))?;
        Ok(self.authoritative(|r| {
            r.song_id == song_id && r.date == date && platform.is_none_or(|p| p == r.platform)
        }))
    }
}

impl WindowStore for MemoryStore {
    async fn fetch_windows_overlapping(
        &mut self,
        song_id: Uuid,
        min_date: NaiveDate,
        max_date: NaiveDate,
    ) -> Result<Vec<TrackingWindow>, StoreError> {
        self.record_call(Call::WindowsOverlapping)?;
        Ok(self
            .windows
            .iter()
            .filter(|w| w.song_id == song_id && w.overlaps(min_date, max_date))
            .cloned()
            .collect())
    }

    async fn fetch_snapshots(
        &mut self,
        window_ids: &[i64],
        min_date: NaiveDate,
        max_date: NaiveDate,
    ) -> Result<Vec<VideoViewSnapshot>, StoreError> {
        self.record_call(Call::Snapshots)?;
        Ok(self
            .snapshots
            .iter()
            .filter(|s| {
                window_ids.contains(&s.tracking_window_id) && s.date >= min_date && s.date <= max_date
            })
            .cloned()
            .collect())
    }
}

impl FailureStore for MemoryStore {
    async fn fetch_failure_page(&mut self, page: StorePage) -> Result<FailurePage, StoreError> {
        self.record_call(Call::FailurePage)?;
        let mut failures = self.failures.clone();
        failures.sort_by(|a, b| b.failed_at.cmp(&a.failed_at));
        let total_elements = i64::try_from(failures.len()).unwrap();
        let offset = usize::try_from(page.offset()).unwrap();
        let limit = usize::try_from(page.limit()).unwrap();
        Ok(FailurePage {
            failures: failures.into_iter().skip(offset).take(limit).collect(),
            total_elements,
        })
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn song(id: Uuid) -> SongSummary {
    SongSummary {
        id,
        artist: "IU".to_string(),
        title: "Love wins all".to_string(),
        album: "The Winning".to_string(),
        youtube_url: Some("https://www.youtube.com/watch?v=JleoAppaxi0".to_string()),
        melon_song_id: Some("37145732".to_string()),
    }
}

pub fn record(song_id: Uuid, platform: Platform, day: NaiveDate, views: i64) -> MetricRecord {
    MetricRecord {
        song_id,
        platform,
        date: day,
        views: Count::from_raw(views),
        listeners: Count::Unavailable,
        recorded_at: Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap(),
    }
}

pub fn window(id: i64, song_id: Uuid, start: NaiveDate, end: NaiveDate) -> TrackingWindow {
    TrackingWindow {
        id,
        song_id,
        start_date: start,
        end_date: end,
        channel: "1theK".to_string(),
        video_title: format!("MV #{id}"),
        video_url: format!("https://youtu.be/video{id}"),
        track_order: 1,
        upload_at: None,
        active: true,
    }
}
