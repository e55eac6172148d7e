use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::count::Count;
use crate::delta::Delta;
use crate::platform::Platform;

/// One platform's snapshot for one song on one calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricRecord {
    pub song_id: Uuid,
    pub platform: Platform,
    pub date: NaiveDate,
    pub views: Count,
    pub listeners: Count,
    /// When the crawler wrote the record. The latest one wins for a
    /// `(song_id, platform, date)` key.
    pub recorded_at: DateTime<Utc>,
}

/// A registered promotion period during which a video is tracked for a song.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackingWindow {
    pub id: i64,
    pub song_id: Uuid,
    pub start_date: NaiveDate,
    /// Inclusive.
    pub end_date: NaiveDate,
    pub channel: String,
    pub video_title: String,
    pub video_url: String,
    pub track_order: i32,
    pub upload_at: Option<DateTime<Utc>>,
    pub active: bool,
}

impl TrackingWindow {
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }

    #[must_use]
    pub fn overlaps(&self, min_date: NaiveDate, max_date: NaiveDate) -> bool {
        self.start_date <= max_date && min_date <= self.end_date
    }
}

/// A tracked video's view count on one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VideoViewSnapshot {
    pub tracking_window_id: i64,
    pub date: NaiveDate,
    /// `None` until the crawler has attempted this day.
    pub view_count: Option<Count>,
}

/// A tracking window as shown on one date, with that day's view count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VideoInfo {
    pub tracking_window_id: i64,
    pub channel: String,
    pub video_title: String,
    pub video_url: String,
    pub track_order: i32,
    pub upload_at: Option<DateTime<Utc>>,
    pub window_start: NaiveDate,
    pub window_end: NaiveDate,
    /// `None` means no snapshot exists for the day (not attempted yet),
    /// which is distinct from `Some(Count::CollectionError)`.
    pub view_count: Option<Count>,
}

impl VideoInfo {
    #[must_use]
    pub fn from_window(window: &TrackingWindow, view_count: Option<Count>) -> Self {
        Self {
            tracking_window_id: window.id,
            channel: window.channel.clone(),
            video_title: window.video_title.clone(),
            video_url: window.video_url.clone(),
            track_order: window.track_order,
            upload_at: window.upload_at,
            window_start: window.start_date,
            window_end: window.end_date,
            view_count,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlatformEntry {
    pub platform: Platform,
    pub views: Count,
    pub listeners: Count,
    pub views_delta: Delta,
    pub listeners_delta: Delta,
}

/// All platform entries and active videos for one calendar date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DateGroup {
    pub date: NaiveDate,
    pub platform_entries: Vec<PlatformEntry>,
    pub video_infos: Vec<VideoInfo>,
}

/// Song metadata returned alongside a metrics page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SongSummary {
    pub id: Uuid,
    pub artist: String,
    pub title: String,
    pub album: String,
    pub youtube_url: Option<String>,
    pub melon_song_id: Option<String>,
}

/// A song whose most recent crawl failed on one or more platforms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CrawlFailure {
    pub song_id: Uuid,
    pub artist: String,
    pub title: String,
    pub failed_at: DateTime<Utc>,
    pub failed_platforms: Vec<Platform>,
}
