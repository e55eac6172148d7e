pub mod app_config;
pub mod config;
pub mod count;
pub mod crawl_gate;
pub mod delta;
pub mod filter;
pub mod model;
pub mod pagination;
pub mod platform;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use count::{Count, COLLECTION_ERROR, NO_DATA};
pub use crawl_gate::{CrawlGate, CrawlPermit, CrawlPhase};
pub use delta::{compute_delta, delta_against, Delta};
pub use filter::{parse_date_param, parse_platform_param, MetricFilter};
pub use model::{
    CrawlFailure, DateGroup, MetricRecord, PlatformEntry, SongSummary, TrackingWindow, VideoInfo,
    VideoViewSnapshot,
};
pub use pagination::{to_store_page, PageWindow, StorePage, ALLOWED_PAGE_SIZES, DEFAULT_PAGE_SIZE};
pub use platform::{parse_platform_list, Platform};

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("unknown platform: {0}")]
    UnknownPlatform(String),
    #[error("a crawl is already running")]
    CrawlAlreadyRunning,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
