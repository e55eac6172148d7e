//! Streaming-metrics aggregation: paginated, date-grouped, delta-annotated
//! metric series with the tracking-window videos active on each date.

pub mod assemble;
pub mod error;
pub mod service;
pub mod store;
pub mod video;

pub use assemble::{assemble_date_groups, PageSlice};
pub use error::{MetricsError, StoreError};
pub use service::{get_failure_page, get_page, FailureListing, MetricsPage, MetricsQuery};
pub use store::{
    FailurePage, FailureStore, MetricPage, MetricPageRequest, MetricStore, SongCatalog,
    WindowStore,
};
pub use video::{load_windows_and_views, VideosByDate};
