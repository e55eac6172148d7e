use sqlx::{migrate::MigrateError, postgres::PgPoolOptions, PgPool};
use std::time::Duration;
use streamtally_core::AppConfig;
use thiserror::Error;

const DEFAULT_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_MIN_CONNECTIONS: u32 = 1;
const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 10;

/// Postgres SQLSTATE `undefined_table`.
const UNDEFINED_TABLE: &str = "42P01";

// Path relative to crates/streamtally-db/Cargo.toml; resolves to <workspace-root>/migrations/
static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations");

#[derive(Debug, Clone, Copy)]
pub struct PoolConfig {
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_connections: DEFAULT_MAX_CONNECTIONS,
            min_connections: DEFAULT_MIN_CONNECTIONS,
            acquire_timeout_secs: DEFAULT_ACQUIRE_TIMEOUT_SECS,
        }
    }
}

impl PoolConfig {
    /// Pool settings from the validated application config.
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            max_connections: config.db_max_connections,
            min_connections: config.db_min_connections,
            acquire_timeout_secs: config.db_acquire_timeout_secs,
        }
    }
}

#[derive(Debug, Error)]
pub enum DbError {
    #[error("unknown platform value in database: {0}")]
    UnknownPlatform(String),
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
    #[error(transparent)]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Connect to a Postgres pool using explicit URL and config.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the connection cannot be established.
pub async fn connect_pool(database_url: &str, config: PoolConfig) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .connect(database_url)
        .await
}

/// Run all pending migrations against the pool.
///
/// Returns the number of migrations that were applied.
///
/// # Errors
///
/// Returns [`sqlx::migrate::MigrateError`] if any migration fails or the
/// migration history cannot be read.
pub async fn run_migrations(pool: &PgPool) -> Result<usize, MigrateError> {
    let applied_before = applied_migrations(pool).await?;
    MIGRATOR.run(pool).await?;
    let applied_after = applied_migrations(pool).await?;

    let delta = (applied_after - applied_before).max(0);
    Ok(usize::try_from(delta).unwrap_or(0))
}

async fn applied_migrations(pool: &PgPool) -> Result<i64, MigrateError> {
    let counted =
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM _sqlx_migrations WHERE success = true")
            .fetch_one(pool)
            .await;
    zero_if_history_missing(counted).map_err(MigrateError::Execute)
}

/// A fresh database has no `_sqlx_migrations` table yet; that counts as zero
/// applied. Any other failure is passed through.
fn zero_if_history_missing(counted: Result<i64, sqlx::Error>) -> Result<i64, sqlx::Error> {
    match counted {
        Err(sqlx::Error::Database(db)) if db.code().as_deref() == Some(UNDEFINED_TABLE) => Ok(0),
        other => other,
    }
}

/// Send a `SELECT 1` to verify the pool has a live connection.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn ping(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(pool)
        .await?;
    Ok(())
}

/// Run a full health check: ping the pool and return a typed error on failure.
///
/// # Errors
///
/// Returns [`DbError`] if the ping fails.
pub async fn health_check(pool: &PgPool) -> Result<(), DbError> {
    ping(pool).await?;
    tracing::debug!("database health check passed");
    Ok(())
}


pub mod failures;
pub mod metrics;
pub mod snapshot;
pub mod songs;
pub mod windows;

pub use failures::{fetch_failure_page, CrawlFailureRow};
pub use metrics::{fetch_metric_page, fetch_metrics_on_date, MetricRecordRow};
pub use snapshot::{begin_read_snapshot, PgReadSnapshot};
pub use songs::{find_song, SongRow};
pub use windows::{
    fetch_snapshots, fetch_windows_overlapping, TrackingWindowRow, VideoViewSnapshotRow,
};
