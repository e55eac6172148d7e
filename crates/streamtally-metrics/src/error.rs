use std::error::Error as StdError;

use thiserror::Error;
use uuid::Uuid;

/// A failed read against a backing store, carrying the underlying cause.
#[derive(Debug, Error)]
#[error("store unavailable: {source}")]
pub struct StoreError {
    #[source]
    source: Box<dyn StdError + Send + Sync + 'static>,
}

impl StoreError {
    #[must_use]
    pub fn new<E>(source: E) -> Self
    where
        E: Into<Box<dyn StdError + Send + Sync + 'static>>,
    {
        Self {
            source: source.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("song not found: {0}")]
    SongNotFound(Uuid),
    #[error(transparent)]
    StoreUnavailable(#[from] StoreError),
}
