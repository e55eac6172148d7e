//! Observed counts with the crawler's sentinel values lifted into a sum type.
//!
//! The crawler writes `-1` when a platform does not report a metric and
//! `-999` when a crawl attempt failed. Both are decoded here, at the record
//! boundary, so nothing downstream does arithmetic on them.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Raw sentinel: the platform does not report this metric, or it was never collected.
pub const NO_DATA: i64 = -1;
/// Raw sentinel: the crawl attempt for this value failed.
pub const COLLECTION_ERROR: i64 = -999;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum Count {
    Known(u64),
    Unavailable,
    CollectionError,
}

impl Count {
    /// Decodes a stored value. Any negative value other than
    /// [`COLLECTION_ERROR`] is treated as [`Count::Unavailable`].
    #[must_use]
    pub fn from_raw(raw: i64) -> Self {
        match raw {
            COLLECTION_ERROR => Count::CollectionError,
            n if n < 0 => Count::Unavailable,
            n => Count::Known(n.unsigned_abs()),
        }
    }

    /// Encodes back to the stored representation. Counts above `i64::MAX`
    /// saturate.
    #[must_use]
    pub fn to_raw(self) -> i64 {
        match self {
            Count::Known(n) => i64::try_from(n).unwrap_or(i64::MAX),
            Count::Unavailable => NO_DATA,
            Count::CollectionError => COLLECTION_ERROR,
        }
    }

    #[must_use]
    pub fn known(self) -> Option<u64> {
        match self {
            Count::Known(n) => Some(n),
            Count::Unavailable | Count::CollectionError => None,
        }
    }
}

impl fmt::Display for Count {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Count::Known(n) => write!(f, "{n}"),
            Count::Unavailable => f.write_str("-"),
            Count::CollectionError => f.write_str("Fail"),
        }
    }
}
