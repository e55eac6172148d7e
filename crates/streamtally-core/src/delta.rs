//! Day-over-day change between two observed counts.

use std::fmt;

use serde::{Serialize, Serializer};

use crate::count::{Count, NO_DATA};

/// The change in a metric from one day to the next.
///
/// A missing prior day and a collection error on either side both collapse
/// to [`Delta::Unavailable`]; callers cannot tell them apart from the delta.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Delta {
    Change(i64),
    Unavailable,
}

impl Delta {
    /// Encodes to the legacy integer form, where unavailable is [`NO_DATA`].
    ///
    /// Lossy: a genuine change of `-1` encodes to the same value.
    #[must_use]
    pub fn to_raw(self) -> i64 {
        match self {
            Delta::Change(n) => n,
            Delta::Unavailable => NO_DATA,
        }
    }

    #[must_use]
    pub fn change(self) -> Option<i64> {
        match self {
            Delta::Change(n) => Some(n),
            Delta::Unavailable => None,
        }
    }
}

/// Computes `current - previous` when both counts are known.
///
/// Negative results are kept: platforms do revise counts downward. Any
/// unavailable or failed operand yields [`Delta::Unavailable`].
#[must_use]
pub fn compute_delta(current: Count, previous: Count) -> Delta {
    match (current, previous) {
        (Count::Known(cur), Count::Known(prev)) => {
            let diff = i128::from(cur) - i128::from(prev);
            let clamped = diff.clamp(i128::from(i64::MIN), i128::from(i64::MAX));
            Delta::Change(i64::try_from(clamped).unwrap_or_default())
        }
        _ => Delta::Unavailable,
    }
}

/// Like [`compute_delta`], treating an absent previous-day record as unavailable.
#[must_use]
pub fn delta_against(current: Count, previous: Option<Count>) -> Delta {
    compute_delta(current, previous.unwrap_or(Count::Unavailable))
}

impl Serialize for Delta {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Delta::Change(n) => serializer.serialize_some(n),
            Delta::Unavailable => serializer.serialize_none(),
        }
    }
}

impl fmt::Display for Delta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Delta::Change(n) => write!(f, "{n}"),
            Delta::Unavailable => f.write_str("-"),
        }
    }
}
