//! Permissive parsing of user-supplied metric filters.
//!
//! A malformed date or unknown platform drops that filter (with a warning)
//! instead of failing the request.

use chrono::NaiveDate;

use crate::platform::Platform;

/// Optional narrowing applied to a song's metric records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricFilter {
    pub platform: Option<Platform>,
    /// Inclusive.
    pub start_date: Option<NaiveDate>,
    /// Inclusive.
    pub end_date: Option<NaiveDate>,
}

impl MetricFilter {
    /// Parses raw filter parameters. Blank values mean "not specified".
    #[must_use]
    pub fn parse(platform: Option<&str>, start_date: Option<&str>, end_date: Option<&str>) -> Self {
        Self {
            platform: platform.and_then(parse_platform_param),
            start_date: start_date.and_then(|raw| parse_date_param("start_date", raw)),
            end_date: end_date.and_then(|raw| parse_date_param("end_date", raw)),
        }
    }
}

/// Parses an ISO `YYYY-MM-DD` date, returning `None` for blank or invalid input.
#[must_use]
pub fn parse_date_param(field: &str, raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    match NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        Ok(date) => Some(date),
        Err(e) => {
            tracing::warn!(field, value = trimmed, error = %e, "ignoring unparseable date filter");
            None
        }
    }
}

/// Parses a platform name, returning `None` for blank or unknown input.
#[must_use]
pub fn parse_platform_param(raw: &str) -> Option<Platform> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    match trimmed.parse::<Platform>() {
        Ok(platform) => Some(platform),
        Err(e) => {
            tracing::warn!(value = trimmed, error = %e, "ignoring unknown platform filter");
            None
        }
    }
}
