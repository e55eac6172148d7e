use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::CoreError;

/// A tracked streaming or video service.
///
/// Declaration order is the fixed presentation order: entries within a date
/// group are sorted by the derived `Ord`, and the Postgres
/// `streaming_platform` enum is declared in the same order so that
/// `ORDER BY platform` agrees with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Platform {
    Melon,
    Genie,
    Youtube,
    YoutubeMusic,
}

impl Platform {
    pub const ALL: [Platform; 4] = [
        Platform::Melon,
        Platform::Genie,
        Platform::Youtube,
        Platform::YoutubeMusic,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Platform::Melon => "MELON",
            Platform::Genie => "GENIE",
            Platform::Youtube => "YOUTUBE",
            Platform::YoutubeMusic => "YOUTUBE_MUSIC",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Case-insensitive; `-` and spaces are accepted in place of `_`.
impl FromStr for Platform {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace(['-', ' '], "_");
        Platform::ALL
            .into_iter()
            .find(|p| p.as_str() == normalized)
            .ok_or_else(|| CoreError::UnknownPlatform(s.to_string()))
    }
}

/// Parses a stored comma-separated platform list such as `"MELON,GENIE"`.
///
/// Unknown tokens are skipped with a warning. The result is deduplicated and
/// in fixed platform order.
#[must_use]
pub fn parse_platform_list(raw: &str) -> Vec<Platform> {
    let mut platforms: Vec<Platform> = raw
        .split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .filter_map(|token| match token.parse::<Platform>() {
            Ok(platform) => Some(platform),
            Err(e) => {
                tracing::warn!(token, error = %e, "skipping unknown platform in stored list");
                None
            }
        })
        .collect();
    platforms.sort_unstable();
    platforms.dedup();
    platforms
}
