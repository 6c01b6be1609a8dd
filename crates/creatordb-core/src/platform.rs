//! The fixed set of supported platforms and the shared source-priority tables.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A creator platform. Streaming platforms act as identity anchors; social
/// platforms act as satellites linked to an anchor during matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Twitch,
    #[serde(rename = "youtube")]
    YouTube,
    Kick,
    Trovo,
    Twitter,
    Instagram,
    #[serde(rename = "tiktok")]
    TikTok,
    #[serde(rename = "linkedin")]
    LinkedIn,
}

/// All platforms, in a stable order used when iterating identity slots.
pub const ALL_PLATFORMS: [Platform; 8] = [
    Platform::Twitch,
    Platform::YouTube,
    Platform::Kick,
    Platform::Trovo,
    Platform::Twitter,
    Platform::Instagram,
    Platform::TikTok,
    Platform::LinkedIn,
];

impl Platform {
    /// Whether this platform seeds identity clusters (live-streaming platforms).
    #[must_use]
    pub fn is_anchor(self) -> bool {
        matches!(
            self,
            Platform::Twitch | Platform::YouTube | Platform::Kick | Platform::Trovo
        )
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Platform::Twitch => "twitch",
            Platform::YouTube => "youtube",
            Platform::Kick => "kick",
            Platform::Trovo => "trovo",
            Platform::Twitter => "twitter",
            Platform::Instagram => "instagram",
            Platform::TikTok => "tiktok",
            Platform::LinkedIn => "linkedin",
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("unknown platform: {0}")]
pub struct PlatformParseError(String);

impl std::str::FromStr for Platform {
    type Err = PlatformParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "twitch" => Ok(Platform::Twitch),
            "youtube" => Ok(Platform::YouTube),
            "kick" => Ok(Platform::Kick),
            "trovo" => Ok(Platform::Trovo),
            "twitter" => Ok(Platform::Twitter),
            "instagram" => Ok(Platform::Instagram),
            "tiktok" => Ok(Platform::TikTok),
            "linkedin" => Ok(Platform::LinkedIn),
            other => Err(PlatformParseError(other.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Source-priority tables
// ---------------------------------------------------------------------------
//
// One ordered table per ambiguous attribute, shared by the attribute resolver
// and the backfill propagator. Index 0 is the highest priority. A platform
// absent from a table supplies no native signal for that attribute.

/// Country resolution priority. LinkedIn exposes location as structured data;
/// streaming platforms carry a broadcaster region; the rest require textual
/// inference. Kick and Trovo expose no country signal at all.
pub const COUNTRY_PRIORITY: &[Platform] = &[
    Platform::LinkedIn,
    Platform::Twitch,
    Platform::YouTube,
    Platform::Twitter,
    Platform::Instagram,
    Platform::TikTok,
];

/// Content-category resolution priority. Streaming platforms expose a native
/// category/directory; LinkedIn and TikTok only hint at one. Twitter and
/// Instagram expose no category signal.
pub const CATEGORY_PRIORITY: &[Platform] = &[
    Platform::Twitch,
    Platform::YouTube,
    Platform::Kick,
    Platform::Trovo,
    Platform::LinkedIn,
    Platform::TikTok,
];

/// Rank of `platform` in `table`, if it appears. Lower rank = higher priority.
#[must_use]
pub fn priority(table: &[Platform], platform: Platform) -> Option<usize> {
    table.iter().position(|&p| p == platform)
}

/// Whether `candidate` strictly outranks `incumbent` in `table`.
///
/// A candidate absent from the table never outranks anything. An incumbent of
/// `None` (no prior source) is outranked by any ranked candidate. Equal ranks
/// do not outrank, which is what makes resolution and backfill monotonic.
#[must_use]
pub fn outranks(table: &[Platform], candidate: Platform, incumbent: Option<Platform>) -> bool {
    let Some(candidate_rank) = priority(table, candidate) else {
        return false;
    };
    match incumbent.and_then(|p| priority(table, p)) {
        Some(incumbent_rank) => candidate_rank < incumbent_rank,
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anchor_platforms_are_streaming_platforms() {
        assert!(Platform::Twitch.is_anchor());
        assert!(Platform::Kick.is_anchor());
        assert!(!Platform::Twitter.is_anchor());
        assert!(!Platform::LinkedIn.is_anchor());
    }

    #[test]
    fn platform_string_round_trip() {
        for p in ALL_PLATFORMS {
            let parsed: Platform = p.as_str().parse().unwrap();
            assert_eq!(parsed, p, "round trip failed for {p}");
        }
    }

    #[test]
    fn unknown_platform_fails_to_parse() {
        let result = "myspace".parse::<Platform>();
        assert!(result.is_err(), "expected parse error, got {result:?}");
    }

    #[test]
    fn serde_uses_lowercase_names() {
        let json = serde_json::to_string(&Platform::YouTube).unwrap();
        assert_eq!(json, "\"youtube\"");
        let back: Platform = serde_json::from_str("\"linkedin\"").unwrap();
        assert_eq!(back, Platform::LinkedIn);
    }

    #[test]
    fn linkedin_outranks_twitch_for_country() {
        assert!(outranks(
            COUNTRY_PRIORITY,
            Platform::LinkedIn,
            Some(Platform::Twitch)
        ));
        assert!(!outranks(
            COUNTRY_PRIORITY,
            Platform::Twitch,
            Some(Platform::LinkedIn)
        ));
    }

    #[test]
    fn equal_rank_does_not_outrank() {
        assert!(!outranks(
            COUNTRY_PRIORITY,
            Platform::Twitch,
            Some(Platform::Twitch)
        ));
    }

    #[test]
    fn any_ranked_platform_outranks_no_source() {
        assert!(outranks(COUNTRY_PRIORITY, Platform::TikTok, None));
    }

    #[test]
    fn unranked_platform_never_outranks() {
        assert!(!outranks(COUNTRY_PRIORITY, Platform::Kick, None));
        assert!(!outranks(
            CATEGORY_PRIORITY,
            Platform::Twitter,
            Some(Platform::TikTok)
        ));
    }

    #[test]
    fn priority_tables_cover_only_known_platforms() {
        for &p in COUNTRY_PRIORITY.iter().chain(CATEGORY_PRIORITY) {
            assert!(ALL_PLATFORMS.contains(&p), "{p} not in ALL_PLATFORMS");
        }
    }
}
