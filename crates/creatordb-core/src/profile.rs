//! Domain types for source profile records and unified identities.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::platform::Platform;

/// One per-platform creator profile record, as populated by the ingestion
/// collaborators. This core reads these and mutates only the inferred
/// attribute fields (backfill).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceProfile {
    pub id: i64,
    pub platform: Platform,
    pub username: String,
    pub display_name: String,
    pub followers: i64,
    pub avatar_url: Option<String>,
    pub profile_url: Option<String>,
    pub language: Option<String>,
    /// Native country signal where the platform exposes one.
    pub region: Option<String>,
    pub tags: BTreeSet<String>,
    /// Raw social link URLs found on the profile page.
    pub social_links: Vec<String>,
    pub inferred_country: Option<String>,
    pub inferred_country_source: Option<Platform>,
    pub inferred_category: Option<String>,
    pub inferred_category_source: Option<Platform>,
    /// Native platform category (e.g. a Twitch directory category).
    pub primary_category: Option<String>,
    pub current_game: Option<String>,
}

/// Snapshot of one source profile occupying a platform slot on a unified
/// identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformSnapshot {
    pub source_profile_id: i64,
    pub username: String,
    pub display_name: String,
    pub followers: i64,
    pub avatar_url: Option<String>,
    pub profile_url: Option<String>,
    pub verified: bool,
}

/// The merged cross-platform profile representing one real creator or
/// organization. Exclusively owned by the unification pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnifiedIdentity {
    pub display_name: String,
    pub country: Option<String>,
    pub country_source: Option<Platform>,
    pub primary_category: Option<String>,
    pub category_source: Option<Platform>,
    pub tags: BTreeSet<String>,
    /// At most one snapshot per platform type.
    pub platforms: BTreeMap<Platform, PlatformSnapshot>,
    pub total_reach: i64,
    pub platform_count: i32,
    pub source_streamer_ids: BTreeSet<i64>,
    pub last_verified_at: DateTime<Utc>,
}

impl UnifiedIdentity {
    /// Recompute `total_reach` and `platform_count` from the filled slots.
    ///
    /// These two fields are always derived, never carried over from elsewhere:
    /// `total_reach` is the sum of followers across filled slots and
    /// `platform_count` the number of filled slots.
    pub fn recompute_totals(&mut self) {
        self.total_reach = self.platforms.values().map(|s| s.followers).sum();
        self.platform_count = i32::try_from(self.platforms.len()).unwrap_or(i32::MAX);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(id: i64, followers: i64) -> PlatformSnapshot {
        PlatformSnapshot {
            source_profile_id: id,
            username: format!("user{id}"),
            display_name: format!("User {id}"),
            followers,
            avatar_url: None,
            profile_url: None,
            verified: false,
        }
    }

    #[test]
    fn recompute_totals_sums_filled_slots() {
        let mut identity = UnifiedIdentity {
            display_name: "User 1".to_string(),
            country: None,
            country_source: None,
            primary_category: None,
            category_source: None,
            tags: BTreeSet::new(),
            platforms: BTreeMap::from([
                (Platform::Twitch, snapshot(1, 200_000)),
                (Platform::Twitter, snapshot(2, 50_000)),
            ]),
            total_reach: 0,
            platform_count: 0,
            source_streamer_ids: BTreeSet::from([1, 2]),
            last_verified_at: Utc::now(),
        };

        identity.recompute_totals();

        assert_eq!(identity.total_reach, 250_000);
        assert_eq!(identity.platform_count, 2);
    }

    #[test]
    fn recompute_totals_empty_identity_is_zero() {
        let mut identity = UnifiedIdentity {
            display_name: String::new(),
            country: None,
            country_source: None,
            primary_category: None,
            category_source: None,
            tags: BTreeSet::new(),
            platforms: BTreeMap::new(),
            total_reach: 99,
            platform_count: 99,
            source_streamer_ids: BTreeSet::new(),
            last_verified_at: Utc::now(),
        };

        identity.recompute_totals();

        assert_eq!(identity.total_reach, 0);
        assert_eq!(identity.platform_count, 0);
    }
}
