//! Profile aggregation: build the unified identity shape from a resolved
//! cluster.

use std::collections::BTreeMap;

use chrono::Utc;
use creatordb_core::{PlatformSnapshot, SourceProfile, UnifiedIdentity};

use crate::resolver::ResolvedAttributes;
use crate::types::Cluster;
use crate::UnifyError;

/// Build a [`UnifiedIdentity`] from a cluster and its resolved attributes.
///
/// Allocates at most one platform slot per platform type. A cluster that
/// erroneously contains two records of the same platform keeps the first
/// encountered and drops the second — a fixed keep-first policy, applied
/// silently (the dropped record's id is also excluded from
/// `source_streamer_ids`). `total_reach` and `platform_count` are computed
/// from the filled slots, never carried over.
///
/// # Errors
///
/// Returns [`UnifyError::EmptyCluster`] if the cluster has no records.
pub fn aggregate_cluster(
    cluster: &Cluster,
    resolved: &ResolvedAttributes,
) -> Result<UnifiedIdentity, UnifyError> {
    if cluster.records.is_empty() {
        return Err(UnifyError::EmptyCluster);
    }

    let seed = cluster.seed();
    let display_name = if seed.display_name.trim().is_empty() {
        seed.username.clone()
    } else {
        seed.display_name.clone()
    };

    let mut platforms = BTreeMap::new();
    let mut source_streamer_ids = std::collections::BTreeSet::new();
    for record in &cluster.records {
        if platforms.contains_key(&record.platform) {
            tracing::debug!(
                platform = %record.platform,
                dropped_profile_id = record.id,
                "duplicate platform in cluster; keeping first record"
            );
            continue;
        }
        platforms.insert(record.platform, snapshot_of(record));
        source_streamer_ids.insert(record.id);
    }

    let mut identity = UnifiedIdentity {
        display_name,
        country: resolved.country.as_ref().map(|(v, _)| v.clone()),
        country_source: resolved.country.as_ref().map(|(_, p)| *p),
        primary_category: resolved.category.as_ref().map(|(v, _)| v.clone()),
        category_source: resolved.category.as_ref().map(|(_, p)| *p),
        tags: resolved.tags.clone(),
        platforms,
        total_reach: 0,
        platform_count: 0,
        source_streamer_ids,
        last_verified_at: Utc::now(),
    };
    identity.recompute_totals();

    Ok(identity)
}

fn snapshot_of(record: &SourceProfile) -> PlatformSnapshot {
    PlatformSnapshot {
        source_profile_id: record.id,
        username: record.username.clone(),
        display_name: record.display_name.clone(),
        followers: record.followers,
        avatar_url: record.avatar_url.clone(),
        profile_url: record.profile_url.clone(),
        // Verification status is not carried on source records today; slots
        // default to unverified until the ingestion side supplies it.
        verified: false,
    }
}
