//! Pure merge of a freshly computed identity into a stored one.
//!
//! Lifting the merge decision out of the database layer keeps it testable;
//! the store applies the result only when something actually changed.

use creatordb_core::{outranks, UnifiedIdentity, CATEGORY_PRIORITY, COUNTRY_PRIORITY};

/// Result of merging `computed` into `existing`.
#[derive(Debug, Clone)]
pub struct MergeOutcome {
    pub identity: UnifiedIdentity,
    /// False when the merge was a no-op; no write should be issued.
    pub changed: bool,
}

/// Merge a computed identity into a stored one.
///
/// Rules:
/// - only platform slots currently empty on the stored identity are filled;
///   an already-linked slot is never overwritten;
/// - country/category move only when the computed source strictly outranks
///   the stored source (same priority tables as the resolver);
/// - tags and `source_streamer_ids` are unioned;
/// - `total_reach` and `platform_count` are recomputed from the merged slots.
///
/// Running the same merge twice yields `changed == false` the second time,
/// which is what makes an interrupted pass safe to simply re-run.
#[must_use]
pub fn merge_identity(existing: &UnifiedIdentity, computed: &UnifiedIdentity) -> MergeOutcome {
    let mut merged = existing.clone();
    let mut changed = false;

    for (platform, snapshot) in &computed.platforms {
        if !merged.platforms.contains_key(platform) {
            merged.platforms.insert(*platform, snapshot.clone());
            changed = true;
        }
    }

    if let (Some(country), Some(source)) = (&computed.country, computed.country_source) {
        if outranks(COUNTRY_PRIORITY, source, merged.country_source) {
            merged.country = Some(country.clone());
            merged.country_source = Some(source);
            changed = true;
        }
    }

    if let (Some(category), Some(source)) = (&computed.primary_category, computed.category_source)
    {
        if outranks(CATEGORY_PRIORITY, source, merged.category_source) {
            merged.primary_category = Some(category.clone());
            merged.category_source = Some(source);
            changed = true;
        }
    }

    for tag in &computed.tags {
        if merged.tags.insert(tag.clone()) {
            changed = true;
        }
    }

    for id in &computed.source_streamer_ids {
        if merged.source_streamer_ids.insert(*id) {
            changed = true;
        }
    }

    merged.recompute_totals();
    if changed {
        merged.last_verified_at = computed.last_verified_at;
    }

    MergeOutcome {
        identity: merged,
        changed,
    }
}
