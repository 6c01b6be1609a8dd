//! Attribute resolution: pick one authoritative value per ambiguous attribute
//! per cluster using the shared source-priority tables.

use std::collections::BTreeSet;

use creatordb_core::{priority, Platform, CATEGORY_PRIORITY, COUNTRY_PRIORITY};

use crate::types::Cluster;

/// The resolved attributes for one cluster: each value carries the platform
/// whose signal supplied it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAttributes {
    pub country: Option<(String, Platform)>,
    pub category: Option<(String, Platform)>,
    pub tags: BTreeSet<String>,
}

/// Resolve country, category, and tags for a cluster.
///
/// For each attribute, every record contributes up to two candidates: its own
/// native signal (attributed to the record's platform) and any value inferred
/// on a prior pass (attributed to the platform recorded alongside it). The
/// candidate whose source ranks strictly highest wins; ties keep the first
/// candidate found, which makes resolution monotonic across passes. Tags are
/// a plain set union with no priority.
#[must_use]
pub fn resolve_attributes(cluster: &Cluster) -> ResolvedAttributes {
    let mut country: Option<(String, Platform)> = None;
    let mut category: Option<(String, Platform)> = None;
    let mut tags = BTreeSet::new();

    for record in &cluster.records {
        consider(
            &mut country,
            COUNTRY_PRIORITY,
            record.region.as_deref(),
            record.platform,
        );
        // An inferred value keeps the priority of the platform that
        // originally supplied it, not of the record carrying it. A value
        // with no recorded source cannot be ranked and is ignored.
        if let Some(source) = record.inferred_country_source {
            consider(
                &mut country,
                COUNTRY_PRIORITY,
                record.inferred_country.as_deref(),
                source,
            );
        }
        consider(
            &mut category,
            CATEGORY_PRIORITY,
            record.primary_category.as_deref(),
            record.platform,
        );
        if let Some(source) = record.inferred_category_source {
            consider(
                &mut category,
                CATEGORY_PRIORITY,
                record.inferred_category.as_deref(),
                source,
            );
        }
        tags.extend(record.tags.iter().cloned());
    }

    ResolvedAttributes {
        country,
        category,
        tags,
    }
}

/// Keep `candidate` only if its source ranks strictly higher than the current
/// holder's. Unranked sources never win; equal ranks keep the first found.
fn consider(
    slot: &mut Option<(String, Platform)>,
    table: &[Platform],
    candidate: Option<&str>,
    source: Platform,
) {
    let Some(value) = candidate else { return };
    if value.is_empty() {
        return;
    }
    let Some(candidate_rank) = priority(table, source) else {
        return;
    };
    let current_rank = slot.as_ref().and_then(|(_, p)| priority(table, *p));
    let wins = match current_rank {
        Some(rank) => candidate_rank < rank,
        None => true,
    };
    if wins {
        *slot = Some((value.to_string(), source));
    }
}
