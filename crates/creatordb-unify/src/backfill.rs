//! Backfill planning: propagate a cluster's resolved attributes back onto its
//! source records.
//!
//! The plan is pure; the pipeline applies it with targeted updates. The same
//! strict-priority rule as resolution applies, so re-running backfill on
//! unchanged data produces an empty plan.

use creatordb_core::{outranks, Platform, CATEGORY_PRIORITY, COUNTRY_PRIORITY};

use crate::resolver::ResolvedAttributes;
use crate::types::Cluster;

/// Pending writes for one source profile. Fields left `None` (or empty tags)
/// are not touched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileBackfill {
    pub profile_id: i64,
    pub country: Option<(String, Platform)>,
    pub category: Option<(String, Platform)>,
    pub add_tags: Vec<String>,
}

impl ProfileBackfill {
    /// Number of individual field writes this entry will issue.
    #[must_use]
    pub fn write_count(&self) -> usize {
        usize::from(self.country.is_some())
            + usize::from(self.category.is_some())
            + usize::from(!self.add_tags.is_empty())
    }
}

/// Compute the backfill writes for every record in a resolved cluster.
///
/// A record's existing inferred value is overwritten only when the resolved
/// source's priority strictly exceeds the priority of whatever produced the
/// existing value; records with no inferred value accept any ranked source.
/// This lets a low-signal satellite inherit a high-confidence attribute from
/// a high-signal anchor sibling. Tags are a set difference against the
/// record's current tags. Records with nothing to change produce no entry.
#[must_use]
pub fn plan_backfill(cluster: &Cluster, resolved: &ResolvedAttributes) -> Vec<ProfileBackfill> {
    let mut plan = Vec::new();

    for record in &cluster.records {
        // The incumbent rank comes from whatever produced the record's
        // existing inferred value; a value with no recorded source (or no
        // value at all) accepts any ranked resolved source.
        let country = resolved.country.as_ref().and_then(|(value, source)| {
            let incumbent = record
                .inferred_country
                .as_ref()
                .and_then(|_| record.inferred_country_source);
            needs_write(COUNTRY_PRIORITY, value, *source, incumbent)
        });

        let category = resolved.category.as_ref().and_then(|(value, source)| {
            let incumbent = record
                .inferred_category
                .as_ref()
                .and_then(|_| record.inferred_category_source);
            needs_write(CATEGORY_PRIORITY, value, *source, incumbent)
        });

        let add_tags: Vec<String> = resolved
            .tags
            .iter()
            .filter(|tag| !record.tags.contains(*tag))
            .cloned()
            .collect();

        let entry = ProfileBackfill {
            profile_id: record.id,
            country,
            category,
            add_tags,
        };
        if entry.write_count() > 0 {
            plan.push(entry);
        }
    }

    plan
}

// A strict source upgrade writes even when the value text happens to match,
// to update provenance; an identical (value, source) pair never writes
// because equal ranks do not outrank.
fn needs_write(
    table: &[Platform],
    value: &str,
    source: Platform,
    incumbent: Option<Platform>,
) -> Option<(String, Platform)> {
    if outranks(table, source, incumbent) {
        Some((value.to_string(), source))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use creatordb_core::SourceProfile;

    use super::*;

    fn profile(id: i64, platform: Platform) -> SourceProfile {
        SourceProfile {
            id,
            platform,
            username: format!("user{id}"),
            display_name: format!("User {id}"),
            followers: 0,
            avatar_url: None,
            profile_url: None,
            language: None,
            region: None,
            tags: BTreeSet::new(),
            social_links: vec![],
            inferred_country: None,
            inferred_country_source: None,
            inferred_category: None,
            inferred_category_source: None,
            primary_category: None,
            current_game: None,
        }
    }

    fn resolved_country(value: &str, source: Platform) -> ResolvedAttributes {
        ResolvedAttributes {
            country: Some((value.to_string(), source)),
            category: None,
            tags: BTreeSet::new(),
        }
    }

    /// Apply a plan to in-memory records the way the store would.
    fn apply(records: &mut [SourceProfile], plan: &[ProfileBackfill]) {
        for entry in plan {
            let record = records
                .iter_mut()
                .find(|r| r.id == entry.profile_id)
                .expect("plan references a cluster record");
            if let Some((value, source)) = &entry.country {
                record.inferred_country = Some(value.clone());
                record.inferred_country_source = Some(*source);
            }
            if let Some((value, source)) = &entry.category {
                record.inferred_category = Some(value.clone());
                record.inferred_category_source = Some(*source);
            }
            record.add_tags_from(&entry.add_tags);
        }
    }

    trait AddTags {
        fn add_tags_from(&mut self, tags: &[String]);
    }

    impl AddTags for SourceProfile {
        fn add_tags_from(&mut self, tags: &[String]) {
            for tag in tags {
                self.tags.insert(tag.clone());
            }
        }
    }

    #[test]
    fn satellite_inherits_anchor_attribute() {
        let cluster = Cluster {
            records: vec![profile(1, Platform::Twitch), profile(2, Platform::TikTok)],
        };
        let resolved = resolved_country("DE", Platform::LinkedIn);

        let plan = plan_backfill(&cluster, &resolved);

        assert_eq!(plan.len(), 2, "both records accept the resolved country");
        assert!(plan
            .iter()
            .all(|e| e.country == Some(("DE".to_string(), Platform::LinkedIn))));
    }

    #[test]
    fn lower_priority_source_does_not_overwrite() {
        let mut record = profile(1, Platform::TikTok);
        record.inferred_country = Some("DE".to_string());
        record.inferred_country_source = Some(Platform::LinkedIn);
        let cluster = Cluster {
            records: vec![record],
        };
        let resolved = resolved_country("US", Platform::Twitch);

        let plan = plan_backfill(&cluster, &resolved);

        assert!(plan.is_empty(), "got {plan:?}");
    }

    #[test]
    fn equal_priority_source_does_not_overwrite() {
        let mut record = profile(1, Platform::Twitter);
        record.inferred_country = Some("US".to_string());
        record.inferred_country_source = Some(Platform::Twitch);
        let cluster = Cluster {
            records: vec![record],
        };
        let resolved = resolved_country("CA", Platform::Twitch);

        let plan = plan_backfill(&cluster, &resolved);

        assert!(plan.is_empty(), "equal rank must not rewrite, got {plan:?}");
    }

    #[test]
    fn tags_are_set_difference() {
        let mut record = profile(1, Platform::Twitch);
        record.tags = BTreeSet::from(["GAMING".to_string()]);
        let cluster = Cluster {
            records: vec![record],
        };
        let resolved = ResolvedAttributes {
            country: None,
            category: None,
            tags: BTreeSet::from(["GAMING".to_string(), "ESPORTS".to_string()]),
        };

        let plan = plan_backfill(&cluster, &resolved);

        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].add_tags, vec!["ESPORTS".to_string()]);
    }

    #[test]
    fn second_run_on_unchanged_data_is_empty() {
        let mut records = vec![profile(1, Platform::Twitch), profile(2, Platform::TikTok)];
        records[0].region = Some("US".to_string());
        records[0].tags = BTreeSet::from(["GAMING".to_string()]);

        let cluster = Cluster {
            records: records.clone(),
        };
        let resolved = crate::resolver::resolve_attributes(&cluster);

        let first = plan_backfill(&cluster, &resolved);
        assert!(!first.is_empty(), "first run should write something");
        apply(&mut records, &first);

        let cluster = Cluster { records };
        let resolved = crate::resolver::resolve_attributes(&cluster);
        let second = plan_backfill(&cluster, &resolved);
        assert!(
            second.is_empty(),
            "second run must produce zero writes, got {second:?}"
        );
    }
}
