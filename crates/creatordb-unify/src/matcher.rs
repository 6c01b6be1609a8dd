//! Identity matching: cluster anchor records with satellite records.
//!
//! Anchors are processed in descending follower order and claim satellites
//! greedily; a satellite claimed by an earlier (higher-reach) anchor is
//! unavailable to later anchors. First-claim-wins is a deliberate tie-break
//! policy, not an accident. No fuzzy matching is performed: missed links are
//! an accepted false-negative cost.

use std::collections::HashMap;

use creatordb_core::{Platform, SourceProfile, ALL_PLATFORMS};

use crate::links::parse_social_link;
use crate::types::Cluster;

/// Per-pass matching state: the satellite pool, its lookup index, and the
/// claimed set. Built fresh for each unification pass so passes never share
/// state.
pub struct Matcher {
    satellites: Vec<SourceProfile>,
    /// (platform, lowercase username) -> index into `satellites`.
    index: HashMap<(Platform, String), usize>,
    claimed: Vec<bool>,
}

impl Matcher {
    #[must_use]
    pub fn new(satellites: Vec<SourceProfile>) -> Self {
        let mut index = HashMap::with_capacity(satellites.len());
        for (i, satellite) in satellites.iter().enumerate() {
            let key = (satellite.platform, satellite.username.to_lowercase());
            // Duplicate (platform, username) entries keep the first record.
            index.entry(key).or_insert(i);
        }
        let claimed = vec![false; satellites.len()];
        Self {
            satellites,
            index,
            claimed,
        }
    }

    /// Cluster anchors with satellites, consuming the matcher.
    ///
    /// Returns anchor-led clusters in descending anchor follower order,
    /// followed by singleton clusters for every unclaimed satellite.
    #[must_use]
    pub fn cluster(mut self, mut anchors: Vec<SourceProfile>) -> Vec<Cluster> {
        anchors.sort_by(|a, b| b.followers.cmp(&a.followers).then(a.id.cmp(&b.id)));

        let mut clusters = Vec::with_capacity(anchors.len());
        for anchor in anchors {
            let mut cluster = Cluster::new(anchor);
            for platform in ALL_PLATFORMS {
                if platform.is_anchor() {
                    continue;
                }
                if let Some(i) = self.claim_for(cluster.seed(), platform) {
                    cluster.records.push(self.satellites[i].clone());
                }
            }
            clusters.push(cluster);
        }

        for (i, satellite) in self.satellites.into_iter().enumerate() {
            if !self.claimed[i] {
                clusters.push(Cluster::new(satellite));
            }
        }

        clusters
    }

    /// Try each match key in order for one (anchor, satellite-platform) pair
    /// and claim the first unclaimed hit.
    fn claim_for(&mut self, anchor: &SourceProfile, platform: Platform) -> Option<usize> {
        // Key 1: explicit platform-tagged URL in the anchor's social links.
        for link in &anchor.social_links {
            if let Some((link_platform, username)) = parse_social_link(link) {
                if link_platform == platform {
                    if let Some(i) = self.try_claim(platform, &username.to_lowercase()) {
                        return Some(i);
                    }
                }
            }
        }

        // Key 2: same username on the satellite platform.
        if let Some(i) = self.try_claim(platform, &anchor.username.to_lowercase()) {
            return Some(i);
        }

        // Key 3: anchor display name with whitespace removed.
        let squashed: String = anchor
            .display_name
            .split_whitespace()
            .collect::<String>()
            .to_lowercase();
        if !squashed.is_empty() {
            if let Some(i) = self.try_claim(platform, &squashed) {
                return Some(i);
            }
        }

        None
    }

    fn try_claim(&mut self, platform: Platform, username_lower: &str) -> Option<usize> {
        let i = *self
            .index
            .get(&(platform, username_lower.to_string()))?;
        if self.claimed[i] {
            return None;
        }
        self.claimed[i] = true;
        Some(i)
    }
}
