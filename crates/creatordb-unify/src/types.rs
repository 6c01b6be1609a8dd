//! Shared types for the unification pass.

use creatordb_core::SourceProfile;

/// One candidate identity group: a seed record plus any records linked to it.
///
/// For anchor-led clusters the seed is the anchor; unmatched satellites become
/// singleton clusters whose seed is the satellite itself.
#[derive(Debug, Clone)]
pub struct Cluster {
    pub records: Vec<SourceProfile>,
}

impl Cluster {
    #[must_use]
    pub fn new(seed: SourceProfile) -> Self {
        Self {
            records: vec![seed],
        }
    }

    /// The record that seeded this cluster.
    #[must_use]
    pub fn seed(&self) -> &SourceProfile {
        &self.records[0]
    }
}
