//! The unification pass: clustering source profiles into identities,
//! resolving conflicting attributes, merging into the durable store, and
//! backfilling resolved attributes onto the source records.
//!
//! The pass is batch-oriented and single-writer: everything is computed in
//! memory, then written. Re-running it on unchanged data is a no-op because
//! merge and backfill are both monotonic.

use thiserror::Error;

pub mod aggregator;
pub mod backfill;
pub mod links;
pub mod matcher;
pub mod merge;
pub mod pipeline;
pub mod resolver;
pub mod types;

pub use aggregator::aggregate_cluster;
pub use backfill::{plan_backfill, ProfileBackfill};
pub use links::parse_social_link;
pub use matcher::Matcher;
pub use merge::{merge_identity, MergeOutcome};
pub use pipeline::{run_unification, UnificationReport};
pub use resolver::{resolve_attributes, ResolvedAttributes};
pub use types::Cluster;

#[derive(Debug, Error)]
pub enum UnifyError {
    #[error("cluster is empty")]
    EmptyCluster,
    #[error(transparent)]
    Db(#[from] creatordb_db::DbError),
}
