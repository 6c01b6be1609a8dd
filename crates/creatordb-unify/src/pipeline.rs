//! Unification pass orchestration: load, match, resolve, aggregate, write,
//! backfill — with run tracking and best-effort per-cluster error handling.
//!
//! The pass builds everything in memory, then writes. Per-cluster failures
//! are logged and counted without aborting the batch; only losing the backing
//! store entirely is fatal to the run.

use creatordb_core::{AppConfig, Platform, SourceProfile, UnifiedIdentity, ALL_PLATFORMS};
use creatordb_db::DbError;
use sqlx::PgPool;

use crate::aggregator::aggregate_cluster;
use crate::backfill::plan_backfill;
use crate::matcher::Matcher;
use crate::merge::merge_identity;
use crate::resolver::{resolve_attributes, ResolvedAttributes};
use crate::types::Cluster;
use crate::UnifyError;

/// Counts reported at the end of a unification pass.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnificationReport {
    pub clusters: usize,
    pub created: usize,
    pub updated: usize,
    pub unchanged: usize,
    /// Individual backfill field writes issued against source profiles.
    pub backfilled_fields: usize,
    pub errors: usize,
}

/// Run one full unification pass.
///
/// With `dry_run` the pass stops after clustering and aggregation: it reports
/// what would be written without creating a run row or touching the store.
///
/// # Errors
///
/// Returns [`UnifyError::Db`] if the source profiles cannot be loaded, the
/// run row cannot be created or transitioned, or the store becomes
/// unreachable mid-pass. Per-cluster failures are counted in the report
/// instead of propagated.
pub async fn run_unification(
    pool: &PgPool,
    config: &AppConfig,
    trigger_source: &str,
    dry_run: bool,
) -> Result<UnificationReport, UnifyError> {
    let (anchors, satellites) = load_profiles(pool).await?;
    tracing::info!(
        anchors = anchors.len(),
        satellites = satellites.len(),
        "loaded source profiles"
    );

    let clusters = Matcher::new(satellites).cluster(anchors);
    let mut report = UnificationReport {
        clusters: clusters.len(),
        ..UnificationReport::default()
    };

    // Resolve and aggregate every cluster up front; a bad cluster is skipped,
    // not fatal.
    let mut computed: Vec<(Cluster, ResolvedAttributes, UnifiedIdentity)> = Vec::new();
    for cluster in clusters {
        let resolved = resolve_attributes(&cluster);
        match aggregate_cluster(&cluster, &resolved) {
            Ok(identity) => computed.push((cluster, resolved, identity)),
            Err(e) => {
                let seed_id = cluster.records.first().map_or(0, |r| r.id);
                tracing::error!(seed_id, error = %e, "cluster aggregation failed");
                report.errors += 1;
            }
        }
    }

    if dry_run {
        tracing::info!(
            clusters = report.clusters,
            identities = computed.len(),
            "dry-run: skipping writes"
        );
        return Ok(report);
    }

    let run = creatordb_db::create_unification_run(pool, trigger_source).await?;
    if let Err(e) = creatordb_db::start_unification_run(pool, run.id).await {
        fail_run_best_effort(pool, run.id, &format!("{e}")).await;
        return Err(e.into());
    }

    let fresh = creatordb_db::count_unified_identities(pool).await? == 0;
    tracing::info!(run_id = run.id, fresh, "unification write phase starting");

    let write_result = if fresh {
        write_fresh(pool, config, &computed, &mut report).await
    } else {
        write_incremental(pool, config, &computed, &mut report).await
    };
    if let Err(e) = write_result {
        fail_run_best_effort(pool, run.id, &format!("{e}")).await;
        return Err(e);
    }

    if let Err(e) = apply_backfill(pool, &computed, &mut report).await {
        fail_run_best_effort(pool, run.id, &format!("{e}")).await;
        return Err(e);
    }

    let processed = i32::try_from(report.clusters).unwrap_or(i32::MAX);
    if let Err(e) = creatordb_db::complete_unification_run(pool, run.id, processed).await {
        fail_run_best_effort(pool, run.id, &format!("{e}")).await;
        return Err(e.into());
    }

    tracing::info!(
        run_id = run.id,
        created = report.created,
        updated = report.updated,
        unchanged = report.unchanged,
        backfilled_fields = report.backfilled_fields,
        errors = report.errors,
        "unification pass complete"
    );
    Ok(report)
}

async fn load_profiles(
    pool: &PgPool,
) -> Result<(Vec<SourceProfile>, Vec<SourceProfile>), UnifyError> {
    let anchor_platforms: Vec<Platform> = ALL_PLATFORMS
        .iter()
        .copied()
        .filter(|p| p.is_anchor())
        .collect();
    let satellite_platforms: Vec<Platform> = ALL_PLATFORMS
        .iter()
        .copied()
        .filter(|p| !p.is_anchor())
        .collect();

    let anchors = convert_rows(
        creatordb_db::list_profiles_for_platforms(pool, &anchor_platforms).await?,
    );
    let satellites = convert_rows(
        creatordb_db::list_profiles_for_platforms(pool, &satellite_platforms).await?,
    );
    Ok((anchors, satellites))
}

/// Convert rows to domain profiles, dropping (and logging) unparseable rows.
fn convert_rows(rows: Vec<creatordb_db::SourceProfileRow>) -> Vec<SourceProfile> {
    rows.into_iter()
        .filter_map(|row| {
            let id = row.id;
            match row.into_profile() {
                Ok(profile) => Some(profile),
                Err(e) => {
                    tracing::warn!(profile_id = id, error = %e, "skipping unparseable source profile");
                    None
                }
            }
        })
        .collect()
}

async fn write_fresh(
    pool: &PgPool,
    config: &AppConfig,
    computed: &[(Cluster, ResolvedAttributes, UnifiedIdentity)],
    report: &mut UnificationReport,
) -> Result<(), UnifyError> {
    let identities: Vec<UnifiedIdentity> =
        computed.iter().map(|(_, _, i)| i.clone()).collect();
    let inserted =
        creatordb_db::insert_identities_batch(pool, &identities, config.unify_insert_chunk_size)
            .await?;
    report.created += inserted;
    Ok(())
}

async fn write_incremental(
    pool: &PgPool,
    config: &AppConfig,
    computed: &[(Cluster, ResolvedAttributes, UnifiedIdentity)],
    report: &mut UnificationReport,
) -> Result<(), UnifyError> {
    let total = computed.len();
    for (i, (_, _, identity)) in computed.iter().enumerate() {
        if let Err(e) = merge_one(pool, identity, report).await {
            if is_connection_failure(&e) {
                return Err(e.into());
            }
            tracing::error!(display_name = %identity.display_name, error = %e, "identity merge failed");
            report.errors += 1;
        }
        if (i + 1) % config.unify_progress_interval.max(1) == 0 {
            tracing::info!(processed = i + 1, total, "unification progress");
        }
    }
    Ok(())
}

async fn merge_one(
    pool: &PgPool,
    identity: &UnifiedIdentity,
    report: &mut UnificationReport,
) -> Result<(), DbError> {
    let pairs: Vec<(Platform, i64)> = identity
        .platforms
        .iter()
        .map(|(p, s)| (*p, s.source_profile_id))
        .collect();

    match creatordb_db::find_identity_by_platform_ids(pool, &pairs).await? {
        Some(stored) => {
            let outcome = merge_identity(&stored.identity, identity);
            if outcome.changed {
                creatordb_db::update_merged_identity(pool, stored.id, &outcome.identity).await?;
                report.updated += 1;
            } else {
                report.unchanged += 1;
            }
        }
        None => {
            creatordb_db::insert_identity(pool, identity).await?;
            report.created += 1;
        }
    }
    Ok(())
}

async fn apply_backfill(
    pool: &PgPool,
    computed: &[(Cluster, ResolvedAttributes, UnifiedIdentity)],
    report: &mut UnificationReport,
) -> Result<(), UnifyError> {
    for (cluster, resolved, _) in computed {
        for entry in plan_backfill(cluster, resolved) {
            if let Err(e) = apply_backfill_entry(pool, &entry).await {
                if is_connection_failure(&e) {
                    return Err(e.into());
                }
                tracing::error!(profile_id = entry.profile_id, error = %e, "backfill write failed");
                report.errors += 1;
                continue;
            }
            report.backfilled_fields += entry.write_count();
        }
    }
    Ok(())
}

async fn apply_backfill_entry(
    pool: &PgPool,
    entry: &crate::backfill::ProfileBackfill,
) -> Result<(), DbError> {
    if let Some((country, source)) = &entry.country {
        creatordb_db::update_inferred_country(pool, entry.profile_id, country, *source).await?;
    }
    if let Some((category, source)) = &entry.category {
        creatordb_db::update_inferred_category(pool, entry.profile_id, category, *source).await?;
    }
    if !entry.add_tags.is_empty() {
        creatordb_db::append_profile_tags(pool, entry.profile_id, &entry.add_tags).await?;
    }
    Ok(())
}

/// Whether a database error means the store itself is unreachable, which is
/// fatal to the whole pass (re-run later) rather than a per-record failure.
fn is_connection_failure(error: &DbError) -> bool {
    matches!(
        error,
        DbError::Sqlx(
            sqlx::Error::Io(_)
                | sqlx::Error::PoolTimedOut
                | sqlx::Error::PoolClosed
                | sqlx::Error::Tls(_)
        )
    )
}

async fn fail_run_best_effort(pool: &PgPool, run_id: i64, message: &str) {
    if let Err(e) = creatordb_db::fail_unification_run(pool, run_id, message).await {
        tracing::error!(run_id, error = %e, "failed to mark unification run as failed");
    }
}
