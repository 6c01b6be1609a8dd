//! The `unify` command handler.

use creatordb_core::AppConfig;
use sqlx::PgPool;

/// Run one unification pass and print the report.
///
/// # Errors
///
/// Returns an error if the pass fails at a fatal point (profiles cannot be
/// loaded, the run row cannot be managed, or the store becomes unreachable).
/// Per-cluster failures show up in the printed error count instead.
pub(crate) async fn run_unify(
    pool: &PgPool,
    config: &AppConfig,
    dry_run: bool,
) -> anyhow::Result<()> {
    let report = creatordb_unify::run_unification(pool, config, "cli", dry_run).await?;

    if dry_run {
        println!(
            "dry-run: {} clusters would produce {} identities ({} cluster errors)",
            report.clusters,
            report.clusters - report.errors,
            report.errors
        );
        return Ok(());
    }

    println!(
        "unified {} clusters: {} created, {} updated, {} unchanged, {} fields backfilled, {} errors",
        report.clusters,
        report.created,
        report.updated,
        report.unchanged,
        report.backfilled_fields,
        report.errors
    );

    Ok(())
}
