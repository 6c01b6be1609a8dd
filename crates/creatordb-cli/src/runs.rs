//! The `runs` command handler.

use sqlx::PgPool;

/// Print the most recent unification runs, newest first.
pub(crate) async fn run_list_runs(pool: &PgPool, limit: i64) -> anyhow::Result<()> {
    let runs = creatordb_db::list_unification_runs(pool, limit).await?;

    if runs.is_empty() {
        println!("no unification runs recorded");
        return Ok(());
    }

    println!(
        "{:<6} {:<10} {:<8} {:<10} {:<22} {}",
        "id", "status", "trigger", "records", "created", "error"
    );
    for run in runs {
        println!(
            "{:<6} {:<10} {:<8} {:<10} {:<22} {}",
            run.id,
            run.status,
            run.trigger_source,
            run.records_processed,
            run.created_at.format("%Y-%m-%d %H:%M:%S"),
            run.error_message.as_deref().unwrap_or("-")
        );
    }

    Ok(())
}
