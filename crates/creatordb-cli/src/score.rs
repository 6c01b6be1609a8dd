//! The `score` command handler.
//!
//! Loads source profiles (highest reach first), derives signals with the
//! heuristic analyzer, and prints a ranked table or JSON document.

use creatordb_core::{AppConfig, Platform, SourceProfile, ALL_PLATFORMS};
use creatordb_scoring::{score_batch, CampaignType, HeuristicAnalyzer};
use sqlx::PgPool;

/// Arguments for one `score` invocation.
pub(crate) struct ScoreArgs {
    pub campaign: CampaignType,
    pub platform: Option<Platform>,
    pub profile_id: Option<i64>,
    pub limit: usize,
    pub max_concurrent: Option<usize>,
    pub json: bool,
}

/// Score up to `limit` profiles for one campaign type.
///
/// # Errors
///
/// Returns an error if profiles cannot be loaded. Per-profile signal failures
/// are counted in the printed summary, not propagated.
pub(crate) async fn run_score(
    pool: &PgPool,
    config: &AppConfig,
    args: ScoreArgs,
) -> anyhow::Result<()> {
    let campaign = args.campaign;
    let profiles = match args.profile_id {
        Some(id) => {
            let row = creatordb_db::get_source_profile(pool, id)
                .await?
                .ok_or_else(|| anyhow::anyhow!("source profile {id} not found"))?;
            vec![row.into_profile()?]
        }
        None => load_ranked_profiles(pool, args.platform, args.limit).await?,
    };

    if profiles.is_empty() {
        println!("no source profiles to score");
        return Ok(());
    }

    let max_concurrent = args.max_concurrent.unwrap_or(config.scoring_max_concurrent);
    let analyzer = HeuristicAnalyzer::new();
    let outcome = score_batch(&profiles, campaign, max_concurrent, |p| {
        let signals = analyzer.analyze(p, campaign);
        async move { Ok(signals) }
    })
    .await;

    if args.json {
        let document: Vec<serde_json::Value> = outcome
            .scored
            .iter()
            .map(|s| {
                serde_json::json!({
                    "profile_id": s.profile_id,
                    "display_name": s.display_name,
                    "campaign": campaign,
                    "result": s.result,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&document)?);
        return Ok(());
    }

    println!(
        "{:<6} {:<5} {:>7} {:>6} {:<25} {}",
        "rank", "tier", "score", "conf", "name", "predicted ROI"
    );
    for (rank, scored) in outcome.scored.iter().enumerate() {
        println!(
            "{:<6} {:<5} {:>7.1} {:>6.0} {:<25} {:.2}x",
            rank + 1,
            scored.result.tier,
            scored.result.score,
            scored.result.confidence,
            truncate(&scored.display_name, 25),
            scored.result.predictions.roi_multiplier
        );
    }
    println!(
        "scored {} profiles for {campaign} ({} signal errors)",
        outcome.scored.len(),
        outcome.errors
    );

    Ok(())
}

async fn load_ranked_profiles(
    pool: &PgPool,
    platform: Option<Platform>,
    limit: usize,
) -> anyhow::Result<Vec<SourceProfile>> {
    let platforms: Vec<Platform> = match platform {
        Some(p) => vec![p],
        None => ALL_PLATFORMS.to_vec(),
    };

    let rows = creatordb_db::list_profiles_for_platforms(pool, &platforms).await?;
    let mut profiles: Vec<SourceProfile> = Vec::with_capacity(rows.len().min(limit));
    for row in rows {
        if profiles.len() == limit {
            break;
        }
        let id = row.id;
        match row.into_profile() {
            Ok(profile) => profiles.push(profile),
            Err(e) => {
                tracing::warn!(profile_id = id, error = %e, "skipping unparseable source profile");
            }
        }
    }
    Ok(profiles)
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{cut}…")
    }
}
