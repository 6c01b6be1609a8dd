//! Batch scoring with bounded concurrency.
//!
//! Signal generation is the potentially slow step (it may call out to an
//! external generator), so the batch runs it through a bounded concurrent
//! stream while the scoring itself stays synchronous and pure. Per-record
//! generation failures are counted and logged, never fatal to the batch.

use std::future::Future;

use creatordb_core::SourceProfile;
use futures::{stream, StreamExt};

use crate::engine::{score, ScoreResult};
use crate::signals::{CampaignSignals, CampaignType};
use crate::ScoringError;

/// One scored source record.
#[derive(Debug, Clone)]
pub struct ScoredProfile {
    pub profile_id: i64,
    pub display_name: String,
    pub result: ScoreResult,
}

/// The outcome of a batch pass: scored records ranked best-first, plus the
/// count of records whose signal generation failed.
#[derive(Debug, Clone, Default)]
pub struct BatchOutcome {
    pub scored: Vec<ScoredProfile>,
    pub errors: usize,
}

/// Score a batch of source records for one campaign type.
///
/// `generate` produces the signal profile for each record; at most
/// `max_concurrent` generations run at once (a value of 0 is treated as 1).
/// Results are sorted by score descending, ties broken by profile id, so the
/// ranking is deterministic regardless of completion order.
pub async fn score_batch<'a, F, Fut>(
    profiles: &'a [SourceProfile],
    campaign: CampaignType,
    max_concurrent: usize,
    generate: F,
) -> BatchOutcome
where
    F: Fn(&'a SourceProfile) -> Fut,
    Fut: Future<Output = Result<CampaignSignals, ScoringError>> + 'a,
{
    let generated: Vec<(&SourceProfile, Result<CampaignSignals, ScoringError>)> =
        stream::iter(profiles)
            .map(|profile| {
                let fut = generate(profile);
                async move { (profile, fut.await) }
            })
            .buffer_unordered(max_concurrent.max(1))
            .collect()
            .await;

    let mut outcome = BatchOutcome::default();
    for (profile, result) in generated {
        match result {
            Ok(signals) => {
                if signals.campaign_type() != campaign {
                    tracing::warn!(
                        profile_id = profile.id,
                        expected = %campaign,
                        got = %signals.campaign_type(),
                        "signal generator returned signals for the wrong campaign"
                    );
                    outcome.errors += 1;
                    continue;
                }
                outcome.scored.push(ScoredProfile {
                    profile_id: profile.id,
                    display_name: profile.display_name.clone(),
                    result: score(&signals),
                });
            }
            Err(e) => {
                tracing::warn!(profile_id = profile.id, error = %e, "signal generation failed");
                outcome.errors += 1;
            }
        }
    }

    outcome.scored.sort_by(|a, b| {
        b.result
            .score
            .total_cmp(&a.result.score)
            .then(a.profile_id.cmp(&b.profile_id))
    });
    outcome
}

#[cfg(test)]
mod tests {
    use creatordb_core::Platform;

    use super::*;
    use crate::heuristic::HeuristicAnalyzer;

    fn profile(id: i64, followers: i64, tags: &[&str]) -> SourceProfile {
        SourceProfile {
            id,
            platform: Platform::Twitch,
            username: format!("creator{id}"),
            display_name: format!("Creator {id}"),
            followers,
            avatar_url: None,
            profile_url: None,
            language: None,
            region: None,
            tags: tags.iter().map(|s| (*s).to_string()).collect(),
            social_links: Vec::new(),
            inferred_country: None,
            inferred_country_source: None,
            inferred_category: None,
            inferred_category_source: None,
            primary_category: None,
            current_game: None,
        }
    }

    #[tokio::test]
    async fn batch_ranks_by_score_descending() {
        let analyzer = HeuristicAnalyzer::new();
        let profiles = vec![
            profile(1, 5_000, &[]),
            profile(2, 500_000, &["GAMING", "ESPORTS"]),
            profile(3, 150_000, &["GAMING"]),
        ];

        let outcome = score_batch(&profiles, CampaignType::Gaming, 2, |p| {
            let signals = analyzer.analyze(p, CampaignType::Gaming);
            async move { Ok(signals) }
        })
        .await;

        assert_eq!(outcome.errors, 0);
        assert_eq!(outcome.scored.len(), 3);
        assert_eq!(outcome.scored[0].profile_id, 2);
        let scores: Vec<f64> = outcome.scored.iter().map(|s| s.result.score).collect();
        assert!(
            scores.windows(2).all(|w| w[0] >= w[1]),
            "not descending: {scores:?}"
        );
    }

    #[tokio::test]
    async fn generation_failures_are_counted_not_fatal() {
        let analyzer = HeuristicAnalyzer::new();
        let profiles = vec![profile(1, 5_000, &[]), profile(2, 5_000, &[])];

        let outcome = score_batch(&profiles, CampaignType::Betting, 4, |p| {
            let result = if p.id == 1 {
                Err(ScoringError::SignalGeneration("generator offline".into()))
            } else {
                Ok(analyzer.analyze(p, CampaignType::Betting))
            };
            async move { result }
        })
        .await;

        assert_eq!(outcome.errors, 1);
        assert_eq!(outcome.scored.len(), 1);
        assert_eq!(outcome.scored[0].profile_id, 2);
    }

    #[tokio::test]
    async fn wrong_campaign_signals_are_rejected() {
        let analyzer = HeuristicAnalyzer::new();
        let profiles = vec![profile(1, 5_000, &[])];

        let outcome = score_batch(&profiles, CampaignType::Esports, 1, |p| {
            let signals = analyzer.analyze(p, CampaignType::Gaming);
            async move { Ok(signals) }
        })
        .await;

        assert_eq!(outcome.errors, 1);
        assert!(outcome.scored.is_empty());
    }

    #[tokio::test]
    async fn ties_break_on_profile_id() {
        let analyzer = HeuristicAnalyzer::new();
        let profiles = vec![profile(7, 5_000, &[]), profile(3, 5_000, &[])];

        let outcome = score_batch(&profiles, CampaignType::Gaming, 2, |p| {
            let signals = analyzer.analyze(p, CampaignType::Gaming);
            async move { Ok(signals) }
        })
        .await;

        assert_eq!(outcome.scored[0].profile_id, 3);
        assert_eq!(outcome.scored[1].profile_id, 7);
    }
}
