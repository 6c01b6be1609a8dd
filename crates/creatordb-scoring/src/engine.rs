//! The campaign scoring engine: weighted sub-scores, confidence, tiering,
//! and deterministic campaign predictions.

use creatordb_core::Platform;
use serde::Serialize;

use crate::signals::{
    BettingSignals, CampaignPredictions, CampaignSignals, CampaignType, EsportsSignals,
    GamingSignals, Level, RiskLevel,
};

// ---------------------------------------------------------------------------
// Weights and point values
// ---------------------------------------------------------------------------

/// Betting: audience-psychology weight. The raw sub-score can reach 120
/// (40 + 30 + 50), so the weighted total plus the flat bonus can exceed 100
/// before clamping — the clamp is load-bearing, not decorative.
pub const BETTING_W_AUDIENCE: f64 = 0.35;
pub const BETTING_W_CONVERSION: f64 = 0.25;
pub const BETTING_W_SAFETY: f64 = 0.20;
/// Flat platform bonus, added after weighting (not weight-normalized).
pub const BETTING_PLATFORM_BONUS: f64 = 10.0;
/// Flat bonus for regions with established betting markets.
pub const BETTING_REGION_BONUS: f64 = 5.0;
/// Fraction of the gambling-propensity percentage feeding audience psychology.
pub const BETTING_GAMBLING_FRACTION: f64 = 0.5;

pub const GAMING_W_SIGNAL: f64 = 0.60;
pub const GAMING_W_AUDIENCE_QUALITY: f64 = 0.40;
pub const GAMING_TAG_GAMING_PTS: f64 = 40.0;
pub const GAMING_TAG_ESPORTS_PTS: f64 = 30.0;

pub const ESPORTS_W_COMPETITIVE: f64 = 0.70;
pub const ESPORTS_W_ENGAGEMENT: f64 = 0.30;
pub const ESPORTS_TAG_ESPORTS_PTS: f64 = 40.0;
pub const ESPORTS_TAG_COMPETITIVE_PTS: f64 = 30.0;
pub const ESPORTS_GAME_PTS: f64 = 30.0;

/// Titles whose current-game signal counts as competitive content.
pub const ESPORTS_TITLES: &[&str] = &["counter-strike 2", "valorant", "league of legends", "dota 2"];

/// Regions granted the betting region bonus.
pub const BETTING_REGIONS: &[&str] = &["UK", "MT", "CW", "GI"];

const CONFIDENCE_BASE: f64 = 50.0;

// Maximum sub-score inputs must produce a pre-clamp total of exactly 100 for
// the campaigns whose weights sum to 1.0 and carry no flat bonus.
const _: () = assert!(GAMING_W_SIGNAL * 100.0 + GAMING_W_AUDIENCE_QUALITY * 100.0 == 100.0);
const _: () = assert!(ESPORTS_W_COMPETITIVE * 100.0 + ESPORTS_W_ENGAGEMENT * 100.0 == 100.0);

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// One named component of the weighted decomposition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubScore {
    pub name: &'static str,
    /// Unweighted sub-score. May exceed 100 for betting audience psychology.
    pub raw: f64,
    pub weight: f64,
    pub weighted: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub components: Vec<SubScore>,
    /// Flat bonus added on top of the weighted terms (betting only).
    pub flat_bonus: f64,
    /// Weighted total plus flat bonus, before clamping.
    pub raw_total: f64,
}

/// Suitability tier, fixed thresholds identical across campaign types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Tier {
    S,
    A,
    B,
    C,
}

impl Tier {
    #[must_use]
    pub fn from_score(score: f64) -> Self {
        if score >= 90.0 {
            Tier::S
        } else if score >= 75.0 {
            Tier::A
        } else if score >= 60.0 {
            Tier::B
        } else {
            Tier::C
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Tier::S => "S",
            Tier::A => "A",
            Tier::B => "B",
            Tier::C => "C",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreResult {
    pub campaign: CampaignType,
    /// Final score, clamped to [0, 100].
    pub score: f64,
    /// Confidence in the score, clamped to [0, 100].
    pub confidence: f64,
    pub tier: Tier,
    pub breakdown: ScoreBreakdown,
    pub predictions: CampaignPredictions,
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Score a derived signal profile for its campaign type.
///
/// Pure and deterministic: identical signals always produce identical
/// results. Missing signal fields contribute zero rather than failing.
#[must_use]
pub fn score(signals: &CampaignSignals) -> ScoreResult {
    match signals {
        CampaignSignals::Betting(s) => score_betting(s),
        CampaignSignals::Gaming(s) => score_gaming(s),
        CampaignSignals::Esports(s) => score_esports(s),
    }
}

fn finish(
    campaign: CampaignType,
    components: Vec<SubScore>,
    flat_bonus: f64,
    confidence: f64,
    predictions_input: PredictionsInput,
) -> ScoreResult {
    let weighted_sum: f64 = components.iter().map(|c| c.weighted).sum();
    let raw_total = weighted_sum + flat_bonus;
    let score = raw_total.clamp(0.0, 100.0);
    let confidence = confidence.clamp(0.0, 100.0);
    let tier = Tier::from_score(score);
    let predictions = predict(campaign, score, predictions_input);

    ScoreResult {
        campaign,
        score,
        confidence,
        tier,
        breakdown: ScoreBreakdown {
            components,
            flat_bonus,
            raw_total,
        },
        predictions,
    }
}

fn sub(name: &'static str, raw: f64, weight: f64) -> SubScore {
    SubScore {
        name,
        raw,
        weight,
        weighted: raw * weight,
    }
}

fn pct(value: Option<f64>) -> f64 {
    value.unwrap_or(0.0).clamp(0.0, 100.0)
}

fn level_points(level: Option<Level>, high: f64, medium: f64, low: f64) -> f64 {
    match level {
        Some(Level::High) => high,
        Some(Level::Medium) => medium,
        Some(Level::Low) => low,
        None => 0.0,
    }
}

fn has_tag(tags: &std::collections::BTreeSet<String>, tag: &str) -> bool {
    tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
}

fn score_betting(s: &BettingSignals) -> ScoreResult {
    let audience = level_points(s.risk_tolerance, 40.0, 25.0, 10.0)
        + level_points(s.financial_capacity, 30.0, 20.0, 10.0)
        + pct(s.gambling_propensity_pct) * BETTING_GAMBLING_FRACTION;

    let conversion =
        pct(s.sponsorship_receptivity_pct) * 0.6 + pct(s.viewer_retention_pct) * 0.4;

    let safety = pct(s.brand_safety_score);

    let mut flat_bonus = 0.0;
    if matches!(s.platform, Some(Platform::Twitch | Platform::Kick)) {
        flat_bonus += BETTING_PLATFORM_BONUS;
    }
    if let Some(region) = &s.region {
        if BETTING_REGIONS
            .iter()
            .any(|r| r.eq_ignore_ascii_case(region))
        {
            flat_bonus += BETTING_REGION_BONUS;
        }
    }

    let mut confidence = CONFIDENCE_BASE;
    if pct(s.gambling_propensity_pct) > 70.0 {
        confidence += 15.0;
    }
    match s.brand_safety_score {
        Some(score) if score < 40.0 => confidence -= 15.0,
        Some(score) if score >= 85.0 => confidence += 10.0,
        _ => {}
    }

    let components = vec![
        sub("audience_psychology", audience, BETTING_W_AUDIENCE),
        sub("conversion_engagement", conversion, BETTING_W_CONVERSION),
        sub("brand_safety", safety, BETTING_W_SAFETY),
    ];

    finish(
        CampaignType::Betting,
        components,
        flat_bonus,
        confidence,
        PredictionsInput {
            bonus_signal_pct: pct(s.gambling_propensity_pct),
            brand_safety: s.brand_safety_score,
            gambling_propensity: s.gambling_propensity_pct,
        },
    )
}

fn score_gaming(s: &GamingSignals) -> ScoreResult {
    let mut signal = 0.0;
    if has_tag(&s.tags, "GAMING") {
        signal += GAMING_TAG_GAMING_PTS;
    }
    if has_tag(&s.tags, "ESPORTS") {
        signal += GAMING_TAG_ESPORTS_PTS;
    }
    signal += level_points(s.financial_capacity, 30.0, 20.0, 10.0);

    let audience_quality = pct(s.viewer_retention_pct);

    let mut confidence = CONFIDENCE_BASE;
    if has_tag(&s.tags, "GAMING") {
        confidence += 10.0;
    }
    if pct(s.viewer_retention_pct) > 70.0 {
        confidence += 10.0;
    }

    let components = vec![
        sub("gaming_signal", signal, GAMING_W_SIGNAL),
        sub("audience_quality", audience_quality, GAMING_W_AUDIENCE_QUALITY),
    ];

    finish(
        CampaignType::Gaming,
        components,
        0.0,
        confidence,
        PredictionsInput {
            bonus_signal_pct: pct(s.viewer_retention_pct),
            brand_safety: None,
            gambling_propensity: None,
        },
    )
}

fn score_esports(s: &EsportsSignals) -> ScoreResult {
    let mut competitive = 0.0;
    if has_tag(&s.tags, "ESPORTS") {
        competitive += ESPORTS_TAG_ESPORTS_PTS;
    }
    if has_tag(&s.tags, "COMPETITIVE") {
        competitive += ESPORTS_TAG_COMPETITIVE_PTS;
    }
    if let Some(game) = &s.current_game {
        if ESPORTS_TITLES.iter().any(|t| t.eq_ignore_ascii_case(game)) {
            competitive += ESPORTS_GAME_PTS;
        }
    }

    let engagement = pct(s.repeat_viewer_rate_pct);

    let mut confidence = CONFIDENCE_BASE;
    if has_tag(&s.tags, "ESPORTS") {
        confidence += 10.0;
    }
    if pct(s.repeat_viewer_rate_pct) > 70.0 {
        confidence += 10.0;
    }

    let components = vec![
        sub("competitive_content", competitive, ESPORTS_W_COMPETITIVE),
        sub("engagement", engagement, ESPORTS_W_ENGAGEMENT),
    ];

    finish(
        CampaignType::Esports,
        components,
        0.0,
        confidence,
        PredictionsInput {
            bonus_signal_pct: pct(s.repeat_viewer_rate_pct),
            brand_safety: None,
            gambling_propensity: None,
        },
    )
}

// ---------------------------------------------------------------------------
// Predictions
// ---------------------------------------------------------------------------

struct PredictionsInput {
    /// The named bonus-signal percentage feeding the prediction multiplier.
    bonus_signal_pct: f64,
    brand_safety: Option<f64>,
    gambling_propensity: Option<f64>,
}

/// Industry baseline constants per campaign type: (CTR %, conversion %, ROI).
fn baselines(campaign: CampaignType) -> (f64, f64, f64) {
    match campaign {
        CampaignType::Betting => (2.5, 1.8, 2.2),
        CampaignType::Gaming => (3.2, 2.4, 2.8),
        CampaignType::Esports => (2.8, 2.1, 2.5),
    }
}

/// Each prediction is `baseline * (score / 100) * (1 + bonus_signal / 100)`,
/// rounded to two decimals. No randomness anywhere: reproducibility from the
/// same inputs is a design property.
fn predict(campaign: CampaignType, score: f64, input: PredictionsInput) -> CampaignPredictions {
    let (ctr_base, conv_base, roi_base) = baselines(campaign);
    let multiplier = (score / 100.0) * (1.0 + input.bonus_signal_pct / 100.0);

    let mut risk_factors = Vec::new();
    let risk_level = match input.brand_safety {
        Some(safety) if safety < 40.0 => {
            risk_factors.push(format!("brand safety score {safety:.0} is below 40"));
            RiskLevel::High
        }
        Some(safety) if safety < 70.0 => RiskLevel::Medium,
        Some(_) => RiskLevel::Low,
        None if campaign == CampaignType::Betting => {
            risk_factors.push("no brand safety signal available".to_string());
            RiskLevel::Medium
        }
        None => RiskLevel::Low,
    };
    if let Some(gambling) = input.gambling_propensity {
        if gambling > 90.0 {
            risk_factors.push(format!(
                "gambling propensity {gambling:.0} may attract regulator attention"
            ));
        }
    }

    CampaignPredictions {
        ctr_pct: round2(ctr_base * multiplier),
        conversion_rate_pct: round2(conv_base * multiplier),
        roi_multiplier: round2(roi_base * multiplier),
        risk_level,
        risk_factors,
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    fn tags(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|s| (*s).to_string()).collect()
    }

    fn max_betting() -> BettingSignals {
        BettingSignals {
            risk_tolerance: Some(Level::High),
            financial_capacity: Some(Level::High),
            gambling_propensity_pct: Some(100.0),
            sponsorship_receptivity_pct: Some(100.0),
            viewer_retention_pct: Some(100.0),
            brand_safety_score: Some(100.0),
            platform: Some(Platform::Twitch),
            region: Some("UK".to_string()),
        }
    }

    #[test]
    fn betting_raw_total_exceeds_100_and_is_clamped() {
        let result = score(&CampaignSignals::Betting(max_betting()));

        // 0.35*120 + 0.25*100 + 0.20*100 + 15 = 102
        assert!(
            result.breakdown.raw_total > 100.0,
            "raw total should exceed 100, got {}",
            result.breakdown.raw_total
        );
        assert_eq!(result.score, 100.0, "clamp must cap the final score");
        assert_eq!(result.tier, Tier::S);
    }

    #[test]
    fn all_neutral_signals_stay_in_bounds() {
        for signals in [
            CampaignSignals::Betting(BettingSignals::default()),
            CampaignSignals::Gaming(GamingSignals::default()),
            CampaignSignals::Esports(EsportsSignals::default()),
        ] {
            let result = score(&signals);
            assert!(
                (0.0..=100.0).contains(&result.score),
                "score out of bounds: {}",
                result.score
            );
            assert!(
                (0.0..=100.0).contains(&result.confidence),
                "confidence out of bounds: {}",
                result.confidence
            );
        }
    }

    #[test]
    fn gaming_max_inputs_hit_exactly_100_pre_clamp() {
        let signals = GamingSignals {
            tags: tags(&["GAMING", "ESPORTS"]),
            financial_capacity: Some(Level::High),
            viewer_retention_pct: Some(100.0),
        };
        let result = score(&CampaignSignals::Gaming(signals));
        assert_eq!(result.breakdown.raw_total, 100.0);
        assert_eq!(result.score, 100.0);
    }

    #[test]
    fn esports_max_inputs_hit_exactly_100_pre_clamp() {
        let signals = EsportsSignals {
            tags: tags(&["ESPORTS", "COMPETITIVE"]),
            current_game: Some("Valorant".to_string()),
            repeat_viewer_rate_pct: Some(100.0),
        };
        let result = score(&CampaignSignals::Esports(signals));
        assert_eq!(result.breakdown.raw_total, 100.0);
        assert_eq!(result.score, 100.0);
    }

    #[test]
    fn tier_thresholds_are_fixed() {
        assert_eq!(Tier::from_score(90.0), Tier::S);
        assert_eq!(Tier::from_score(89.9), Tier::A);
        assert_eq!(Tier::from_score(75.0), Tier::A);
        assert_eq!(Tier::from_score(74.9), Tier::B);
        assert_eq!(Tier::from_score(60.0), Tier::B);
        assert_eq!(Tier::from_score(59.9), Tier::C);
        assert_eq!(Tier::from_score(0.0), Tier::C);
    }

    #[test]
    fn higher_gambling_propensity_raises_audience_psychology() {
        let low = BettingSignals {
            gambling_propensity_pct: Some(20.0),
            ..BettingSignals::default()
        };
        let high = BettingSignals {
            gambling_propensity_pct: Some(45.0),
            ..BettingSignals::default()
        };

        let low_result = score(&CampaignSignals::Betting(low));
        let high_result = score(&CampaignSignals::Betting(high));

        let raw = |r: &ScoreResult| r.breakdown.components[0].raw;
        assert!(
            raw(&high_result) > raw(&low_result),
            "expected {} > {}",
            raw(&high_result),
            raw(&low_result)
        );
    }

    #[test]
    fn confidence_moves_on_thresholds() {
        let strong = BettingSignals {
            gambling_propensity_pct: Some(80.0),
            ..BettingSignals::default()
        };
        assert_eq!(
            score(&CampaignSignals::Betting(strong)).confidence,
            CONFIDENCE_BASE + 15.0
        );

        let unsafe_signals = BettingSignals {
            brand_safety_score: Some(30.0),
            ..BettingSignals::default()
        };
        assert_eq!(
            score(&CampaignSignals::Betting(unsafe_signals)).confidence,
            CONFIDENCE_BASE - 15.0
        );
    }

    #[test]
    fn low_brand_safety_yields_high_risk_with_factor() {
        let signals = BettingSignals {
            brand_safety_score: Some(25.0),
            ..BettingSignals::default()
        };
        let result = score(&CampaignSignals::Betting(signals));
        assert_eq!(result.predictions.risk_level, RiskLevel::High);
        assert!(
            !result.predictions.risk_factors.is_empty(),
            "expected a risk factor, got none"
        );
    }

    #[test]
    fn predictions_are_deterministic() {
        let signals = CampaignSignals::Esports(EsportsSignals {
            tags: tags(&["ESPORTS"]),
            current_game: Some("Dota 2".to_string()),
            repeat_viewer_rate_pct: Some(63.0),
        });

        let first = score(&signals);
        let second = score(&signals);

        assert_eq!(first, second, "scoring must be fully reproducible");
    }

    #[test]
    fn predictions_follow_the_baseline_formula() {
        let signals = CampaignSignals::Gaming(GamingSignals {
            tags: tags(&["GAMING"]),
            financial_capacity: Some(Level::Medium),
            viewer_retention_pct: Some(50.0),
        });
        let result = score(&signals);

        // score = 0.6*60 + 0.4*50 = 56; multiplier = 0.56 * 1.5
        assert_eq!(result.score, 56.0);
        assert_eq!(result.predictions.ctr_pct, round2(3.2 * 0.56 * 1.5));
        assert_eq!(result.predictions.conversion_rate_pct, round2(2.4 * 0.56 * 1.5));
        assert_eq!(result.predictions.roi_multiplier, round2(2.8 * 0.56 * 1.5));
    }

    #[test]
    fn platform_and_region_bonus_is_flat() {
        let base = BettingSignals {
            brand_safety_score: Some(50.0),
            ..BettingSignals::default()
        };
        let bonused = BettingSignals {
            platform: Some(Platform::Kick),
            region: Some("mt".to_string()),
            ..base.clone()
        };

        let without = score(&CampaignSignals::Betting(base));
        let with = score(&CampaignSignals::Betting(bonused));

        assert_eq!(
            with.breakdown.raw_total - without.breakdown.raw_total,
            BETTING_PLATFORM_BONUS + BETTING_REGION_BONUS
        );
    }
}
