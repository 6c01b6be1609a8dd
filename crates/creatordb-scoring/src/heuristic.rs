//! Deterministic heuristic signal generation.
//!
//! When no external signal generator is wired in, the analyzer derives a
//! campaign signal profile straight from the stored source record. Every rule
//! is a fixed function of profile fields, so two runs over the same record
//! always produce the same signals (and therefore the same score).

use creatordb_core::{Platform, SourceProfile};

use crate::signals::{
    BettingSignals, CampaignSignals, CampaignType, EsportsSignals, GamingSignals, Level,
};

/// Audience-size thresholds for the financial-capacity estimate.
const CAPACITY_HIGH_FOLLOWERS: i64 = 1_000_000;
const CAPACITY_MEDIUM_FOLLOWERS: i64 = 100_000;

/// Tags treated as direct gambling-content markers.
const GAMBLING_TAGS: &[&str] = &["GAMBLING", "CASINO", "SLOTS", "POKER", "BETTING"];

/// Derives campaign signals from source profiles using fixed rules.
///
/// Stateless; exists as a struct so callers can hold it behind the same seam
/// an external generator would occupy.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicAnalyzer;

impl HeuristicAnalyzer {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Derive the signal profile for one source record and campaign type.
    #[must_use]
    pub fn analyze(&self, profile: &SourceProfile, campaign: CampaignType) -> CampaignSignals {
        match campaign {
            CampaignType::Betting => CampaignSignals::Betting(self.betting_signals(profile)),
            CampaignType::Gaming => CampaignSignals::Gaming(self.gaming_signals(profile)),
            CampaignType::Esports => CampaignSignals::Esports(self.esports_signals(profile)),
        }
    }

    fn betting_signals(&self, profile: &SourceProfile) -> BettingSignals {
        BettingSignals {
            risk_tolerance: Some(risk_tolerance(profile)),
            financial_capacity: Some(financial_capacity(profile.followers)),
            gambling_propensity_pct: Some(gambling_propensity(profile)),
            sponsorship_receptivity_pct: Some(sponsorship_receptivity(profile)),
            viewer_retention_pct: Some(viewer_retention(profile)),
            brand_safety_score: Some(brand_safety(profile)),
            platform: Some(profile.platform),
            region: profile
                .region
                .clone()
                .or_else(|| profile.inferred_country.clone()),
        }
    }

    fn gaming_signals(&self, profile: &SourceProfile) -> GamingSignals {
        GamingSignals {
            tags: profile.tags.clone(),
            financial_capacity: Some(financial_capacity(profile.followers)),
            viewer_retention_pct: Some(viewer_retention(profile)),
        }
    }

    fn esports_signals(&self, profile: &SourceProfile) -> EsportsSignals {
        EsportsSignals {
            tags: profile.tags.clone(),
            current_game: profile.current_game.clone(),
            repeat_viewer_rate_pct: Some(viewer_retention(profile)),
        }
    }
}

fn has_tag(profile: &SourceProfile, tag: &str) -> bool {
    profile.tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
}

fn has_any_tag(profile: &SourceProfile, tags: &[&str]) -> bool {
    tags.iter().any(|t| has_tag(profile, t))
}

fn financial_capacity(followers: i64) -> Level {
    if followers >= CAPACITY_HIGH_FOLLOWERS {
        Level::High
    } else if followers >= CAPACITY_MEDIUM_FOLLOWERS {
        Level::Medium
    } else {
        Level::Low
    }
}

fn risk_tolerance(profile: &SourceProfile) -> Level {
    if has_any_tag(profile, GAMBLING_TAGS) {
        Level::High
    } else if has_tag(profile, "GAMING") || profile.platform == Platform::Kick {
        Level::Medium
    } else {
        Level::Low
    }
}

/// Estimated share of the audience receptive to gambling content.
///
/// Gambling-content markers dominate; a plain gaming audience still skews
/// higher than a general one.
fn gambling_propensity(profile: &SourceProfile) -> f64 {
    let mut pct: f64 = 20.0;
    if has_any_tag(profile, GAMBLING_TAGS) {
        pct += 45.0;
    }
    if has_tag(profile, "GAMING") {
        pct += 15.0;
    }
    if profile.platform == Platform::Kick {
        pct += 10.0;
    }
    pct.clamp(0.0, 100.0)
}

/// Creators already maintaining off-platform presence are likelier to take
/// sponsorships; each linked profile nudges the estimate up.
fn sponsorship_receptivity(profile: &SourceProfile) -> f64 {
    let base = 40.0;
    let links = profile.social_links.len() as f64 * 8.0;
    (base + links).clamp(0.0, 100.0)
}

fn viewer_retention(profile: &SourceProfile) -> f64 {
    // Anchor (streaming) audiences retain better than satellite followings.
    let base: f64 = if profile.platform.is_anchor() { 55.0 } else { 40.0 };
    let capacity_bump = match financial_capacity(profile.followers) {
        Level::High => 15.0,
        Level::Medium => 10.0,
        Level::Low => 0.0,
    };
    (base + capacity_bump).clamp(0.0, 100.0)
}

fn brand_safety(profile: &SourceProfile) -> f64 {
    let mut score: f64 = 70.0;
    if has_tag(profile, "FAMILY_FRIENDLY") {
        score += 20.0;
    }
    if has_any_tag(profile, &["CONTROVERSIAL", "DRAMA"]) {
        score -= 35.0;
    }
    score.clamp(0.0, 100.0)
}
