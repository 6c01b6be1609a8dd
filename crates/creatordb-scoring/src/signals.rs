//! Tagged signal structures, one per campaign type.
//!
//! Each campaign reads a fixed, different field subset, so the signals are an
//! enum rather than one dynamically-shaped bag. Missing fields degrade to
//! zero/neutral contributions instead of failing a score computation.

use std::collections::BTreeSet;

use creatordb_core::Platform;
use serde::{Deserialize, Serialize};

use crate::ScoringError;

/// A marketing use-case category selecting a distinct scoring decomposition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CampaignType {
    Betting,
    Gaming,
    Esports,
}

impl CampaignType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            CampaignType::Betting => "betting",
            CampaignType::Gaming => "gaming",
            CampaignType::Esports => "esports",
        }
    }
}

impl std::fmt::Display for CampaignType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for CampaignType {
    type Err = ScoringError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "betting" => Ok(CampaignType::Betting),
            "gaming" => Ok(CampaignType::Gaming),
            "esports" => Ok(CampaignType::Esports),
            other => Err(ScoringError::UnknownCampaignType(other.to_string())),
        }
    }
}

/// Categorical signal strength.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Low,
    Medium,
    High,
}

/// Signals read by the betting decomposition.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BettingSignals {
    pub risk_tolerance: Option<Level>,
    pub financial_capacity: Option<Level>,
    pub gambling_propensity_pct: Option<f64>,
    pub sponsorship_receptivity_pct: Option<f64>,
    pub viewer_retention_pct: Option<f64>,
    pub brand_safety_score: Option<f64>,
    pub platform: Option<Platform>,
    pub region: Option<String>,
}

/// Signals read by the gaming decomposition.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GamingSignals {
    pub tags: BTreeSet<String>,
    pub financial_capacity: Option<Level>,
    pub viewer_retention_pct: Option<f64>,
}

/// Signals read by the esports decomposition.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EsportsSignals {
    pub tags: BTreeSet<String>,
    pub current_game: Option<String>,
    pub repeat_viewer_rate_pct: Option<f64>,
}

/// The derived signal profile for one source record, tagged by campaign type.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "campaign", rename_all = "lowercase")]
pub enum CampaignSignals {
    Betting(BettingSignals),
    Gaming(GamingSignals),
    Esports(EsportsSignals),
}

impl CampaignSignals {
    #[must_use]
    pub fn campaign_type(&self) -> CampaignType {
        match self {
            CampaignSignals::Betting(_) => CampaignType::Betting,
            CampaignSignals::Gaming(_) => CampaignType::Gaming,
            CampaignSignals::Esports(_) => CampaignType::Esports,
        }
    }
}

/// Campaign outcome risk bucket, derived from the brand-safety signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

/// Deterministic campaign performance estimates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignPredictions {
    pub ctr_pct: f64,
    pub conversion_rate_pct: f64,
    pub roi_multiplier: f64,
    pub risk_level: RiskLevel,
    pub risk_factors: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn campaign_type_round_trips() {
        for campaign in [
            CampaignType::Betting,
            CampaignType::Gaming,
            CampaignType::Esports,
        ] {
            let parsed: CampaignType = campaign.as_str().parse().unwrap();
            assert_eq!(parsed, campaign);
        }
    }

    #[test]
    fn unknown_campaign_type_is_an_error() {
        let result = "crypto".parse::<CampaignType>();
        assert!(
            matches!(result, Err(ScoringError::UnknownCampaignType(_))),
            "got {result:?}"
        );
    }

    #[test]
    fn signals_serialize_with_campaign_tag() {
        let signals = CampaignSignals::Gaming(GamingSignals::default());
        let json = serde_json::to_value(&signals).unwrap();
        assert_eq!(json["campaign"], "gaming");
    }
}
