//! Campaign suitability scoring.
//!
//! The engine is a pure, deterministic function of a tagged per-campaign
//! signal structure: same inputs, same score, always. Signal generation is a
//! collaborator concern; a deterministic heuristic analyzer is provided for
//! callers without an external generator.

use thiserror::Error;

pub mod batch;
pub mod engine;
pub mod heuristic;
pub mod signals;

pub use batch::{score_batch, BatchOutcome, ScoredProfile};
pub use engine::{score, ScoreBreakdown, ScoreResult, SubScore, Tier};
pub use heuristic::HeuristicAnalyzer;
pub use signals::{
    BettingSignals, CampaignPredictions, CampaignSignals, CampaignType, EsportsSignals,
    GamingSignals, Level, RiskLevel,
};

#[derive(Debug, Error)]
pub enum ScoringError {
    #[error("unknown campaign type: {0}")]
    UnknownCampaignType(String),
    #[error("signal generation failed: {0}")]
    SignalGeneration(String),
}
