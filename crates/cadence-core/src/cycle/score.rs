//! Momentum score ledger.
//!
//! A bounded integer that moves by one step per automatic reset: up when the
//! cycle that just ended was fully completed, down otherwise. Manual resets
//! and individual task toggles never touch it.

use serde::{Deserialize, Serialize};

pub const SCORE_MIN: i32 = -100;
pub const SCORE_MAX: i32 = 100;

/// Apply one automatic-reset outcome to a score.
pub fn apply(score: i32, was_fully_completed: bool) -> i32 {
    let delta = if was_fully_completed { 1 } else { -1 };
    score.saturating_add(delta).clamp(SCORE_MIN, SCORE_MAX)
}

/// Presentation bucket for a momentum score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MomentumLevel {
    /// 50 and above
    Thriving,
    /// 20 ..= 49
    Strong,
    /// 1 ..= 19
    Building,
    /// exactly 0
    Neutral,
    /// -20 ..= -1
    Slipping,
    /// -50 ..= -21
    Struggling,
    /// below -50
    Stalled,
}

impl MomentumLevel {
    /// Derived from the score alone.
    pub fn classify(score: i32) -> Self {
        match score {
            i32::MIN..=-51 => MomentumLevel::Stalled,
            -50..=-21 => MomentumLevel::Struggling,
            -20..=-1 => MomentumLevel::Slipping,
            0 => MomentumLevel::Neutral,
            1..=19 => MomentumLevel::Building,
            20..=49 => MomentumLevel::Strong,
            50..=i32::MAX => MomentumLevel::Thriving,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MomentumLevel::Thriving => "thriving",
            MomentumLevel::Strong => "strong",
            MomentumLevel::Building => "building",
            MomentumLevel::Neutral => "neutral",
            MomentumLevel::Slipping => "slipping",
            MomentumLevel::Struggling => "struggling",
            MomentumLevel::Stalled => "stalled",
        }
    }

    /// Human-readable description of the level
    pub fn description(&self) -> &'static str {
        match self {
            MomentumLevel::Thriving => "Completing cycle after cycle",
            MomentumLevel::Strong => "Consistently finishing cycles",
            MomentumLevel::Building => "Momentum is building",
            MomentumLevel::Neutral => "No momentum yet",
            MomentumLevel::Slipping => "A few cycles slipped",
            MomentumLevel::Struggling => "Most cycles are left unfinished",
            MomentumLevel::Stalled => "Cycles keep lapsing",
        }
    }
}
