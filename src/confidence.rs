//! # Confidence Scorer
//!
//! Maps a (match tier, strength) pair to the user-facing confidence label.
//! The mapping is a pure function and is monotonic: within a tier, higher
//! strength never yields a lower label.

use crate::config::EngineConfig;
use crate::matcher::MatchTier;
use serde::{Deserialize, Serialize};
use std::fmt;

/// User-facing match quality label. Ordered so that comparisons read
/// naturally: `Low < Medium < High`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl Confidence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Confidence::High => "high",
            Confidence::Medium => "medium",
            Confidence::Low => "low",
        }
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Derive the confidence label for a match
pub fn score(tier: MatchTier, strength: f64, config: &EngineConfig) -> Confidence {
    match tier {
        MatchTier::Exact => Confidence::High,
        MatchTier::TokenOverlap => {
            if strength >= config.token_overlap_high {
                Confidence::High
            } else {
                Confidence::Medium
            }
        }
        MatchTier::Fuzzy => {
            if strength >= config.fuzzy_high {
                Confidence::Medium
            } else {
                Confidence::Low
            }
        }
    }
}
