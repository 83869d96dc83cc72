//! Scoring module for search results
//!
//! Scores are tiered so that every exact match outranks every prefix match,
//! and every prefix match outranks every substring-only match:
//! - exact name equality
//! - prefix match, shorter names first
//! - substring match, shorter names first

use serde::{Deserialize, Serialize};

/// How an entry name matched the query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchKind {
    Exact,
    Prefix,
    Substring,
}

/// Configurable weights for scoring factors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    /// Score of a name equal to the query
    pub exact_match_score: f32,
    /// Base score of a name starting with the query
    pub prefix_base_score: f32,
    /// Bonus scaled by 1 / (1 + extra characters beyond the query)
    pub length_weight: f32,
    /// Multiplier applied to the length bonus of substring-only matches
    pub substring_factor: f32,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            exact_match_score: 3.0,
            prefix_base_score: 1.0,
            length_weight: 1.0,
            substring_factor: 0.5,
        }
    }
}

/// Scorer calculates relevance scores for matched entries
#[derive(Debug, Clone)]
pub struct Scorer {
    weights: ScoringWeights,
}

impl Scorer {
    pub fn new(weights: ScoringWeights) -> Self {
        Self { weights }
    }

    /// Create a scorer with default weights
    pub fn with_defaults() -> Self {
        Self::new(ScoringWeights::default())
    }

    /// Score a match given the character lengths of the name and the query
    pub fn score(&self, kind: MatchKind, name_len: usize, query_len: usize) -> f32 {
        match kind {
            MatchKind::Exact => self.weights.exact_match_score,
            MatchKind::Prefix => {
                self.weights.prefix_base_score + self.length_bonus(name_len, query_len)
            }
            MatchKind::Substring => {
                self.weights.substring_factor * self.length_bonus(name_len, query_len)
            }
        }
    }

    /// Inverse of the number of characters the name has beyond the query
    fn length_bonus(&self, name_len: usize, query_len: usize) -> f32 {
        let extra = name_len.saturating_sub(query_len) as f32;
        self.weights.length_weight / (1.0 + extra)
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }
}
