//! # Food Matcher
//!
//! Fourth pipeline stage. Maps a candidate token sequence to a reference
//! entry through three ordered tiers, stopping at the first success:
//!
//! 1. **Exact alias** — direct lookup of the brand-stripped candidate
//!    string in the table's alias index. Strength 1.0.
//! 2. **Token overlap** — fraction of candidate tokens appearing as whole
//!    words in an entry's best alias, above a configured threshold.
//! 3. **Fuzzy distance** — normalized Levenshtein similarity between the
//!    candidate string and every alias, above a configured threshold.
//!
//! Ties in tiers 2 and 3 are broken by longer alias first, then by table
//! insertion order, so matching is fully deterministic. A candidate that
//! fails every tier yields no result — most OCR debris that survives the
//! noise filter is expected to land here.

use crate::config::EngineConfig;
use crate::extractor::Candidate;
use crate::food_table::FoodTable;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, trace};

/// The matching strategy that produced a result, in decreasing precedence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchTier {
    Exact,
    TokenOverlap,
    Fuzzy,
}

impl MatchTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchTier::Exact => "exact",
            MatchTier::TokenOverlap => "token_overlap",
            MatchTier::Fuzzy => "fuzzy",
        }
    }
}

/// A candidate resolved against the reference table
#[derive(Debug, Clone)]
pub struct MatchResult {
    pub candidate: Candidate,
    /// Index of the matched entry in the table
    pub entry_index: usize,
    pub tier: MatchTier,
    /// Match strength in [0, 1]; 1.0 for exact-alias matches
    pub strength: f64,
}

/// Tiered matcher over a borrowed reference table
pub struct FoodMatcher<'a> {
    table: &'a FoodTable,
    config: &'a EngineConfig,
}

impl<'a> FoodMatcher<'a> {
    pub fn new(table: &'a FoodTable, config: &'a EngineConfig) -> Self {
        Self { table, config }
    }

    /// Run the candidate through the match tiers. Returns `None` when no
    /// tier succeeds — the candidate is not a recognizable food item.
    pub fn match_candidate(&self, candidate: Candidate) -> Option<MatchResult> {
        let query = self.strip_brand_prefix(&candidate.matching);
        trace!(
            line = candidate.line_index,
            candidate = %candidate.matching,
            query = %query,
            "Matching candidate"
        );

        if let Some(entry_index) = self.exact_tier(&query, &candidate.matching) {
            debug!(
                line = candidate.line_index,
                food = %self.table.get(entry_index).canonical_name,
                "Exact alias match"
            );
            return Some(MatchResult {
                candidate,
                entry_index,
                tier: MatchTier::Exact,
                strength: 1.0,
            });
        }

        if let Some((entry_index, strength)) = self.overlap_tier(&query) {
            debug!(
                line = candidate.line_index,
                food = %self.table.get(entry_index).canonical_name,
                strength,
                "Token-overlap match"
            );
            return Some(MatchResult {
                candidate,
                entry_index,
                tier: MatchTier::TokenOverlap,
                strength,
            });
        }

        if let Some((entry_index, strength)) = self.fuzzy_tier(&query) {
            debug!(
                line = candidate.line_index,
                food = %self.table.get(entry_index).canonical_name,
                strength,
                "Fuzzy match"
            );
            return Some(MatchResult {
                candidate,
                entry_index,
                tier: MatchTier::Fuzzy,
                strength,
            });
        }

        trace!(line = candidate.line_index, candidate = %candidate.matching, "No match");
        None
    }

    /// Remove leading store-brand markers ("GV", "GREAT VALUE", ...) so
    /// branded receipt lines resolve to the underlying product. Falls back
    /// to the unstripped string when nothing but the brand remains.
    fn strip_brand_prefix(&self, matching: &str) -> String {
        let mut query = matching.to_string();
        loop {
            let mut stripped = false;
            for prefix in &self.config.brand_prefixes {
                if query == *prefix {
                    query.clear();
                } else if let Some(rest) = query.strip_prefix(&format!("{} ", prefix)) {
                    query = rest.to_string();
                } else {
                    continue;
                }
                stripped = true;
                break;
            }
            if !stripped {
                break;
            }
        }
        if query.is_empty() {
            matching.to_string()
        } else {
            query
        }
    }

    fn exact_tier(&self, query: &str, unstripped: &str) -> Option<usize> {
        self.table
            .resolve_alias(query)
            .or_else(|| self.table.resolve_alias(unstripped))
    }

    fn overlap_tier(&self, query: &str) -> Option<(usize, f64)> {
        let query_tokens: Vec<&str> = query.split_whitespace().collect();
        if query_tokens.is_empty() {
            return None;
        }

        let mut best: Option<(usize, f64, usize)> = None; // (entry, fraction, alias_len)
        for (idx, entry) in self.table.entries().iter().enumerate() {
            for alias in &entry.aliases {
                let alias_tokens: HashSet<&str> = alias.split_whitespace().collect();
                let overlap = query_tokens
                    .iter()
                    .filter(|t| alias_tokens.contains(**t))
                    .count();
                if overlap == 0 {
                    continue;
                }
                let fraction = overlap as f64 / query_tokens.len() as f64;
                if is_better(best, fraction, alias.len()) {
                    best = Some((idx, fraction, alias.len()));
                }
            }
        }

        best.filter(|(_, fraction, _)| *fraction >= self.config.token_overlap_threshold)
            .map(|(idx, fraction, _)| (idx, fraction))
    }

    fn fuzzy_tier(&self, query: &str) -> Option<(usize, f64)> {
        let mut best: Option<(usize, f64, usize)> = None;
        for (idx, entry) in self.table.entries().iter().enumerate() {
            for alias in &entry.aliases {
                let score = similarity(query, alias);
                if is_better(best, score, alias.len()) {
                    best = Some((idx, score, alias.len()));
                }
            }
        }

        best.filter(|(_, score, _)| *score >= self.config.fuzzy_similarity_threshold)
            .map(|(idx, score, _)| (idx, score))
    }
}

/// Strictly-better comparison for tier scanning: higher score wins, equal
/// scores prefer the longer alias, and the earlier entry keeps its place
fn is_better(best: Option<(usize, f64, usize)>, score: f64, alias_len: usize) -> bool {
    match best {
        None => true,
        Some((_, best_score, best_len)) => {
            score > best_score || (score == best_score && alias_len > best_len)
        }
    }
}

/// Levenshtein edit distance over characters
pub(crate) fn levenshtein_distance(s1: &str, s2: &str) -> usize {
    let s1_chars: Vec<char> = s1.chars().collect();
    let s2_chars: Vec<char> = s2.chars().collect();

    let len1 = s1_chars.len();
    let len2 = s2_chars.len();

    let mut matrix = vec![vec![0; len2 + 1]; len1 + 1];

    #[allow(clippy::needless_range_loop)]
    for i in 0..=len1 {
        matrix[i][0] = i;
    }
    for j in 0..=len2 {
        matrix[0][j] = j;
    }

    for i in 1..=len1 {
        for j in 1..=len2 {
            let cost = if s1_chars[i - 1] == s2_chars[j - 1] {
                0
            } else {
                1
            };

            matrix[i][j] = (matrix[i - 1][j] + 1)
                .min(matrix[i][j - 1] + 1)
                .min(matrix[i - 1][j - 1] + cost);
        }
    }

    matrix[len1][len2]
}

/// Normalized edit-distance similarity in [0, 1]
pub(crate) fn similarity(s1: &str, s2: &str) -> f64 {
    let max_len = s1.chars().count().max(s2.chars().count());
    if max_len == 0 {
        return 1.0;
    }
    1.0 - levenshtein_distance(s1, s2) as f64 / max_len as f64
}
