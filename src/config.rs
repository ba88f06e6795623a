//! # Engine Configuration
//!
//! Centralized configuration for the line classification and food matching
//! engine. The matching thresholds that were implicit magic numbers in
//! earlier service variants are exposed here with documented defaults so
//! test suites can probe boundary behavior precisely.

use crate::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::env;

/// Configuration options for the matching pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Minimum token-overlap fraction for a token-overlap tier match
    pub token_overlap_threshold: f64,
    /// Overlap fraction at or above which an overlap match is high confidence
    pub token_overlap_high: f64,
    /// Minimum normalized edit-distance similarity for a fuzzy tier match
    pub fuzzy_similarity_threshold: f64,
    /// Similarity at or above which a fuzzy match is medium confidence
    pub fuzzy_high: f64,
    /// Store-brand prefixes stripped before matching (lowercase)
    pub brand_prefixes: Vec<String>,
    /// Lines shorter than this after normalization are treated as noise
    pub min_line_len: usize,
    /// Code-free lines with more words than this look like marketing copy
    pub max_promo_words: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            token_overlap_threshold: 0.5,
            token_overlap_high: 0.8,
            fuzzy_similarity_threshold: 0.75,
            fuzzy_high: 0.85,
            brand_prefixes: vec![
                "gv".to_string(),
                "great value".to_string(),
                "marketside".to_string(),
                "equate".to_string(),
            ],
            min_line_len: 3,
            max_promo_words: 5,
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables, falling back to defaults
    pub fn from_env() -> AppResult<Self> {
        let mut config = Self::default();

        config.token_overlap_threshold = parse_env_f64(
            "RECEIPT_TOKEN_OVERLAP_THRESHOLD",
            config.token_overlap_threshold,
        )?;
        config.token_overlap_high =
            parse_env_f64("RECEIPT_TOKEN_OVERLAP_HIGH", config.token_overlap_high)?;
        config.fuzzy_similarity_threshold = parse_env_f64(
            "RECEIPT_FUZZY_SIMILARITY_THRESHOLD",
            config.fuzzy_similarity_threshold,
        )?;
        config.fuzzy_high = parse_env_f64("RECEIPT_FUZZY_HIGH", config.fuzzy_high)?;

        if let Ok(prefixes) = env::var("RECEIPT_BRAND_PREFIXES") {
            config.brand_prefixes = prefixes
                .split(',')
                .map(|p| p.trim().to_lowercase())
                .filter(|p| !p.is_empty())
                .collect();
        }

        config.min_line_len = env::var("RECEIPT_MIN_LINE_LEN")
            .unwrap_or_else(|_| config.min_line_len.to_string())
            .parse()
            .map_err(|_| {
                AppError::Config("RECEIPT_MIN_LINE_LEN must be a valid number".to_string())
            })?;
        config.max_promo_words = env::var("RECEIPT_MAX_PROMO_WORDS")
            .unwrap_or_else(|_| config.max_promo_words.to_string())
            .parse()
            .map_err(|_| {
                AppError::Config("RECEIPT_MAX_PROMO_WORDS must be a valid number".to_string())
            })?;

        Ok(config)
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> AppResult<()> {
        let thresholds = [
            ("token_overlap_threshold", self.token_overlap_threshold),
            ("token_overlap_high", self.token_overlap_high),
            ("fuzzy_similarity_threshold", self.fuzzy_similarity_threshold),
            ("fuzzy_high", self.fuzzy_high),
        ];
        for (name, value) in thresholds {
            if !(value > 0.0 && value <= 1.0) {
                return Err(AppError::Config(format!(
                    "{} must be in (0.0, 1.0], got {}",
                    name, value
                )));
            }
        }

        // The high-confidence cutoffs must not sit below the match thresholds,
        // otherwise the confidence mapping would not be monotonic.
        if self.token_overlap_high < self.token_overlap_threshold {
            return Err(AppError::Config(
                "token_overlap_high cannot be below token_overlap_threshold".to_string(),
            ));
        }
        if self.fuzzy_high < self.fuzzy_similarity_threshold {
            return Err(AppError::Config(
                "fuzzy_high cannot be below fuzzy_similarity_threshold".to_string(),
            ));
        }

        if self.min_line_len == 0 {
            return Err(AppError::Config(
                "min_line_len must be greater than 0".to_string(),
            ));
        }
        if self.max_promo_words == 0 {
            return Err(AppError::Config(
                "max_promo_words must be greater than 0".to_string(),
            ));
        }

        for prefix in &self.brand_prefixes {
            if prefix.trim().is_empty() {
                return Err(AppError::Config(
                    "brand_prefixes cannot contain empty strings".to_string(),
                ));
            }
            if *prefix != prefix.to_lowercase() {
                return Err(AppError::Config(format!(
                    "brand prefix '{}' must be lowercase",
                    prefix
                )));
            }
        }

        Ok(())
    }
}

fn parse_env_f64(key: &str, default: f64) -> AppResult<f64> {
    env::var(key)
        .unwrap_or_else(|_| default.to_string())
        .parse()
        .map_err(|_| AppError::Config(format!("{} must be a valid number", key)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_threshold_range_validation() {
        let mut config = EngineConfig::default();

        config.token_overlap_threshold = 0.0;
        assert!(config.validate().is_err());
        config.token_overlap_threshold = 1.5;
        assert!(config.validate().is_err());
        config.token_overlap_threshold = 0.5;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_high_cutoff_must_not_undercut_threshold() {
        let mut config = EngineConfig::default();
        config.fuzzy_high = 0.5; // below fuzzy_similarity_threshold
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_brand_prefix_validation() {
        let mut config = EngineConfig::default();

        config.brand_prefixes = vec!["GV".to_string()];
        assert!(config.validate().is_err());

        config.brand_prefixes = vec!["  ".to_string()];
        assert!(config.validate().is_err());

        config.brand_prefixes = vec!["gv".to_string()];
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_limits_rejected() {
        let mut config = EngineConfig::default();
        config.min_line_len = 0;
        assert!(config.validate().is_err());
        config.min_line_len = 3;

        config.max_promo_words = 0;
        assert!(config.validate().is_err());
    }
}
