//! # Receipt Scan Pipeline
//!
//! Ties the stages together: normalize → noise-filter → extract → match →
//! score → deduplicate/assemble. Control flow is strictly linear; no stage
//! feeds back into an earlier one. Processing is pure and synchronous over
//! inputs owned by the scan, so concurrent scans need no coordination
//! beyond shared read access to the reference table.
//!
//! The pipeline never fails: empty input, all-noise input, and lines that
//! match nothing all just contribute zero items.

use crate::assembler::{assemble, MatchedItem};
use crate::config::EngineConfig;
use crate::extractor::extract;
use crate::food_table::FoodTable;
use crate::matcher::{FoodMatcher, MatchResult};
use crate::noise_filter::classify;
use crate::normalizer::RawLine;
use crate::observability;
use std::time::Instant;
use tracing::info;

/// One scan's worth of processing over a borrowed reference table
pub struct ReceiptPipeline<'a> {
    table: &'a FoodTable,
    config: &'a EngineConfig,
}

impl<'a> ReceiptPipeline<'a> {
    pub fn new(table: &'a FoodTable, config: &'a EngineConfig) -> Self {
        Self { table, config }
    }

    /// Process one receipt's raw OCR lines into the final item list.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use receipt_shelflife::{EngineConfig, FoodTable, ReceiptPipeline};
    ///
    /// let table = FoodTable::builtin();
    /// let config = EngineConfig::default();
    /// let pipeline = ReceiptPipeline::new(&table, &config);
    ///
    /// let items = pipeline.process(&["BREAD 007225003712 F 2.88 N", "TOTAL 45.67"]);
    /// assert_eq!(items.len(), 1);
    /// assert_eq!(items[0].id, "item_001");
    /// assert_eq!(items[0].food_name, "Bread, commercial");
    /// ```
    pub fn process(&self, lines: &[&str]) -> Vec<MatchedItem> {
        let start = Instant::now();
        let matcher = FoodMatcher::new(self.table, self.config);

        let mut results: Vec<MatchResult> = Vec::new();
        let mut noise_dropped = 0usize;
        let mut candidates = 0usize;

        for (index, raw) in lines.iter().enumerate() {
            let normalized = RawLine::new(raw, index).normalize();

            if let Some(rule) = classify(&normalized, self.config) {
                observability::record_noise_drop(rule);
                noise_dropped += 1;
                continue;
            }

            let Some(candidate) = extract(&normalized, self.config) else {
                continue;
            };
            candidates += 1;

            if let Some(result) = matcher.match_candidate(candidate) {
                observability::record_match_tier(result.tier);
                results.push(result);
            }
        }

        let items = assemble(results, self.table, self.config);

        let duration = start.elapsed();
        observability::record_scan_metrics(
            duration,
            lines.len(),
            noise_dropped,
            candidates,
            items.len(),
        );
        info!(
            lines = lines.len(),
            noise_dropped,
            candidates,
            items = items.len(),
            duration_ms = duration.as_millis() as u64,
            "Receipt scan complete"
        );

        items
    }

    /// Convenience wrapper for callers holding the OCR output as one block
    /// of text rather than split lines
    pub fn process_text(&self, text: &str) -> Vec<MatchedItem> {
        let lines: Vec<&str> = text.lines().collect();
        self.process(&lines)
    }
}
