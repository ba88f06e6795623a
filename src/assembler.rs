//! # Deduplicator & Assembler
//!
//! Final pipeline stage. Receipts routinely list the same product twice
//! (multiples of one item print as separate lines), so surviving matches
//! are grouped by canonical food name and only the best-confidence
//! instance of each group survives. Ids are assigned sequentially in the
//! order groups are first encountered by line index, which keeps output
//! stable across identical scans.

use crate::confidence::{score, Confidence};
use crate::config::EngineConfig;
use crate::food_table::{FoodTable, ShelfLife};
use crate::matcher::MatchResult;
use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

/// One identified food item — the engine's final output unit. Never
/// mutated after creation and scoped to a single scan.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchedItem {
    /// Stable per-scan identifier ("item_001", "item_002", ...)
    pub id: String,
    /// Original receipt line the item was recognized from
    pub raw_text: String,
    /// Canonical food name from the reference table
    pub food_name: String,
    pub confidence: Confidence,
    pub shelf_life: ShelfLife,
    pub category: String,
}

/// Collapse duplicate matches and assemble the final item list.
///
/// `results` must be in line order, which the pipeline guarantees. Within
/// a group the highest confidence wins; ties keep the first occurrence.
pub fn assemble(
    results: Vec<MatchResult>,
    table: &FoodTable,
    config: &EngineConfig,
) -> Vec<MatchedItem> {
    // Groups in first-encounter order; the map only tracks membership.
    let mut groups: Vec<(MatchResult, Confidence)> = Vec::new();
    let mut group_of_entry: HashMap<usize, usize> = HashMap::new();

    for result in results {
        let confidence = score(result.tier, result.strength, config);
        match group_of_entry.get(&result.entry_index) {
            Some(&pos) => {
                if confidence > groups[pos].1 {
                    debug!(
                        food = %table.get(result.entry_index).canonical_name,
                        old = %groups[pos].1,
                        new = %confidence,
                        "Duplicate match upgraded group confidence"
                    );
                    groups[pos] = (result, confidence);
                }
                // Equal or lower confidence: first occurrence wins.
            }
            None => {
                group_of_entry.insert(result.entry_index, groups.len());
                groups.push((result, confidence));
            }
        }
    }

    groups
        .into_iter()
        .enumerate()
        .map(|(i, (result, confidence))| {
            let entry = table.get(result.entry_index);
            MatchedItem {
                id: format!("item_{:03}", i + 1),
                raw_text: result.candidate.raw_text,
                food_name: entry.canonical_name.clone(),
                confidence,
                shelf_life: entry.shelf_life.clone(),
                category: entry.category.clone(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::Candidate;
    use crate::matcher::MatchTier;

    fn result(entry_index: usize, line_index: usize, tier: MatchTier, strength: f64) -> MatchResult {
        MatchResult {
            candidate: Candidate {
                tokens: vec![format!("line{}", line_index)],
                matching: format!("line{}", line_index),
                line_index,
                raw_text: format!("RAW LINE {}", line_index),
            },
            entry_index,
            tier,
            strength,
        }
    }

    #[test]
    fn test_ids_follow_first_encounter_order() {
        let table = FoodTable::builtin();
        let cfg = EngineConfig::default();
        let bread = table.resolve_alias("bread").unwrap();
        let eggs = table.resolve_alias("eggs").unwrap();

        let items = assemble(
            vec![
                result(bread, 0, MatchTier::Exact, 1.0),
                result(eggs, 1, MatchTier::Exact, 1.0),
            ],
            &table,
            &cfg,
        );

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].id, "item_001");
        assert_eq!(items[0].food_name, "Bread, commercial");
        assert_eq!(items[1].id, "item_002");
        assert_eq!(items[1].food_name, "Eggs, fresh");
    }

    #[test]
    fn test_duplicates_collapse_keeping_first_on_tie() {
        let table = FoodTable::builtin();
        let cfg = EngineConfig::default();
        let bread = table.resolve_alias("bread").unwrap();

        let items = assemble(
            vec![
                result(bread, 0, MatchTier::Exact, 1.0),
                result(bread, 3, MatchTier::Exact, 1.0),
            ],
            &table,
            &cfg,
        );

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].raw_text, "RAW LINE 0");
    }

    #[test]
    fn test_higher_confidence_duplicate_replaces_earlier_one() {
        let table = FoodTable::builtin();
        let cfg = EngineConfig::default();
        let bread = table.resolve_alias("bread").unwrap();

        let items = assemble(
            vec![
                result(bread, 0, MatchTier::Fuzzy, 0.8), // low
                result(bread, 2, MatchTier::Exact, 1.0), // high
            ],
            &table,
            &cfg,
        );

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].confidence, Confidence::High);
        assert_eq!(items[0].raw_text, "RAW LINE 2");
        // The replacement keeps the group's original position and id.
        assert_eq!(items[0].id, "item_001");
    }

    #[test]
    fn test_metadata_is_copied_from_the_entry() {
        let table = FoodTable::builtin();
        let cfg = EngineConfig::default();
        let pb = table.resolve_alias("pnt buttr").unwrap();

        let items = assemble(vec![result(pb, 0, MatchTier::Exact, 1.0)], &table, &cfg);
        assert_eq!(items[0].food_name, "Peanut Butter");
        assert_eq!(items[0].category, "Pantry Staples");
        assert!(items[0].shelf_life.pantry.is_some());
    }

    #[test]
    fn test_empty_input_yields_empty_output() {
        let table = FoodTable::builtin();
        let cfg = EngineConfig::default();
        assert!(assemble(vec![], &table, &cfg).is_empty());
    }
}
