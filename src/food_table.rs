//! # Food Reference Table
//!
//! The read-only reference table the matcher resolves candidates against.
//! Each entry is one canonical food item with its known receipt aliases, a
//! category, and USDA FoodKeeper shelf-life guidance. The table is built
//! once at process start and shared by reference across all scans.
//!
//! Alias lookup is case-insensitive and whitespace-normalized. Construction
//! fails if an alias maps to two different entries, if an entry has no
//! aliases, or if two entries share a canonical name — ambiguity must be a
//! startup fault, never a silent runtime resolution.

use crate::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use tracing::{info, warn};

/// Shelf-life guidance for one food item. Absent fields mean the source
/// data offers no guidance for that storage location.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ShelfLife {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pantry: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fridge: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub freezer: Option<String>,
}

/// One canonical food item. Identity is `canonical_name`; immutable after
/// the table is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceEntry {
    pub canonical_name: String,
    /// Known receipt spellings, lowercase (the canonical name's normalized
    /// form is indexed automatically and need not be listed)
    pub aliases: Vec<String>,
    pub category: String,
    #[serde(default)]
    pub shelf_life: ShelfLife,
}

/// Mapping from every alias (and normalized canonical name) to its owning
/// entry, with entry insertion order preserved for deterministic
/// tie-breaking in the matcher.
#[derive(Debug)]
pub struct FoodTable {
    entries: Vec<ReferenceEntry>,
    alias_index: HashMap<String, usize>,
    canonical_index: HashMap<String, usize>,
}

/// Lowercase and collapse whitespace so that lookups are insensitive to
/// case and spacing noise.
pub(crate) fn normalize_key(text: &str) -> String {
    text.to_lowercase()
        .split_whitespace()
        .collect::<Vec<&str>>()
        .join(" ")
}

impl FoodTable {
    /// Build a table from pre-parsed entries, enforcing the integrity
    /// invariants. This is the only fallible step in the engine's lifetime.
    pub fn new(entries: Vec<ReferenceEntry>) -> AppResult<Self> {
        let mut alias_index: HashMap<String, usize> = HashMap::new();
        let mut canonical_index: HashMap<String, usize> = HashMap::new();

        for (idx, entry) in entries.iter().enumerate() {
            if entry.canonical_name.trim().is_empty() {
                return Err(AppError::Table(format!(
                    "entry {} has an empty canonical name",
                    idx
                )));
            }
            if entry.aliases.is_empty() {
                return Err(AppError::Table(format!(
                    "entry '{}' has an empty alias set",
                    entry.canonical_name
                )));
            }

            let canonical_key = normalize_key(&entry.canonical_name);
            if canonical_index.insert(canonical_key.clone(), idx).is_some() {
                return Err(AppError::Table(format!(
                    "duplicate canonical name '{}'",
                    entry.canonical_name
                )));
            }

            // The normalized canonical name resolves to its own entry.
            let mut keys: Vec<String> = vec![canonical_key];
            for alias in &entry.aliases {
                let key = normalize_key(alias);
                if key.is_empty() {
                    return Err(AppError::Table(format!(
                        "entry '{}' has an empty alias",
                        entry.canonical_name
                    )));
                }
                keys.push(key);
            }

            for key in keys {
                match alias_index.get(&key) {
                    Some(&owner) if owner != idx => {
                        return Err(AppError::Table(format!(
                            "alias '{}' maps to both '{}' and '{}'",
                            key, entries[owner].canonical_name, entry.canonical_name
                        )));
                    }
                    Some(_) => {} // same entry listed the alias twice
                    None => {
                        alias_index.insert(key, idx);
                    }
                }
            }
        }

        info!(
            entries = entries.len(),
            aliases = alias_index.len(),
            "Food reference table built"
        );

        Ok(Self {
            entries,
            alias_index,
            canonical_index,
        })
    }

    /// Resolve an alias to its entry index, case- and whitespace-insensitive
    pub fn resolve_alias(&self, alias: &str) -> Option<usize> {
        self.alias_index.get(&normalize_key(alias)).copied()
    }

    /// Look up an entry by canonical name, case-insensitive
    pub fn entry(&self, canonical_name: &str) -> Option<&ReferenceEntry> {
        self.canonical_index
            .get(&normalize_key(canonical_name))
            .map(|&idx| &self.entries[idx])
    }

    /// All entries in insertion order
    pub fn entries(&self) -> &[ReferenceEntry] {
        &self.entries
    }

    /// Entry at a given index; panics on out-of-range indices, which the
    /// matcher never produces
    pub fn get(&self, idx: usize) -> &ReferenceEntry {
        &self.entries[idx]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Distinct categories across all entries, sorted
    pub fn categories(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|e| e.category.clone())
            .collect::<std::collections::BTreeSet<String>>()
            .into_iter()
            .collect()
    }

    /// Built-in default table distilled from the USDA FoodKeeper data
    pub fn builtin() -> Self {
        Self::new(builtin_entries()).expect("built-in food table should be valid")
    }
}

/// Load the food reference table.
///
/// Tries, in order: the file named by the `FOOD_TABLE_PATH` environment
/// variable, a set of conventional locations, and finally the built-in
/// default table. A file that exists but fails integrity validation is a
/// fatal error; an unreadable or unparsable file falls through with a
/// warning, matching the behavior operators expect from optional config.
pub fn load_food_table() -> AppResult<FoodTable> {
    if let Ok(path) = std::env::var("FOOD_TABLE_PATH") {
        info!("Loading food table from environment variable: {}", path);
        match read_entries(&path) {
            Ok(entries) => return FoodTable::new(entries),
            Err(e) => {
                warn!(
                    "Failed to load food table from '{}': {}. Falling back to default paths.",
                    path, e
                );
            }
        }
    }

    let possible_paths = [
        "/app/config/food_table.json", // Docker path
        "config/food_table.json",      // Local development path
        "../config/food_table.json",   // Test path
    ];

    for path in &possible_paths {
        match read_entries(path) {
            Ok(entries) => {
                info!("Loaded food table from fallback path: {}", path);
                return FoodTable::new(entries);
            }
            Err(_) => continue,
        }
    }

    info!("No food table file found; using built-in table");
    Ok(FoodTable::builtin())
}

fn read_entries(path: &str) -> AppResult<Vec<ReferenceEntry>> {
    let content = fs::read_to_string(path)?;
    serde_json::from_str(&content)
        .map_err(|e| AppError::Io(format!("failed to parse '{}': {}", path, e)))
}

fn entry(
    canonical_name: &str,
    category: &str,
    aliases: &[&str],
    pantry: Option<&str>,
    fridge: Option<&str>,
    freezer: Option<&str>,
) -> ReferenceEntry {
    ReferenceEntry {
        canonical_name: canonical_name.to_string(),
        aliases: aliases.iter().map(|a| a.to_string()).collect(),
        category: category.to_string(),
        shelf_life: ShelfLife {
            pantry: pantry.map(str::to_string),
            fridge: fridge.map(str::to_string),
            freezer: freezer.map(str::to_string),
        },
    }
}

fn builtin_entries() -> Vec<ReferenceEntry> {
    vec![
        // Bakery
        entry(
            "Bread, commercial",
            "Bakery",
            &[
                "bread",
                "brd",
                "loaf",
                "white bread",
                "wheat bread",
                "whole wheat",
                "sourdough",
                "wonder bread",
                "sara lee",
            ],
            Some("14-18 days"),
            Some("2-3 weeks"),
            Some("3-5 months"),
        ),
        entry(
            "Rolls, yeast",
            "Bakery",
            &["rolls", "yeast rolls", "dinner rolls"],
            Some("14-18 days"),
            Some("2-3 weeks"),
            Some("3-5 months"),
        ),
        entry(
            "Crackers",
            "Bakery",
            &["crackers", "saltines", "ritz"],
            Some("8 months"),
            Some("3-4 months"),
            Some("3-4 months"),
        ),
        // Dairy & Eggs
        entry(
            "Eggs, fresh",
            "Dairy & Eggs",
            &["eggs", "egg", "large eggs", "dozen eggs", "organic eggs"],
            Some("Not safe"),
            Some("3-5 weeks"),
            Some("Do not freeze (shells)"),
        ),
        entry(
            "Milk",
            "Dairy & Eggs",
            &["milk", "whole milk", "skim milk", "2% milk", "1% milk", "lactaid"],
            Some("Not safe"),
            Some("1 week"),
            Some("3 months"),
        ),
        entry(
            "Butter",
            "Dairy & Eggs",
            &[
                "butter",
                "buttr",
                "salted butter",
                "unsalted butter",
                "land o lakes",
                "margarine",
            ],
            Some("Not recommended"),
            Some("1-2 months"),
            Some("6-9 months"),
        ),
        entry(
            "Cheese",
            "Dairy & Eggs",
            &[
                "cheese",
                "chse",
                "american cheese",
                "mozzarella",
                "kraft",
                "string cheese",
            ],
            Some("Not safe"),
            Some("3-4 weeks (hard), 1-2 weeks (soft)"),
            Some("6 months"),
        ),
        entry(
            "Cheese, hard",
            "Dairy & Eggs",
            &["cheddar", "swiss cheese", "parmesan"],
            Some("Not safe"),
            Some("6 months unopened, 3-4 weeks opened"),
            Some("6 months"),
        ),
        entry(
            "Yogurt",
            "Dairy & Eggs",
            &["yogurt", "greek yogurt"],
            Some("Not safe"),
            Some("1-2 weeks"),
            Some("1-2 months"),
        ),
        // Pantry staples
        entry(
            "Peanut Butter",
            "Pantry Staples",
            &[
                "peanut butter",
                "pnt buttr",
                "pnt butter",
                "jif",
                "skippy",
                "peter pan",
            ],
            Some("6-24 months"),
            Some("2-3 months after opening"),
            Some("Not recommended"),
        ),
        entry(
            "Coffee, ground",
            "Pantry Staples",
            &[
                "coffee",
                "folgers",
                "maxwell house",
                "instant coffee",
                "cafe bustelo",
            ],
            Some("1 week after opening"),
            Some("3-4 months"),
            Some("3-4 months"),
        ),
        entry(
            "Flour, white",
            "Pantry Staples",
            &["flour", "all purpose flour"],
            Some("6-12 months"),
            Some("1 year"),
            Some("6-8 months"),
        ),
        entry(
            "Sugar",
            "Pantry Staples",
            &["sugar", "granulated sugar", "brown sugar"],
            Some("18-24 months (never spoils)"),
            None,
            None,
        ),
        entry(
            "Rice, white",
            "Pantry Staples",
            &["rice", "white rice", "brown rice"],
            Some("2 years"),
            Some("6 months cooked"),
            Some("1 year"),
        ),
        entry(
            "Pasta, dry",
            "Pantry Staples",
            &["pasta", "spaghetti", "macaroni"],
            Some("2 years"),
            Some("1 year after opening"),
            None,
        ),
        // Meat & Poultry
        entry(
            "Chicken, raw",
            "Meat & Poultry",
            &["chicken", "chkn", "chicken breast", "chicken thighs"],
            Some("Not safe"),
            Some("1-2 days"),
            Some("1 year (whole), 9 months (parts)"),
        ),
        entry(
            "Beef, raw",
            "Meat & Poultry",
            &["beef", "steak"],
            Some("Not safe"),
            Some("3-5 days"),
            Some("6-12 months"),
        ),
        entry(
            "Ground meat",
            "Meat & Poultry",
            &["ground beef", "ground turkey", "hamburger"],
            Some("Not safe"),
            Some("1-2 days"),
            Some("3-4 months"),
        ),
        entry(
            "Bacon",
            "Meat & Poultry",
            &["bacon"],
            Some("Not safe"),
            Some("1 week"),
            Some("1 month"),
        ),
        entry(
            "Ham, fully cooked",
            "Meat & Poultry",
            &["ham", "deli ham"],
            Some("Not safe"),
            Some("1 week (whole), 3-5 days (slices)"),
            Some("1-2 months"),
        ),
        entry(
            "Hot dogs",
            "Meat & Poultry",
            &["hot dogs", "hotdogs", "wieners"],
            Some("Not safe"),
            Some("2 weeks sealed, 1 week opened"),
            Some("1-2 months"),
        ),
        entry(
            "Lunch meat",
            "Meat & Poultry",
            &["lunch meat", "deli meat", "turkey slices"],
            Some("Not safe"),
            Some("2 weeks sealed, 3-5 days opened"),
            Some("1-2 months"),
        ),
        // Produce
        entry(
            "Apples",
            "Produce",
            &["apples", "apple", "gala apples", "granny smith"],
            Some("3 weeks"),
            Some("4-6 weeks"),
            Some("8 months (cooked)"),
        ),
        entry(
            "Bananas",
            "Produce",
            &["bananas", "banana"],
            Some("Until ripe"),
            Some("3 days (skin will blacken)"),
            Some("2-3 months (whole peeled)"),
        ),
        entry(
            "Onion, fresh",
            "Produce",
            &["onion", "onions", "yellow onion", "ylw onion", "red onion"],
            Some("1 month (dry), 1-2 weeks (green)"),
            Some("2 months (dry), 1-2 weeks (green)"),
            Some("10-12 months"),
        ),
        entry(
            "Potatoes",
            "Produce",
            &["potatoes", "potato", "russet"],
            Some("1-2 months"),
            Some("1-2 weeks"),
            Some("10-12 months (cooked and mashed)"),
        ),
        entry(
            "Carrots",
            "Produce",
            &["carrots", "carrot", "baby carrots"],
            Some("1 day"),
            Some("2-3 weeks"),
            Some("10-12 months"),
        ),
        entry(
            "Tomatoes",
            "Produce",
            &["tomatoes", "tomato", "roma tomatoes"],
            Some("Until ripe"),
            Some("2-3 days"),
            Some("2 months"),
        ),
        entry(
            "Green Bell Pepper",
            "Produce",
            &["green bell pepper", "bell pepper", "grn bell ppr"],
            None,
            Some("1-2 weeks"),
            Some("10-12 months"),
        ),
        entry(
            "Blueberries",
            "Produce",
            &["blueberries", "bluberries", "blubry"],
            Some("Use quickly"),
            Some("7 days"),
            Some("1 year"),
        ),
        entry(
            "Lettuce",
            "Produce",
            &["lettuce", "romaine", "iceberg"],
            Some("Not recommended"),
            Some("1-2 weeks (iceberg), 3-7 days (leaf)"),
            None,
        ),
        // Condiments & Sauces
        entry(
            "Ketchup",
            "Condiments & Sauces",
            &["ketchup", "catsup"],
            Some("1 year unopened"),
            Some("6 months after opening"),
            None,
        ),
        entry(
            "Honey",
            "Condiments & Sauces",
            &["honey"],
            Some("2 years (never spoils)"),
            None,
            None,
        ),
    ]
}
