#[cfg(test)]
mod tests {
    use receipt_shelflife::errors::AppError;
    use receipt_shelflife::food_table::{load_food_table, FoodTable, ReferenceEntry, ShelfLife};
    use std::io::Write;

    fn entry(name: &str, category: &str, aliases: &[&str]) -> ReferenceEntry {
        ReferenceEntry {
            canonical_name: name.to_string(),
            aliases: aliases.iter().map(|a| a.to_string()).collect(),
            category: category.to_string(),
            shelf_life: ShelfLife::default(),
        }
    }

    #[test]
    fn test_builtin_table_covers_the_expected_staples() {
        let table = FoodTable::builtin();
        for alias in ["bread", "eggs", "pnt buttr", "milk", "folgers", "yellow onion"] {
            assert!(
                table.resolve_alias(alias).is_some(),
                "missing alias: {}",
                alias
            );
        }
    }

    #[test]
    fn test_conflicting_alias_fails_construction() {
        let entries = vec![
            entry("Milk", "Dairy & Eggs", &["milk"]),
            entry("Almond Milk", "Dairy & Eggs", &["milk"]),
        ];
        match FoodTable::new(entries) {
            Err(AppError::Table(msg)) => assert!(msg.contains("milk")),
            other => panic!("expected a table error, got {:?}", other),
        }
    }

    #[test]
    fn test_aliases_shared_within_one_entry_are_fine() {
        // The canonical name's normalized form may also be listed as an
        // alias without tripping the conflict check.
        let entries = vec![entry("Honey", "Condiments & Sauces", &["honey", "honey"])];
        let table = FoodTable::new(entries).unwrap();
        assert!(table.resolve_alias("HONEY").is_some());
    }

    #[test]
    fn test_queries_for_the_serving_layer() {
        let table = FoodTable::builtin();

        let found = table.entry("Bread, commercial").unwrap();
        assert_eq!(found.category, "Bakery");
        assert!(found.aliases.contains(&"bread".to_string()));

        assert!(table.entry("BREAD, COMMERCIAL").is_some()); // case-insensitive
        assert!(table.entry("Plutonium").is_none());

        let categories = table.categories();
        assert!(!categories.is_empty());
        assert!(categories.windows(2).all(|w| w[0] < w[1]));

        assert_eq!(table.entries().len(), table.len());
    }

    #[test]
    fn test_table_loads_from_a_json_file() {
        let entries = vec![
            entry("Bread, commercial", "Bakery", &["bread"]),
            entry("Eggs, fresh", "Dairy & Eggs", &["eggs"]),
        ];
        let json = serde_json::to_string_pretty(&entries).unwrap();

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();

        std::env::set_var("FOOD_TABLE_PATH", file.path());
        let table = load_food_table().unwrap();
        std::env::remove_var("FOOD_TABLE_PATH");

        assert_eq!(table.len(), 2);
        assert!(table.resolve_alias("bread").is_some());
        assert!(table.resolve_alias("pnt buttr").is_none()); // not the builtin
    }

    #[test]
    fn test_shelf_life_roundtrips_through_serde() {
        let shelf = ShelfLife {
            pantry: Some("2 years".to_string()),
            fridge: None,
            freezer: Some("1 year".to_string()),
        };
        let json = serde_json::to_string(&shelf).unwrap();
        assert!(!json.contains("fridge"));
        let back: ShelfLife = serde_json::from_str(&json).unwrap();
        assert_eq!(back, shelf);
    }
}
