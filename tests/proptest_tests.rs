// SPDX-License-Identifier: MIT OR Apache-2.0

//! Property-based tests using proptest.
//!
//! These tests use property-based testing to verify that lookups, layering
//! and key handling behave correctly for arbitrary inputs.

use proptest::prelude::*;
use serde_json::{json, Value};
use tiercfg::adapters::MemoryStore;
use tiercfg::domain::{Case, ConfigKey, ConfigValue, KeyPipeline, KeyTransformSettings};
use tiercfg::ports::ConfigStore;

// Dotted keys without colons always become colon paths with the same segments
proptest! {
    #[test]
    fn test_dotted_keys_become_segments(parts in prop::collection::vec("[a-z]{1,8}", 1..5)) {
        let key = ConfigKey::from(parts.join("."));
        prop_assert_eq!(key.segments(), parts.iter().map(String::as_str).collect::<Vec<_>>());
    }
}

// The first layer defining a scalar key wins
proptest! {
    #[test]
    fn test_first_layer_wins(values in prop::collection::vec(any::<i64>(), 1..6)) {
        let mut store = MemoryStore::new();
        for (i, v) in values.iter().enumerate() {
            store.add_layer(&format!("layer{}", i), json!({"k": v})).unwrap();
        }
        prop_assert_eq!(store.get(&ConfigKey::from("k")), Some(json!(values[0])));
    }
}

// The memory tier always beats the layers
proptest! {
    #[test]
    fn test_set_beats_layers(layer in any::<i64>(), memory in any::<i64>()) {
        let mut store = MemoryStore::new();
        store.add_layer("defaults", json!({"a": {"b": layer}})).unwrap();
        store.set(&ConfigKey::from("a:b"), json!(memory));
        prop_assert_eq!(store.get(&ConfigKey::from("a:b")), Some(json!(memory)));
    }
}

// Objects from different layers merge; disjoint keys are all visible
proptest! {
    #[test]
    fn test_objects_merge_across_layers(
        upper in prop::collection::btree_map("[a-m]{1,4}", any::<u32>(), 0..6),
        lower in prop::collection::btree_map("[n-z]{1,4}", any::<u32>(), 0..6),
    ) {
        let mut store = MemoryStore::new();
        store.add_layer("upper", json!({"section": upper})).unwrap();
        store.add_layer("lower", json!({"section": lower})).unwrap();

        let merged = store.get(&ConfigKey::from("section")).unwrap_or(Value::Null);
        let object = merged.as_object().cloned().unwrap_or_default();
        prop_assert_eq!(object.len(), upper.len() + lower.len());
    }
}

// Snake and kebab normalization are stable once applied
proptest! {
    #[test]
    fn test_snake_and_kebab_normalization_are_stable(key in "[A-Za-z][A-Za-z_-]{0,20}") {
        for case in [Case::KebabCase, Case::SnakeCase] {
            let pipeline = KeyPipeline::from(&KeyTransformSettings {
                normalize: Some(case),
                ..Default::default()
            });
            let once = pipeline.apply_key(&key);
            prop_assert_eq!(pipeline.apply_key(&once), once.clone());
        }
    }
}

// camelCase normalization drops every word separator
proptest! {
    #[test]
    fn test_camel_case_drops_word_separators(key in "[A-Za-z][A-Za-z_-]{0,20}") {
        let pipeline = KeyPipeline::from(&KeyTransformSettings {
            normalize: Some(Case::CamelCase),
            ..Default::default()
        });
        let camel = pipeline.apply_key(&key);
        prop_assert!(!camel.is_empty());
        prop_assert!(!camel.contains('-') && !camel.contains('_'), "{} -> {}", key, camel);
    }
}

// Integer values read back through either spelling
proptest! {
    #[test]
    fn test_i64_from_number_or_string(n in any::<i64>()) {
        prop_assert_eq!(ConfigValue::new(json!(n)).as_i64("k").unwrap(), n);
        prop_assert_eq!(ConfigValue::new(json!(n.to_string())).as_i64("k").unwrap(), n);
    }
}

// Applying the pipeline never fails and keeps the rest key untouched
proptest! {
    #[test]
    fn test_pipeline_total(key in "\\PC*") {
        let pipeline = KeyPipeline::from(&KeyTransformSettings {
            ignore_prefix: vec!["APP_".to_string()],
            normalize: Some(Case::CamelCase),
            ..Default::default()
        });
        let _ = pipeline.apply_key(&key);
        prop_assert_eq!(pipeline.apply_key("_"), "_");
    }
}
