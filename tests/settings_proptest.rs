//! Property-based tests for the settings codec
//!
//! These tests verify that `settings_equal` ignores formatting and key order,
//! detects real differences, and that parse/render round trips are stable.

use azurerm_vm_extension::{parse_settings, render_settings, settings_equal};
use proptest::prelude::*;
use serde_json::{Map, Value};

/// Generate arbitrary JSON values (no floats, so equality is exact)
fn arb_value() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::from),
        "[a-zA-Z0-9 _./:-]{0,16}".prop_map(Value::String),
    ];
    leaf.prop_recursive(3, 32, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
            prop::collection::btree_map("[a-z]{1,8}", inner, 0..6)
                .prop_map(|m| Value::Object(m.into_iter().collect())),
        ]
    })
}

/// Generate a settings document (top level is always an object)
fn arb_document() -> impl Strategy<Value = Map<String, Value>> {
    prop::collection::btree_map("[a-z]{1,8}", arb_value(), 0..8)
        .prop_map(|m| m.into_iter().collect())
}

/// Render with keys in reverse order and loose whitespace
fn render_loosely(value: &Value) -> String {
    match value {
        Value::Object(map) => {
            let fields: Vec<String> = map
                .iter()
                .rev()
                .map(|(k, v)| format!("\n  {} :  {}", Value::String(k.clone()), render_loosely(v)))
                .collect();
            format!("{{ {} \n}}", fields.join(" ,"))
        }
        Value::Array(items) => {
            let items: Vec<String> = items.iter().map(render_loosely).collect();
            format!("[ {} ]", items.join(" , "))
        }
        other => other.to_string(),
    }
}

proptest! {
    #[test]
    fn test_formatting_and_key_order_are_ignored(document in arb_document()) {
        let compact = render_settings(&document).unwrap();
        let loose = render_loosely(&Value::Object(document));
        prop_assert!(settings_equal(&compact, &loose));
        prop_assert!(settings_equal(&loose, &compact));
    }

    #[test]
    fn test_added_key_is_a_difference(document in arb_document(), extra in arb_value()) {
        let mut changed = document.clone();
        changed.insert("__added__".to_string(), extra);
        let old = render_settings(&document).unwrap();
        let new = render_settings(&changed).unwrap();
        prop_assert!(!settings_equal(&old, &new));
    }

    #[test]
    fn test_changed_value_is_a_difference(document in arb_document(), key in "[a-z]{1,8}") {
        let mut changed = document.clone();
        let replaced = match document.get(&key) {
            Some(Value::String(s)) => Value::String(format!("{s}!")),
            _ => Value::String("replaced".to_string()),
        };
        changed.insert(key, replaced);
        let old = render_settings(&document).unwrap();
        let new = render_settings(&changed).unwrap();
        prop_assert!(!settings_equal(&old, &new));
    }

    #[test]
    fn test_malformed_side_is_never_equal(document in arb_document()) {
        let valid = render_settings(&document).unwrap();
        let truncated = &valid[..valid.len() - 1];
        prop_assert!(!settings_equal(&valid, truncated));
        prop_assert!(!settings_equal(truncated, &valid));
        prop_assert!(!settings_equal(truncated, truncated));
    }

    #[test]
    fn test_arbitrary_text_never_panics(old in ".{0,64}", new in ".{0,64}") {
        let _ = settings_equal(&old, &new);
    }

    #[test]
    fn test_render_parse_round_trip(document in arb_document()) {
        let text = render_loosely(&Value::Object(document));
        let parsed = parse_settings(&text).unwrap();
        let reparsed = parse_settings(&render_settings(&parsed).unwrap()).unwrap();
        prop_assert_eq!(reparsed, parsed);
    }
}
