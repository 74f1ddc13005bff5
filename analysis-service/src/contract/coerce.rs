//! Generic field coercers.
//!
//! Every helper here is total: wrong types, missing values, and non-finite
//! numbers all fall back to the supplied default instead of erroring.

use serde_json::{Map, Value};

use super::result::{EnumField, RedFlag};
use super::template::DEFAULT_RED_FLAGS;

/// Candidate's nested composite as an owned map; wrong type reads as empty,
/// which hands every sub-field to its template default.
pub fn object(value: Option<&Value>) -> Map<String, Value> {
    match value {
        Some(Value::Object(map)) => map.clone(),
        _ => Map::new(),
    }
}

/// Trimmed, non-blank string or nothing.
pub fn trimmed(value: Option<&Value>) -> Option<String> {
    match value {
        Some(Value::String(s)) => {
            let t = s.trim();
            if t.is_empty() {
                None
            } else {
                Some(t.to_string())
            }
        }
        _ => None,
    }
}

/// Trimmed string with a default.
pub fn string_or(value: Option<&Value>, default: &str) -> String {
    trimmed(value).unwrap_or_else(|| default.to_string())
}

/// Boolean that is `false` only when explicitly `false`.
pub fn bool_or_true(value: Option<&Value>) -> bool {
    !matches!(value, Some(Value::Bool(false)))
}

pub fn bool_or_false(value: Option<&Value>) -> bool {
    matches!(value, Some(Value::Bool(true)))
}

/// Finite number (JSON number or numeric string) with a default.
pub fn finite_f64(value: Option<&Value>, default: f64) -> f64 {
    let parsed = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match parsed {
        Some(n) if n.is_finite() => n,
        _ => default,
    }
}

/// Bristol scale: an integer in 1..=7, anything else is null.
pub fn bristol_type(value: Option<&Value>) -> Option<i64> {
    let n = match value {
        Some(Value::Number(n)) => n.as_i64(),
        Some(Value::String(s)) => s.trim().parse::<i64>().ok(),
        _ => None,
    }?;
    (1..=7).contains(&n).then_some(n)
}

/// Enum coercion driven by the field's declared allow-list.
pub fn enum_field<T: EnumField>(value: Option<&Value>) -> T {
    value
        .and_then(Value::as_str)
        .and_then(|s| {
            T::ALLOWED
                .iter()
                .find(|(keyword, _)| *keyword == s)
                .map(|(_, v)| *v)
        })
        .unwrap_or(T::DEFAULT)
}

/// Candidate list as strings; non-arrays read as empty, scalar elements are
/// stringified, container elements become their JSON text.
pub fn string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                Value::Null => "null".to_string(),
                other => other.to_string(),
            })
            .collect(),
        _ => Vec::new(),
    }
}

/// Floor padding: extend `items` to at least `min` elements by cycling
/// through `defaults` in order. Never truncates, never mutates `defaults`.
pub fn ensure_min_items<T: Clone>(mut items: Vec<T>, min: usize, defaults: &[T]) -> Vec<T> {
    if defaults.is_empty() {
        return items;
    }
    let mut i = 0;
    while items.len() < min {
        items.push(defaults[i % defaults.len()].clone());
        i += 1;
    }
    items
}

/// Structured red-flag coercion: bare strings are promoted, malformed
/// objects defaulted field-by-field, then the list is floor-padded to `min`
/// with the canonical rotation.
pub fn red_flags(value: Option<&Value>, min: usize) -> Vec<RedFlag> {
    const GENERIC_DETAIL: &str = "如出现请及时就医或咨询医生。";

    let coerced = match value {
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => RedFlag {
                    title: s.clone(),
                    detail: GENERIC_DETAIL.to_string(),
                },
                Value::Object(map) => RedFlag {
                    title: string_or(map.get("title"), "需要警惕的情况"),
                    detail: trimmed(map.get("detail"))
                        .or_else(|| trimmed(map.get("why")))
                        .unwrap_or_else(|| GENERIC_DETAIL.to_string()),
                },
                _ => RedFlag {
                    title: "需要警惕的情况".to_string(),
                    detail: GENERIC_DETAIL.to_string(),
                },
            })
            .collect(),
        _ => Vec::new(),
    };

    ensure_min_items(coerced, min, &DEFAULT_RED_FLAGS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn ensure_min_items_cycles_defaults() {
        let out = ensure_min_items(Vec::<String>::new(), 5, &["a".into(), "b".into()]);
        assert_eq!(out, vec!["a", "b", "a", "b", "a"]);
    }

    #[test]
    fn ensure_min_items_keeps_existing_then_cycles() {
        let out = ensure_min_items(vec!["x".to_string()], 3, &["a".into(), "b".into()]);
        assert_eq!(out, vec!["x", "a", "b"]);
    }

    #[test]
    fn ensure_min_items_never_truncates() {
        let items: Vec<String> = vec!["1".into(), "2".into(), "3".into()];
        let out = ensure_min_items(items.clone(), 2, &["a".into()]);
        assert_eq!(out, items);
    }

    #[test]
    fn ensure_min_items_with_empty_defaults_is_a_noop() {
        let out = ensure_min_items(Vec::<String>::new(), 3, &[]);
        assert!(out.is_empty());
    }

    #[test]
    fn trimmed_rejects_blank_and_non_strings() {
        assert_eq!(trimmed(Some(&json!("  ok  "))), Some("ok".to_string()));
        assert_eq!(trimmed(Some(&json!("   "))), None);
        assert_eq!(trimmed(Some(&json!(42))), None);
        assert_eq!(trimmed(None), None);
    }

    #[test]
    fn finite_f64_accepts_numeric_strings_and_rejects_garbage() {
        assert_eq!(finite_f64(Some(&json!(7)), 50.0), 7.0);
        assert_eq!(finite_f64(Some(&json!("3.5")), 50.0), 3.5);
        assert_eq!(finite_f64(Some(&json!("soon")), 50.0), 50.0);
        assert_eq!(finite_f64(Some(&json!([1])), 50.0), 50.0);
    }

    #[test]
    fn bristol_type_bounds() {
        assert_eq!(bristol_type(Some(&json!(4))), Some(4));
        assert_eq!(bristol_type(Some(&json!("6"))), Some(6));
        assert_eq!(bristol_type(Some(&json!(0))), None);
        assert_eq!(bristol_type(Some(&json!(8))), None);
        assert_eq!(bristol_type(Some(&json!(null))), None);
    }

    #[test]
    fn enum_field_falls_back_to_default() {
        use crate::contract::result::{RiskLevel, TriState};
        let high: RiskLevel = enum_field(Some(&json!("high")));
        assert_eq!(high, RiskLevel::High);
        let bogus: RiskLevel = enum_field(Some(&json!("catastrophic")));
        assert_eq!(bogus, RiskLevel::Low);
        let blood: TriState = enum_field(Some(&json!(3)));
        assert_eq!(blood, TriState::None);
    }

    #[test]
    fn red_flags_promotes_strings_and_pads() {
        let out = red_flags(Some(&json!(["便血", {"title": "高热", "why": "警惕感染"}])), 5);
        assert_eq!(out.len(), 5);
        assert_eq!(out[0].title, "便血");
        assert_eq!(out[1].detail, "警惕感染");
        assert_eq!(out[2], DEFAULT_RED_FLAGS[0]);
        assert_eq!(out[4], DEFAULT_RED_FLAGS[2]);
    }
}
