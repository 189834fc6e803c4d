// Copyright 2025 Cowboy AI, LLC.

//! Environment helpers
//!
//! The environment is an open-ended JSON object threaded alongside the
//! input through a composition. Combinators never modify it at runtime:
//! every stage of a pipeline and every branch of a fan-out receives the
//! same document. The [`merge`] helper is for adapter layers assembling
//! an environment from several sources before invoking a composition.

use serde_json::{Map, Value};

/// The empty environment, used when a caller provides none.
pub fn empty() -> Value {
    Value::Object(Map::new())
}

/// Shallow merge of two environment objects, last value wins per key.
///
/// This mirrors how the environment requirements of composed stages add
/// up: later contributions override earlier ones on overlapping keys,
/// untouched keys survive. When either side is not an object the overlay
/// wins wholesale.
pub fn merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Object(mut base), Value::Object(overlay)) => {
            for (key, value) in overlay {
                base.insert(key, value);
            }
            Value::Object(base)
        }
        (_, overlay) => overlay,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn empty_is_an_object_with_no_keys() {
        assert_eq!(empty(), json!({}));
    }

    #[test]
    fn merge_is_shallow_and_last_wins() {
        let merged = merge(
            json!({"region": "us-east", "tenant": "acme"}),
            json!({"region": "eu-west", "locale": "de"}),
        );
        assert_eq!(
            merged,
            json!({"region": "eu-west", "tenant": "acme", "locale": "de"})
        );
    }

    #[test]
    fn merge_does_not_descend_into_nested_objects() {
        let merged = merge(
            json!({"auth": {"user": "u", "token": "t"}}),
            json!({"auth": {"user": "v"}}),
        );
        assert_eq!(merged, json!({"auth": {"user": "v"}}));
    }

    #[test]
    fn non_object_overlay_wins_wholesale() {
        assert_eq!(merge(json!({"a": 1}), json!(null)), json!(null));
        assert_eq!(merge(json!(null), json!({"a": 1})), json!({"a": 1}));
    }
}
