//! Row extraction for responses of unknown shape.
//!
//! Many public APIs wrap their collection in an envelope object (`data`,
//! `products`, `items`). The rules below are applied in a fixed priority
//! order so the same payload always yields the same rows.

use serde_json::Value;

/// Envelope fields checked for a row array, highest priority first.
pub const ENVELOPE_KEYS: &[&str] = &["data", "products", "items"];

/// Extract the row collection from an arbitrary JSON payload.
///
/// First matching rule wins:
/// 1. `payload.data` is an array
/// 2. `payload.products` is an array
/// 3. `payload.items` is an array
/// 4. the payload itself is an array
/// 5. otherwise the payload becomes the single row (objects, scalars, null)
///
/// # Example
/// ```rust
/// use resttable_util::normalize_rows;
/// use serde_json::json;
///
/// assert_eq!(normalize_rows(json!({"items": [{"a": 1}]})), vec![json!({"a": 1})]);
/// assert_eq!(normalize_rows(json!(42)), vec![json!(42)]);
/// ```
pub fn normalize_rows(payload: Value) -> Vec<Value> {
    let payload = match payload {
        Value::Object(mut map) => {
            for key in ENVELOPE_KEYS {
                if matches!(map.get(*key), Some(Value::Array(_)))
                    && let Some(Value::Array(rows)) = map.remove(*key)
                {
                    return rows;
                }
            }
            Value::Object(map)
        }
        other => other,
    };

    match payload {
        Value::Array(rows) => rows,
        other => vec![other],
    }
}
