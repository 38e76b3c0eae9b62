//! Conversion between plain JSON and Firestore's typed value encoding.
//!
//! Firestore wraps every value in a single-key object naming its type
//! (`{"stringValue": "x"}`, `{"arrayValue": {"values": [...]}}`, ...). Integers travel
//! as decimal strings.

use crate::traits::{Fields, StoreError, StoreResult};
use serde_json::{json, Map, Value};

pub fn encode_value(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                json!({ "integerValue": i.to_string() })
            } else if let Some(u) = n.as_u64() {
                json!({ "integerValue": u.to_string() })
            } else {
                json!({ "doubleValue": n.as_f64().unwrap_or_default() })
            }
        }
        Value::String(s) => json!({ "stringValue": s }),
        Value::Array(items) => {
            let values: Vec<Value> = items.iter().map(encode_value).collect();
            if values.is_empty() {
                json!({ "arrayValue": {} })
            } else {
                json!({ "arrayValue": { "values": values } })
            }
        }
        Value::Object(map) => json!({ "mapValue": { "fields": encode_fields(map) } }),
    }
}

/// Encode a document's fields into the `fields` object of a Firestore document
pub fn encode_fields(fields: &Fields) -> Value {
    let encoded: Map<String, Value> = fields
        .iter()
        .map(|(key, value)| (key.clone(), encode_value(value)))
        .collect();
    Value::Object(encoded)
}

pub fn decode_value(value: &Value) -> StoreResult<Value> {
    let object = value
        .as_object()
        .ok_or_else(|| StoreError::InvalidDocument(format!("expected typed value, got {}", value)))?;
    let (kind, inner) = object
        .iter()
        .next()
        .ok_or_else(|| StoreError::InvalidDocument("empty typed value".to_string()))?;

    match kind.as_str() {
        "nullValue" => Ok(Value::Null),
        "booleanValue" => Ok(Value::Bool(inner.as_bool().unwrap_or_default())),
        "integerValue" => {
            let parsed = match inner {
                Value::String(s) => s.parse::<i64>().map_err(|e| {
                    StoreError::InvalidDocument(format!("bad integerValue {}: {}", s, e))
                })?,
                other => other.as_i64().ok_or_else(|| {
                    StoreError::InvalidDocument(format!("bad integerValue {}", other))
                })?,
            };
            Ok(Value::from(parsed))
        }
        "doubleValue" => Ok(inner.clone()),
        "stringValue" | "timestampValue" | "referenceValue" | "bytesValue" => Ok(inner.clone()),
        "geoPointValue" => Ok(inner.clone()),
        "arrayValue" => {
            let values = match inner.get("values") {
                Some(Value::Array(items)) => items
                    .iter()
                    .map(decode_value)
                    .collect::<StoreResult<Vec<_>>>()?,
                _ => Vec::new(),
            };
            Ok(Value::Array(values))
        }
        "mapValue" => {
            let fields = match inner.get("fields") {
                Some(fields) => decode_fields(fields)?,
                None => Fields::new(),
            };
            Ok(Value::Object(fields))
        }
        other => Err(StoreError::InvalidDocument(format!(
            "unsupported value type {}",
            other
        ))),
    }
}

/// Decode the `fields` object of a Firestore document
pub fn decode_fields(fields: &Value) -> StoreResult<Fields> {
    let object = fields
        .as_object()
        .ok_or_else(|| StoreError::InvalidDocument("fields must be an object".to_string()))?;
    object
        .iter()
        .map(|(key, value)| Ok((key.clone(), decode_value(value)?)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_the_landing_document() {
        let fields = crate::to_fields(&json!({ "images": ["a.jpg", "b.jpg"] })).unwrap();
        assert_eq!(
            encode_fields(&fields),
            json!({
                "images": { "arrayValue": { "values": [
                    { "stringValue": "a.jpg" },
                    { "stringValue": "b.jpg" }
                ] } }
            })
        );
    }

    #[test]
    fn empty_arrays_have_no_values_key() {
        assert_eq!(encode_value(&json!([])), json!({ "arrayValue": {} }));
        assert_eq!(decode_value(&json!({ "arrayValue": {} })).unwrap(), json!([]));
    }

    #[test]
    fn decodes_nested_values() {
        let encoded = json!({
            "title": { "stringValue": "Mosvold Villa" },
            "floors": { "integerValue": "3" },
            "published": { "booleanValue": true },
            "meta": { "mapValue": { "fields": {
                "ratio": { "doubleValue": 1.5 },
                "tags": { "arrayValue": { "values": [ { "stringValue": "timber" } ] } }
            } } },
            "createdAt": { "timestampValue": "2024-03-01T12:00:00Z" }
        });
        let fields = decode_fields(&encoded).unwrap();
        assert_eq!(fields["title"], "Mosvold Villa");
        assert_eq!(fields["floors"], 3);
        assert_eq!(fields["published"], true);
        assert_eq!(fields["meta"]["ratio"], 1.5);
        assert_eq!(fields["meta"]["tags"][0], "timber");
        assert_eq!(fields["createdAt"], "2024-03-01T12:00:00Z");
    }

    #[test]
    fn rejects_unknown_value_types() {
        assert!(decode_value(&json!({ "vectorValue": {} })).is_err());
        assert!(decode_value(&json!("plain")).is_err());
    }
}
