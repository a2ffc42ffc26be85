//! Canonical JSON: object keys sorted lexicographically, no whitespace.
//!
//! Protected headers are authenticated as their exact base64url text, so
//! the JSON they encode must not depend on map insertion order.

use serde_json::Value;

use crate::error::CryptoError;

/// Serialize `value` as canonical JSON.
pub fn canonical_json(value: &Value) -> Result<String, CryptoError> {
    match value {
        Value::Null | Value::Bool(_) | Value::String(_) => Ok(value.to_string()),
        Value::Number(n) => {
            if !n.as_f64().is_some_and(f64::is_finite) {
                return Err(CryptoError::NonFiniteNumber);
            }
            Ok(n.to_string())
        }
        Value::Array(arr) => {
            let items: Result<Vec<String>, _> = arr.iter().map(canonical_json).collect();
            Ok(format!("[{}]", items?.join(",")))
        }
        Value::Object(obj) => {
            let mut keys: Vec<&String> = obj.keys().collect();
            keys.sort();
            let pairs: Result<Vec<String>, CryptoError> = keys
                .into_iter()
                .map(|k| {
                    let v = canonical_json(&obj[k])?;
                    Ok(format!("{}:{}", Value::String(k.clone()), v))
                })
                .collect();
            Ok(format!("{{{}}}", pairs?.join(",")))
        }
    }
}
