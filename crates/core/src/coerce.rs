//! Lenient serde field adapters for loosely-typed upstream JSON.
//!
//! Tracker and catalog payloads mix strings, numbers and nulls for the same
//! field. These adapters never fail on a wrong type; they map anything they
//! cannot interpret to `None` (or the type's default).

use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// String or number rendered as a string.
pub(crate) fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Integer, float (truncated) or numeric string.
pub(crate) fn value_to_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f as i64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>().ok().or_else(|| {
                s.parse::<f64>()
                    .ok()
                    .filter(|f| f.is_finite())
                    .map(|f| f as i64)
            })
        }
        _ => None,
    }
}

pub(crate) fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(value_to_string))
}

/// Empty and whitespace-only strings become `None`.
pub(crate) fn non_empty_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_string(deserializer)?.filter(|s| !s.trim().is_empty()))
}

pub(crate) fn string_or_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_string(deserializer)?.unwrap_or_default())
}

pub(crate) fn lenient_int<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(value_to_i64))
}

pub(crate) fn int_or_zero<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: TryFrom<i64> + Default,
{
    Ok(lenient_int(deserializer)?
        .and_then(|v| T::try_from(v).ok())
        .unwrap_or_default())
}

pub(crate) fn required_int<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    value_to_i64(&value)
        .ok_or_else(|| D::Error::custom(format!("expected an integer id, got {}", value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_value_to_i64() {
        assert_eq!(value_to_i64(&json!(7)), Some(7));
        assert_eq!(value_to_i64(&json!(7.9)), Some(7));
        assert_eq!(value_to_i64(&json!(" 12 ")), Some(12));
        assert_eq!(value_to_i64(&json!("3.0")), Some(3));
        assert_eq!(value_to_i64(&json!("bad")), None);
        assert_eq!(value_to_i64(&json!(null)), None);
        assert_eq!(value_to_i64(&json!([1])), None);
    }

    #[test]
    fn test_value_to_string() {
        assert_eq!(value_to_string(&json!("x")), Some("x".to_string()));
        assert_eq!(value_to_string(&json!(42)), Some("42".to_string()));
        assert_eq!(value_to_string(&json!(true)), None);
        assert_eq!(value_to_string(&json!({"a": 1})), None);
    }
}
