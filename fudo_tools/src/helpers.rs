//! Forgiving serde helpers for Fudo documents.
//!
//! Fudo is not strict about attribute types (ids arrive as strings or numbers, totals occasionally as strings), and a
//! single odd attribute must not throw away a whole page of sales.
use serde::{de::DeserializeOwned, Deserialize, Deserializer};
use serde_json::Value;

/// Strings pass through, numbers and booleans are stringified. Anything else becomes `None`.
pub fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Numbers pass through, strings are parsed as decimals. Anything else becomes `None`.
pub fn value_to_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

pub fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(value_to_string(&value).filter(|s| !s.trim().is_empty()))
}

pub fn lenient_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(value_to_f64(&value))
}

pub fn lenient_i64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(value_to_f64(&value).filter(|v| v.fract() == 0.0).map(|v| v as i64))
}

/// Resource ids are required, but may be either a JSON string or a JSON number.
pub fn resource_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let value = Value::deserialize(deserializer)?;
    value_to_string(&value)
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| serde::de::Error::custom(format!("invalid resource id: {value}")))
}

/// Decodes an object into `T`, or returns `T::default()` if the value is null, not an object, or does not decode.
pub fn object_or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    if value.is_object() {
        Ok(serde_json::from_value(value).unwrap_or_default())
    } else {
        Ok(T::default())
    }
}
