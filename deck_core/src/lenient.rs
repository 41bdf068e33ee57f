//! Lenient number fields for request bodies.
//!
//! Form-backed clients send numbers as JSON numbers or as strings, and
//! counts sometimes as `4.0`. Use with
//! `#[serde(default, deserialize_with = "...")]`; `null` and an absent
//! field both read as `None` so the request layer can report them.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// A number, or a string holding one
pub(crate) fn optional_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(value) => {
            let parsed = match &value {
                Value::Number(n) => n.as_f64(),
                Value::String(s) => s.trim().parse::<f64>().ok(),
                _ => None,
            };
            parsed
                .map(Some)
                .ok_or_else(|| serde::de::Error::custom(format!("A valid number is required, got {value}")))
        }
    }
}

/// An integer, an integral float such as `4.0`, or a string holding either
pub(crate) fn optional_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(value) => {
            let parsed = match &value {
                Value::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(integral)),
                Value::String(s) => {
                    let s = s.trim();
                    s.parse::<i64>().ok().or_else(|| s.parse::<f64>().ok().and_then(integral))
                }
                _ => None,
            };
            parsed
                .map(Some)
                .ok_or_else(|| serde::de::Error::custom(format!("A valid integer is required, got {value}")))
        }
    }
}

fn integral(value: f64) -> Option<i64> {
    (value.is_finite() && value.fract() == 0.0).then_some(value as i64)
}
