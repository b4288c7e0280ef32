//! Serde helpers for secret-bearing fields.
//!
//! Invariants / assumptions:
//! - Secrets are wrapped in [`SecretString`] as soon as they are parsed.
//! - Deserialization errors are generic and never echo the field value.

use secrecy::SecretString;
use serde::{Deserialize, Deserializer};

/// Deserialize a required string field into a [`SecretString`].
pub fn secret_string<'de, D>(deserializer: D) -> Result<SecretString, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    Ok(SecretString::new(s.into()))
}

/// Deserialize a field of any JSON type into whether it holds a non-empty value.
///
/// The value itself is dropped immediately. `null`, `false`, `0`, `""`, `[]`
/// and `{}` are empty; everything else, including whitespace, is present.
pub fn non_empty_value<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Null => false,
        serde_json::Value::Bool(b) => b,
        serde_json::Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        serde_json::Value::String(s) => !s.is_empty(),
        serde_json::Value::Array(a) => !a.is_empty(),
        serde_json::Value::Object(o) => !o.is_empty(),
    })
}
