use chrono::{DateTime, NaiveDateTime, Utc};
use serde::de::Error;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use uuid::Uuid;

/// Custom deserializer for record IDs that validates UUID format
pub fn deserialize_uuid<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;

    if s.is_empty() {
        return Err(Error::custom("ID cannot be empty"));
    }

    Uuid::parse_str(&s).map_err(|e| Error::custom(format!("invalid UUID format for ID: {}", e)))?;

    Ok(s)
}

/// Like [`deserialize_uuid`] but accepts `null`
pub fn deserialize_optional_uuid<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(s) => {
            Uuid::parse_str(&s)
                .map_err(|e| Error::custom(format!("invalid UUID format for ID: {}", e)))?;
            Ok(Some(s))
        }
    }
}

/// Custom deserializer for timestamps that accepts integers (ms), RFC3339 strings,
/// naive ISO-8601 strings (assumed UTC) and `null`
pub fn deserialize_optional_timestamp<'de, D>(
    deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    match value {
        Value::Null => Ok(None),
        Value::Number(n) => {
            // Assume it's a Unix timestamp in milliseconds
            let ms = n.as_i64().ok_or_else(|| Error::custom("invalid timestamp"))?;
            DateTime::from_timestamp_millis(ms)
                .map(Some)
                .ok_or_else(|| Error::custom("timestamp out of range"))
        }
        Value::String(s) => {
            if let Ok(ts) = s.parse::<DateTime<Utc>>() {
                return Ok(Some(ts));
            }
            s.parse::<NaiveDateTime>()
                .map(|naive| Some(naive.and_utc()))
                .map_err(|e| Error::custom(format!("invalid timestamp '{}': {}", s, e)))
        }
        _ => Err(Error::custom("timestamp must be a number or string")),
    }
}

/// Treat missing, `null`, empty and whitespace-only strings alike as absent
pub fn deserialize_blank_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let s = Option::<String>::deserialize(deserializer)?;
    Ok(s.filter(|s| !s.trim().is_empty()))
}

/// Version numbers are non-negative integers that fit in a `u32`
pub fn deserialize_version<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let n = value
        .as_u64()
        .ok_or_else(|| Error::custom(format!("version must be a non-negative integer, got {}", value)))?;
    u32::try_from(n).map_err(|_| Error::custom(format!("version {} out of range", n)))
}
