//! Field decoders that coerce the backend's loosely typed JSON.
//!
//! Use with `#[serde(default, deserialize_with = "...")]` so that missing
//! fields fall back to the type's default.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Identifier as a string; integers are rendered in decimal.
pub fn id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(raw) if !raw.trim().is_empty() => Ok(raw),
        Value::Number(number) => Ok(number.to_string()),
        other => Err(D::Error::custom(format!("invalid identifier: {other}"))),
    }
}

/// Non-negative counter such as `view_count` or `lessons_count`.
pub fn count<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(value) = decimal_value(Option::<Value>::deserialize(deserializer)?)
        .map_err(D::Error::custom)?
    else {
        return Ok(None);
    };

    if value < 0.0 || value.fract() != 0.0 || value > u64::MAX as f64 {
        return Err(D::Error::custom(format!(
            "count must be a non-negative integer, found {value}"
        )));
    }
    Ok(Some(value as u64))
}

/// Signed integer such as `order_index`.
pub fn integer<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(value) = decimal_value(Option::<Value>::deserialize(deserializer)?)
        .map_err(D::Error::custom)?
    else {
        return Ok(None);
    };

    if value.fract() != 0.0 || value < i64::MIN as f64 || value > i64::MAX as f64 {
        return Err(D::Error::custom(format!(
            "expected an integer, found {value}"
        )));
    }
    Ok(Some(value as i64))
}

/// Finite decimal such as `rating`.
pub fn decimal<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    decimal_value(Option::<Value>::deserialize(deserializer)?).map_err(D::Error::custom)
}

/// Boolean flag; accepts `0`/`1` and `"true"`/`"false"` spellings.
pub fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(false),
        Some(Value::Bool(value)) => Ok(value),
        Some(Value::Number(number)) => match number.as_i64() {
            Some(0) => Ok(false),
            Some(1) => Ok(true),
            _ => Err(D::Error::custom(format!("invalid flag: {number}"))),
        },
        Some(Value::String(raw)) => match raw.trim().to_ascii_lowercase().as_str() {
            "true" | "1" => Ok(true),
            "false" | "0" | "" => Ok(false),
            other => Err(D::Error::custom(format!("invalid flag: {other}"))),
        },
        Some(other) => Err(D::Error::custom(format!("invalid flag: {other}"))),
    }
}

/// Ordered tag list; `null` decodes to an empty list.
pub fn tags<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

fn decimal_value(value: Option<Value>) -> Result<Option<f64>, String> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(number)) => number
            .as_f64()
            .filter(|value| value.is_finite())
            .map(Some)
            .ok_or_else(|| format!("invalid number: {number}")),
        Some(Value::String(raw)) => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                return Ok(None);
            }
            trimmed
                .parse::<f64>()
                .ok()
                .filter(|value| value.is_finite())
                .map(Some)
                .ok_or_else(|| format!("invalid numeric string `{trimmed}`"))
        }
        Some(other) => Err(format!("expected a number, found {other}")),
    }
}

/// RFC 3339 timestamps; `null`, missing and empty strings become `None`.
///
/// A space in place of the `T` separator and bare dates (`2024-06-10`,
/// read as midnight UTC) are accepted as well.
pub mod timestamp {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};
    use time::OffsetDateTime;
    use time::format_description::well_known::Rfc3339;

    pub fn serialize<S>(value: &Option<OffsetDateTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(value) => {
                let formatted = value.format(&Rfc3339).map_err(serde::ser::Error::custom)?;
                serializer.serialize_some(&formatted)
            }
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<OffsetDateTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let Some(raw) = Option::<String>::deserialize(deserializer)? else {
            return Ok(None);
        };
        parse(&raw).map_err(D::Error::custom)
    }

    /// Parse one timestamp using the same rules as the serde decoder.
    pub fn parse(raw: &str) -> Result<Option<OffsetDateTime>, String> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }

        let normalized = if trimmed.len() == 10 {
            format!("{trimmed}T00:00:00Z")
        } else {
            trimmed.replacen(' ', "T", 1)
        };

        OffsetDateTime::parse(&normalized, &Rfc3339)
            .map(Some)
            .map_err(|err| format!("invalid timestamp `{trimmed}`: {err}"))
    }
}
