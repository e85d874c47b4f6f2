//! Tolerant field resolution for loosely-structured server responses.
//!
//! The banking server does not name its fields consistently (`valid` vs
//! `isValid`, `accountId` vs `id`). Each tolerant field is resolved from an
//! ordered list of wire names; the first acceptable candidate wins.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};
use thiserror::Error;

/// Why a tolerant field could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    /// None of the candidate names carried a usable value.
    #[error("missing field `{0}`")]
    Missing(&'static str),
    /// A value was present but had the wrong shape.
    #[error("invalid value for `{field}`: {reason}")]
    Invalid {
        /// Wire name of the offending field
        field: &'static str,
        /// What was wrong with it
        reason: String,
    },
}

/// First candidate key whose value is present and not `null`.
pub(crate) fn first_present<'a>(
    object: &'a Map<String, Value>,
    keys: &[&'static str],
) -> Option<(&'static str, &'a Value)> {
    keys.iter()
        .find_map(|&key| object.get(key).filter(|v| !v.is_null()).map(|v| (key, v)))
}

/// First candidate key holding a non-empty string.
pub(crate) fn first_non_empty_str<'a>(
    object: &'a Map<String, Value>,
    keys: &[&'static str],
) -> Option<&'a str> {
    keys.iter()
        .find_map(|&key| object.get(key).and_then(Value::as_str).filter(|s| !s.is_empty()))
}

/// A string field falling back to `default` when absent.
///
/// An explicit `null` is not absence: it is rejected like any other
/// non-string value.
pub(crate) fn string_or(
    object: &Map<String, Value>,
    key: &'static str,
    default: &str,
) -> Result<String, FieldError> {
    match object.get(key) {
        None => Ok(default.to_string()),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(other) => Err(FieldError::Invalid {
            field: key,
            reason: format!("expected a string, got {other}"),
        }),
    }
}

/// A decimal field falling back to zero when absent.
///
/// An explicit `null` is rejected, so it never reads as a real zero.
pub(crate) fn decimal_or_zero(
    object: &Map<String, Value>,
    key: &'static str,
) -> Result<Decimal, FieldError> {
    match object.get(key) {
        None => Ok(Decimal::ZERO),
        Some(value) => decimal_from_value(value).ok_or_else(|| FieldError::Invalid {
            field: key,
            reason: format!("expected a decimal, got {value}"),
        }),
    }
}

/// A boolean resolved from the first present candidate, `false` when absent.
pub(crate) fn bool_or_false(
    object: &Map<String, Value>,
    keys: &[&'static str],
) -> Result<bool, FieldError> {
    match first_present(object, keys) {
        None => Ok(false),
        Some((key, value)) => bool_from_value(value).ok_or_else(|| FieldError::Invalid {
            field: key,
            reason: format!("expected a boolean, got {value}"),
        }),
    }
}

/// Interpret a JSON number or numeric string as an exact decimal.
pub(crate) fn decimal_from_value(value: &Value) -> Option<Decimal> {
    let text = match value {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.trim().to_string(),
        _ => return None,
    };
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .ok()
}

/// Interpret a JSON bool, `0`/`1`, or boolean word.
pub(crate) fn bool_from_value(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => match n.as_u64() {
            Some(0) => Some(false),
            Some(1) => Some(true),
            _ => None,
        },
        Value::String(s) => parse_bool(s),
        _ => None,
    }
}

/// Parse the boolean words accepted in configuration and responses.
pub(crate) fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "t" | "yes" | "y" | "on" => Some(true),
        "0" | "false" | "f" | "no" | "n" | "off" => Some(false),
        _ => None,
    }
}

/// Epoch values with a larger magnitude than this are milliseconds.
const EPOCH_MILLIS_THRESHOLD: f64 = 2e10;

/// Parse a timestamp in any of the forms the server has been seen to send.
///
/// RFC 3339 with an offset is converted to UTC; a naive ISO-8601 timestamp
/// is taken to already be UTC; a bare date is midnight UTC. A number, or a
/// string holding one, is a unix epoch: seconds (fractions allowed), or
/// milliseconds once its magnitude passes 2e10.
pub(crate) fn timestamp_from_value(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => timestamp_from_str(s.trim()),
        Value::Number(n) => timestamp_from_epoch(n.as_f64()?),
        _ => None,
    }
}

fn timestamp_from_str(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    let naive = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok());
    if let Some(naive) = naive {
        return Some(naive.and_utc());
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
    }
    s.parse::<f64>().ok().and_then(timestamp_from_epoch)
}

fn timestamp_from_epoch(epoch: f64) -> Option<DateTime<Utc>> {
    if !epoch.is_finite() {
        return None;
    }
    let millis = if epoch.abs() > EPOCH_MILLIS_THRESHOLD {
        epoch
    } else {
        epoch * 1000.0
    };
    // float-to-int casts saturate; out-of-range values are rejected below
    DateTime::from_timestamp_millis(millis.round() as i64)
}

/// Serde adapter for optional timestamps in the tolerant forms above.
pub(crate) fn deserialize_timestamp<'de, D>(
    deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(value) => timestamp_from_value(&value)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {value}"))),
    }
}
