//! Field-level deserializers for backend payloads whose types drift between
//! endpoints (numbers sent as strings, enums sent as numbers, nulls).

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

pub(crate) fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => None,
        Some(Value::String(text)) => Some(text),
        Some(other) => Some(other.to_string()),
    })
}

pub(crate) fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(number)) => number.as_f64(),
        Some(Value::String(text)) => text.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|number| number.is_finite()))
}

/// Integers, integral floats and numeric strings. Anything else is dropped.
pub(crate) fn lenient_id<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(number)) => number
            .as_i64()
            .or_else(|| number.as_f64().and_then(integral)),
        Some(Value::String(text)) => {
            let text = text.trim();
            text.parse::<i64>()
                .ok()
                .or_else(|| text.parse::<f64>().ok().and_then(integral))
        }
        _ => None,
    })
}

fn integral(value: f64) -> Option<i64> {
    let in_range = value.is_finite() && value.fract() == 0.0 && value.abs() < i64::MAX as f64;
    in_range.then_some(value as i64)
}

/// Booleans, `0`/`1`, and `"true"`/`"false"` in any case.
pub(crate) fn lenient_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Bool(flag)) => Some(flag),
        Some(Value::Number(number)) => match number.as_f64() {
            Some(n) if n == 0.0 => Some(false),
            Some(n) if n == 1.0 => Some(true),
            _ => None,
        },
        Some(Value::String(text)) => match text.trim().to_ascii_lowercase().as_str() {
            "true" | "1" => Some(true),
            "false" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    })
}

pub(crate) fn optional_timestamp<'de, D>(
    deserializer: D,
) -> Result<Option<NaiveDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(match raw {
        Some(Value::String(text)) => parse_timestamp(&text),
        _ => None,
    })
}

/// Accepts RFC 3339, naive ISO datetimes (the backend's default), and bare dates.
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.naive_utc());
    }

    if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt);
    }

    if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S%.f") {
        return Some(dt);
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0);
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Row {
        #[serde(default, deserialize_with = "lenient_text")]
        label: Option<String>,
        #[serde(default, deserialize_with = "lenient_number")]
        rate: Option<f64>,
        #[serde(default, deserialize_with = "lenient_id")]
        id: Option<i64>,
        #[serde(default, deserialize_with = "lenient_bool")]
        flag: Option<bool>,
        #[serde(default, deserialize_with = "optional_timestamp")]
        at: Option<NaiveDateTime>,
    }

    fn row(json: &str) -> Row {
        serde_json::from_str(json).expect("lenient fields never fail")
    }

    #[test]
    fn text_accepts_numbers_and_nulls() {
        let row: Row = serde_json::from_str(r#"{"label": 3, "rate": null}"#).expect("parse");
        assert_eq!(row.label.as_deref(), Some("3"));
        assert!(row.rate.is_none());

        let row: Row = serde_json::from_str(r#"{}"#).expect("parse");
        assert!(row.label.is_none());
    }

    #[test]
    fn number_accepts_numeric_strings() {
        let row: Row = serde_json::from_str(r#"{"rate": "0.85"}"#).expect("parse");
        assert_eq!(row.rate, Some(0.85));

        let row: Row = serde_json::from_str(r#"{"rate": "high"}"#).expect("parse");
        assert!(row.rate.is_none());
    }

    #[test]
    fn ids_accept_integral_floats_and_numeric_strings() {
        assert_eq!(row(r#"{"id": 9}"#).id, Some(9));
        assert_eq!(row(r#"{"id": "9"}"#).id, Some(9));
        assert_eq!(row(r#"{"id": 1.0}"#).id, Some(1));
        assert_eq!(row(r#"{"id": " 12.0 "}"#).id, Some(12));
        assert_eq!(row(r#"{"id": 1.5}"#).id, None);
        assert_eq!(row(r#"{"id": "abc"}"#).id, None);
        assert_eq!(row(r#"{"id": [1]}"#).id, None);
    }

    #[test]
    fn flags_accept_numbers_and_words() {
        assert_eq!(row(r#"{"flag": true}"#).flag, Some(true));
        assert_eq!(row(r#"{"flag": 1}"#).flag, Some(true));
        assert_eq!(row(r#"{"flag": 0}"#).flag, Some(false));
        assert_eq!(row(r#"{"flag": "FALSE"}"#).flag, Some(false));
        assert_eq!(row(r#"{"flag": 2}"#).flag, None);
        assert_eq!(row(r#"{"flag": "maybe"}"#).flag, None);
        assert_eq!(row(r#"{"flag": null}"#).flag, None);
    }

    #[test]
    fn non_string_timestamps_are_dropped() {
        assert!(row(r#"{"at": 1705312200}"#).at.is_none());
        assert!(row(r#"{"at": "2024-01-15"}"#).at.is_some());
    }

    #[test]
    fn timestamps_cover_backend_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(10, 30, 0)
            .unwrap();
        assert_eq!(parse_timestamp("2024-01-15T10:30:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-01-15T10:30:00Z"), Some(expected));
        assert_eq!(parse_timestamp("2024-01-15 10:30:00"), Some(expected));
        assert!(parse_timestamp("2024-01-15T10:30:00.123456").is_some());
        assert_eq!(
            parse_timestamp("2024-01-15"),
            NaiveDate::from_ymd_opt(2024, 1, 15).unwrap().and_hms_opt(0, 0, 0)
        );
        assert!(parse_timestamp("  ").is_none());
        assert!(parse_timestamp("yesterday").is_none());
    }
}
