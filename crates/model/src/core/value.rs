use crate::core::key::KeyValue;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Accepted layouts for date-typed cells, tried in order.
const TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];
const DATE_FORMAT: &str = "%Y-%m-%d";

/// A single cell. Only the configured date column is ever parsed; every
/// other cell is kept as the text it was loaded with.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Value {
    String(String),
    Date(NaiveDate),
    Timestamp(NaiveDateTime),
    Null,
}

impl Value {
    /// Parses a calendar date (`YYYY-MM-DD`) or a date with a time of day.
    pub fn parse_date(raw: &str) -> Option<Value> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }

        if let Ok(date) = NaiveDate::parse_from_str(raw, DATE_FORMAT) {
            return Some(Value::Date(date));
        }

        TIMESTAMP_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
            .map(Value::Timestamp)
    }

    /// Builds a text value, mapping the empty string to `Null`.
    pub fn text(raw: &str) -> Value {
        if raw.is_empty() {
            Value::Null
        } else {
            Value::String(raw.to_string())
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Calendar-day view of a temporal value. Timestamps are truncated.
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Value::Date(d) => Some(*d),
            Value::Timestamp(ts) => Some(ts.date()),
            _ => None,
        }
    }

    /// Full-precision view of a temporal value. A date counts as midnight.
    pub fn as_timestamp(&self) -> Option<NaiveDateTime> {
        match self {
            Value::Date(d) => Some(d.and_time(NaiveTime::MIN)),
            Value::Timestamp(ts) => Some(*ts),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Identity of this value when used as a primary key.
    pub fn key(&self) -> KeyValue {
        KeyValue::from(self)
    }
}

impl From<&str> for Value {
    fn from(raw: &str) -> Self {
        Value::text(raw)
    }
}

impl From<NaiveDate> for Value {
    fn from(date: NaiveDate) -> Self {
        Value::Date(date)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(v) => write!(f, "{v}"),
            Value::Date(v) => write!(f, "{v}"),
            Value::Timestamp(v) => write!(f, "{v}"),
            Value::Null => write!(f, "NULL"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct FieldValue {
    pub name: String,
    pub value: Value,
}

impl FieldValue {
    pub fn new(name: impl Into<String>, value: Value) -> Self {
        FieldValue {
            name: name.into(),
            value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parses_plain_dates() {
        assert_eq!(
            Value::parse_date("2024-01-03"),
            Some(Value::Date(date(2024, 1, 3)))
        );
        assert_eq!(
            Value::parse_date(" 2024-01-03 "),
            Some(Value::Date(date(2024, 1, 3)))
        );
    }

    #[test]
    fn parses_timestamps_with_either_separator() {
        let expected = date(2024, 1, 3).and_hms_opt(10, 30, 0).unwrap();
        assert_eq!(
            Value::parse_date("2024-01-03 10:30:00"),
            Some(Value::Timestamp(expected))
        );
        assert_eq!(
            Value::parse_date("2024-01-03T10:30:00"),
            Some(Value::Timestamp(expected))
        );
        assert_eq!(
            Value::parse_date("2024-01-03 10:30"),
            Some(Value::Timestamp(expected))
        );
    }

    #[test]
    fn rejects_garbage_and_empty_cells() {
        assert_eq!(Value::parse_date(""), None);
        assert_eq!(Value::parse_date("yesterday"), None);
        assert_eq!(Value::parse_date("2024-13-01"), None);
    }

    #[test]
    fn timestamps_truncate_to_their_day() {
        let ts = Value::parse_date("2024-01-03 23:59:59").unwrap();
        assert_eq!(ts.as_date(), Some(date(2024, 1, 3)));
    }

    #[test]
    fn empty_text_is_null() {
        assert!(Value::from("").is_null());
        assert_eq!(Value::from("a").as_str(), Some("a"));
    }
}
