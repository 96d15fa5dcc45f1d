use crate::core::value::Value;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Primary-key identity of a record.
///
/// Keys compare by their canonical text so that the same id loaded from two
/// different files always matches, whatever the cell looked like.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyValue(String);

impl KeyValue {
    pub fn new(raw: impl Into<String>) -> Self {
        KeyValue(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&Value> for KeyValue {
    fn from(value: &Value) -> Self {
        KeyValue(value.to_string())
    }
}

impl From<&str> for KeyValue {
    fn from(raw: &str) -> Self {
        KeyValue::new(raw)
    }
}

impl fmt::Display for KeyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Renders a key set as `{a, b, c}`. Never truncates.
pub fn join_keys(keys: &[KeyValue]) -> String {
    let joined = keys
        .iter()
        .map(KeyValue::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    format!("{{{joined}}}")
}
