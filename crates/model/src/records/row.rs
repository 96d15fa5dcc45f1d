use crate::core::{
    key::KeyValue,
    value::{FieldValue, Value},
};
use serde::{Deserialize, Serialize};

/// One record: an ordered mapping from column name to value.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct RowData {
    pub field_values: Vec<FieldValue>,
}

impl RowData {
    pub fn new(field_values: Vec<FieldValue>) -> Self {
        RowData { field_values }
    }

    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, Value)>) -> Self {
        RowData {
            field_values: pairs
                .into_iter()
                .map(|(name, value)| FieldValue::new(name, value))
                .collect(),
        }
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.field_values
            .iter()
            .find(|f| f.name.eq_ignore_ascii_case(field))
    }

    pub fn get_value(&self, field: &str) -> Option<&Value> {
        self.get(field).map(|f| &f.value)
    }

    /// Key of this record under `pk_column`. A missing column keys as `NULL`.
    pub fn key(&self, pk_column: &str) -> KeyValue {
        self.get_value(pk_column)
            .map(KeyValue::from)
            .unwrap_or_else(|| Value::Null.key())
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.field_values.iter().map(|f| f.name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookups_ignore_ascii_case() {
        let row = RowData::from_pairs([("ID", Value::from("7")), ("amount", Value::from("10"))]);
        assert_eq!(row.get_value("id"), Some(&Value::from("7")));
        assert_eq!(row.key("Id"), KeyValue::new("7"));
    }

    #[test]
    fn missing_key_column_keys_as_null() {
        let row = RowData::from_pairs([("amount", Value::from("10"))]);
        assert_eq!(row.key("id"), KeyValue::new("NULL"));
    }
}
