use crate::error::ProcessingError;
use chrono::NaiveDateTime;
use model::{
    core::{key::KeyValue, value::Value},
    records::{row::RowData, table::Table},
};
use std::collections::HashMap;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum OrderKey {
    Time(NaiveDateTime),
    Text(String),
}

impl OrderKey {
    fn of(value: &Value) -> Option<OrderKey> {
        match value {
            Value::Date(_) | Value::Timestamp(_) => value.as_timestamp().map(OrderKey::Time),
            Value::String(s) => Some(OrderKey::Text(s.clone())),
            Value::Null => None,
        }
    }

    fn same_kind(&self, other: &OrderKey) -> bool {
        matches!(
            (self, other),
            (OrderKey::Time(_), OrderKey::Time(_)) | (OrderKey::Text(_), OrderKey::Text(_))
        )
    }
}

fn order_keys(table: &Table, order_column: &str) -> Result<Vec<OrderKey>, ProcessingError> {
    let mut keys: Vec<OrderKey> = Vec::with_capacity(table.len());

    for (i, row) in table.iter().enumerate() {
        let value = row.get_value(order_column).unwrap_or(&Value::Null);
        let key = OrderKey::of(value)
            .filter(|k| keys.first().is_none_or(|first| first.same_kind(k)))
            .ok_or_else(|| ProcessingError::NotOrderable {
                table: table.name.clone(),
                row: i,
                column: order_column.to_string(),
                value: value.to_string(),
            })?;
        keys.push(key);
    }

    Ok(keys)
}

/// One record per primary key: the latest by `order_column`.
///
/// Rows are stably sorted ascending by `order_column` and the last row of
/// each key group wins, so ties go to the row that came later in the input.
/// The result stays in ascending `order_column` order.
pub fn deduplicate(
    table: &Table,
    pk_column: &str,
    order_column: &str,
) -> Result<Table, ProcessingError> {
    let order = order_keys(table, order_column)?;

    let mut sorted: Vec<(&OrderKey, &RowData)> = order.iter().zip(table.iter()).collect();
    sorted.sort_by(|a, b| a.0.cmp(b.0));

    let mut last: HashMap<KeyValue, usize> = HashMap::with_capacity(sorted.len());
    for (pos, (_, row)) in sorted.iter().enumerate() {
        last.insert(row.key(pk_column), pos);
    }

    let rows: Vec<RowData> = sorted
        .iter()
        .enumerate()
        .filter(|(pos, (_, row))| last.get(&row.key(pk_column)) == Some(pos))
        .map(|(_, (_, row))| (*row).clone())
        .collect();

    debug!(
        table = %table.name,
        before = table.len(),
        after = rows.len(),
        "Removed duplicate keys"
    );

    Ok(table.derive(table.name.clone(), rows))
}
