use crate::{core::key::KeyValue, records::row::RowData};
use std::slice;

/// An in-memory table. Row order is load order.
///
/// Every processing step returns a new `Table`; nothing in the pipeline
/// mutates a table it was handed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub name: String,
    pub columns: Vec<String>,
    pub rows: Vec<RowData>,
}

impl Table {
    pub fn new(name: impl Into<String>, columns: Vec<String>) -> Self {
        Table {
            name: name.into(),
            columns,
            rows: Vec::new(),
        }
    }

    pub fn with_rows(name: impl Into<String>, columns: Vec<String>, rows: Vec<RowData>) -> Self {
        Table {
            name: name.into(),
            columns,
            rows,
        }
    }

    /// Builds a table whose column list is taken from the first row.
    pub fn from_rows(name: impl Into<String>, rows: Vec<RowData>) -> Self {
        let columns = rows
            .first()
            .map(|r| r.column_names().map(String::from).collect())
            .unwrap_or_default();
        Table::with_rows(name, columns, rows)
    }

    /// A new table with the same column set and the given rows.
    pub fn derive(&self, name: impl Into<String>, rows: Vec<RowData>) -> Table {
        Table::with_rows(name, self.columns.clone(), rows)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> slice::Iter<'_, RowData> {
        self.rows.iter()
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c.eq_ignore_ascii_case(column))
    }

    /// Primary-key values in row order, duplicates included.
    pub fn keys<'a>(&'a self, pk_column: &'a str) -> impl Iterator<Item = KeyValue> + 'a {
        self.rows.iter().map(move |row| row.key(pk_column))
    }
}

impl<'a> IntoIterator for &'a Table {
    type Item = &'a RowData;
    type IntoIter = slice::Iter<'a, RowData>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}
