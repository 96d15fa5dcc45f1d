use crate::file::csv::{adapter::CsvAdapter, error::FileError};
use model::{
    core::value::{FieldValue, Value},
    records::row::RowData,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Text,
    Date,
}

#[derive(Debug, Clone)]
pub struct CsvColumnMetadata {
    pub name: String,
    pub kind: ColumnKind,
    pub ordinal: usize,
}

#[derive(Debug, Clone)]
pub struct CsvMetadata {
    pub name: String,
    pub path: String,
    pub columns: Vec<CsvColumnMetadata>,
}

impl CsvMetadata {
    /// Maps the adapter's header row onto column roles, failing when a
    /// required column is absent.
    pub fn resolve(
        name: &str,
        adapter: &CsvAdapter,
        primary_key: Option<&str>,
        date_column: Option<&str>,
    ) -> Result<Self, FileError> {
        let path = adapter.path.display().to_string();

        for required in primary_key.iter().chain(date_column.iter()) {
            if adapter.column_index(required).is_none() {
                return Err(FileError::MissingColumn {
                    file: path,
                    column: required.to_string(),
                });
            }
        }

        let columns = adapter
            .headers()
            .iter()
            .enumerate()
            .map(|(ordinal, header)| {
                let is = |col: Option<&str>| col.is_some_and(|c| c.eq_ignore_ascii_case(header));
                CsvColumnMetadata {
                    name: header.clone(),
                    kind: if is(date_column) {
                        ColumnKind::Date
                    } else {
                        ColumnKind::Text
                    },
                    ordinal,
                }
            })
            .collect();

        Ok(CsvMetadata {
            name: name.to_string(),
            path,
            columns,
        })
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    /// Converts one raw record into a row, parsing the date column.
    pub fn row_from_record(&self, record: &csv::StringRecord) -> Result<RowData, FileError> {
        let mut fields = Vec::with_capacity(self.columns.len());

        for col in &self.columns {
            let cell = record.get(col.ordinal).unwrap_or("");
            let value = match col.kind {
                ColumnKind::Text => Value::text(cell),
                ColumnKind::Date => Value::parse_date(cell).ok_or_else(|| {
                    let line = record
                        .position()
                        .map(|p| p.line().to_string())
                        .unwrap_or_else(|| "?".to_string());
                    FileError::InvalidFormat(format!(
                        "{}: line {line}: column '{}' holds {cell:?}, expected a date (YYYY-MM-DD)",
                        self.path, col.name
                    ))
                })?,
            };
            fields.push(FieldValue::new(col.name.clone(), value));
        }

        Ok(RowData::new(fields))
    }
}
