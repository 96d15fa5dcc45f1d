use crate::file::csv::{
    adapter::CsvAdapter, error::FileError, metadata::CsvMetadata, settings::CsvSettings,
};
use model::records::table::Table;
use std::path::{Path, PathBuf};
use tracing::info;

/// Loads one CSV file as a [`Table`].
#[derive(Debug, Clone)]
pub struct CsvTableReader {
    pub name: String,
    pub path: PathBuf,
    pub settings: CsvSettings,
    primary_key: Option<String>,
    date_column: Option<String>,
}

impl CsvTableReader {
    pub fn new(name: impl Into<String>, path: impl AsRef<Path>, settings: CsvSettings) -> Self {
        CsvTableReader {
            name: name.into(),
            path: path.as_ref().to_path_buf(),
            settings,
            primary_key: None,
            date_column: None,
        }
    }

    /// The header must contain this column.
    pub fn with_primary_key(mut self, column: impl Into<String>) -> Self {
        self.primary_key = Some(column.into());
        self
    }

    /// The header must contain this column and every cell in it must parse
    /// as a date.
    pub fn with_date_column(mut self, column: impl Into<String>) -> Self {
        self.date_column = Some(column.into());
        self
    }

    pub fn read(&self) -> Result<Table, FileError> {
        let adapter = CsvAdapter::open(&self.path, self.settings.clone())?;
        let meta = CsvMetadata::resolve(
            &self.name,
            &adapter,
            self.primary_key.as_deref(),
            self.date_column.as_deref(),
        )?;

        let rows = adapter
            .records()
            .iter()
            .map(|record| meta.row_from_record(record))
            .collect::<Result<Vec<_>, _>>()?;

        info!(
            table = %self.name,
            path = %self.path.display(),
            rows = rows.len(),
            "Loaded table"
        );

        Ok(Table::with_rows(&self.name, meta.column_names(), rows))
    }
}
