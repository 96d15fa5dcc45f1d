use connectors::file::csv::{error::FileError, source::CsvTableReader};
use model::records::table::Table;
use std::fmt::Display;

/// Where a pipeline table comes from.
#[derive(Debug, Clone)]
pub enum DataSource {
    Csv(CsvTableReader),
    /// A table already held in memory, loaded as-is.
    Memory(Table),
}

impl DataSource {
    pub fn load(&self) -> Result<Table, FileError> {
        match self {
            DataSource::Csv(reader) => reader.read(),
            DataSource::Memory(table) => Ok(table.clone()),
        }
    }
}

impl Display for DataSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataSource::Csv(reader) => write!(f, "csv:{}", reader.path.display()),
            DataSource::Memory(table) => write!(f, "memory:{}", table.name),
        }
    }
}

impl From<Table> for DataSource {
    fn from(table: Table) -> Self {
        DataSource::Memory(table)
    }
}

impl From<CsvTableReader> for DataSource {
    fn from(reader: CsvTableReader) -> Self {
        DataSource::Csv(reader)
    }
}
