use crate::{
    error::StateStoreError,
    state::{CheckpointStore, models::Checkpoint},
};
use std::{
    fs::{self, File},
    io,
    path::{Path, PathBuf},
};
use tempfile::NamedTempFile;
use tracing::debug;

/// Checkpoint kept in a one-row, one-column control table
/// (`last_run_date`).
#[derive(Debug, Clone)]
pub struct CsvCheckpointStore {
    path: PathBuf,
}

impl CsvCheckpointStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_err(&self, source: io::Error) -> StateStoreError {
        StateStoreError::Io {
            location: self.location(),
            source,
        }
    }

    fn csv_err(&self, source: csv::Error) -> StateStoreError {
        StateStoreError::Csv {
            location: self.location(),
            source,
        }
    }

    fn malformed(&self, reason: impl Into<String>) -> StateStoreError {
        StateStoreError::Malformed {
            location: self.location(),
            reason: reason.into(),
        }
    }
}

impl CheckpointStore for CsvCheckpointStore {
    fn read(&self) -> Result<Checkpoint, StateStoreError> {
        let file = File::open(&self.path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => StateStoreError::NotFound(self.location()),
            _ => self.io_err(e),
        })?;

        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(file);

        let column = reader
            .headers()
            .map_err(|e| self.csv_err(e))?
            .iter()
            .position(|h| h == Checkpoint::COLUMN)
            .ok_or_else(|| self.malformed(format!("missing column '{}'", Checkpoint::COLUMN)))?;

        let mut records = reader.records();
        let row = records
            .next()
            .transpose()
            .map_err(|e| self.csv_err(e))?
            .ok_or_else(|| self.malformed("control table has no rows"))?;

        if records.next().is_some() {
            return Err(self.malformed("control table holds more than one row"));
        }

        let raw = row.get(column).unwrap_or("");
        Checkpoint::parse(raw)
            .ok_or_else(|| self.malformed(format!("cannot parse {raw:?} as a date")))
    }

    fn overwrite(&self, cp: &Checkpoint) -> Result<(), StateStoreError> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir).map_err(|e| self.io_err(e))?;

        // Written beside the control table so the final rename stays on one
        // filesystem and is atomic.
        let mut tmp = NamedTempFile::new_in(dir).map_err(|e| self.io_err(e))?;
        {
            let mut writer = csv::Writer::from_writer(tmp.as_file_mut());
            writer
                .write_record([Checkpoint::COLUMN])
                .map_err(|e| self.csv_err(e))?;
            writer
                .write_record([cp.to_string()])
                .map_err(|e| self.csv_err(e))?;
            writer.flush().map_err(|e| self.io_err(e))?;
        }
        tmp.as_file().sync_all().map_err(|e| self.io_err(e))?;
        tmp.persist(&self.path).map_err(|e| self.io_err(e.error))?;

        debug!(location = %self.location(), checkpoint = %cp, "Checkpoint written");
        Ok(())
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}
