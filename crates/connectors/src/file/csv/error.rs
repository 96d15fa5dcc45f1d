use std::{io, path::Path};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FileError {
    #[error("File not found: {0}")]
    NotFound(String),
    #[error("Permission denied: {0}")]
    PermissionDenied(String),
    #[error("Invalid file format: {0}")]
    InvalidFormat(String),
    #[error("Required column '{column}' is missing from {file}")]
    MissingColumn { file: String, column: String },
    #[error("I/O error reading {path}: {source}")]
    IoError {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("CSV parsing error in {path}: {source}")]
    CsvError {
        path: String,
        #[source]
        source: csv::Error,
    },
}

impl FileError {
    pub fn from_io(path: &Path, err: io::Error) -> Self {
        let path = path.display().to_string();
        match err.kind() {
            io::ErrorKind::NotFound => FileError::NotFound(path),
            io::ErrorKind::PermissionDenied => FileError::PermissionDenied(path),
            _ => FileError::IoError { path, source: err },
        }
    }

    pub fn from_csv(path: &Path, err: csv::Error) -> Self {
        FileError::CsvError {
            path: path.display().to_string(),
            source: err,
        }
    }
}
