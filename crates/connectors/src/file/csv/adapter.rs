use crate::file::csv::{error::FileError, settings::CsvSettings};
use std::{
    fs::File,
    path::{Path, PathBuf},
};
use tracing::debug;

/// A fully read CSV file: header row plus every data record.
#[derive(Debug, Clone)]
pub struct CsvAdapter {
    pub path: PathBuf,
    pub headers: Vec<String>,
    records: Vec<csv::StringRecord>,
}

impl CsvAdapter {
    pub fn open(path: impl AsRef<Path>, settings: CsvSettings) -> Result<Self, FileError> {
        let path = path.as_ref();
        let delimiter = u8::try_from(settings.delimiter).map_err(|_| {
            FileError::InvalidFormat(format!(
                "delimiter {:?} for {} is not a single-byte character",
                settings.delimiter,
                path.display()
            ))
        })?;

        let file = File::open(path).map_err(|e| FileError::from_io(path, e))?;
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(file);

        let headers: Vec<String> = reader
            .headers()
            .map_err(|e| FileError::from_csv(path, e))?
            .iter()
            .map(String::from)
            .collect();

        if headers.iter().all(|h| h.is_empty()) {
            return Err(FileError::InvalidFormat(format!(
                "{} has no header row",
                path.display()
            )));
        }

        let records = reader
            .records()
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| FileError::from_csv(path, e))?;

        debug!(
            path = %path.display(),
            columns = headers.len(),
            records = records.len(),
            "Read CSV file"
        );

        Ok(CsvAdapter {
            path: path.to_path_buf(),
            headers,
            records,
        })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn records(&self) -> &[csv::StringRecord] {
        &self.records
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h.eq_ignore_ascii_case(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn reads_headers_and_records() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("source.csv");
        fs::write(&path, "id, amount\n1, 10\n2,20\n").unwrap();

        let adapter = CsvAdapter::open(&path, CsvSettings::default()).unwrap();
        assert_eq!(adapter.headers(), ["id", "amount"]);
        assert_eq!(adapter.records().len(), 2);
        assert_eq!(adapter.records()[0].get(1), Some("10"));
        assert_eq!(adapter.column_index("AMOUNT"), Some(1));
    }

    #[test]
    fn honours_custom_delimiter() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("source.csv");
        fs::write(&path, "id;amount\n1;10\n").unwrap();

        let adapter = CsvAdapter::open(&path, CsvSettings::new(';')).unwrap();
        assert_eq!(adapter.headers(), ["id", "amount"]);
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempdir().unwrap();
        let err = CsvAdapter::open(dir.path().join("nope.csv"), CsvSettings::default())
            .unwrap_err();
        assert!(matches!(err, FileError::NotFound(_)));
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("source.csv");
        fs::write(&path, "id,amount\n1,10,extra\n").unwrap();

        let err = CsvAdapter::open(&path, CsvSettings::default()).unwrap_err();
        assert!(matches!(err, FileError::CsvError { .. }));
    }

    #[test]
    fn empty_file_has_no_header() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("source.csv");
        fs::write(&path, "").unwrap();

        let err = CsvAdapter::open(&path, CsvSettings::default()).unwrap_err();
        assert!(matches!(err, FileError::InvalidFormat(_)));
    }
}
