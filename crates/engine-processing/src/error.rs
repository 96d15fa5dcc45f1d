use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProcessingError {
    #[error("Row {row} of table '{table}': column '{column}' holds {value}, expected a date")]
    NotADate {
        table: String,
        row: usize,
        column: String,
        value: String,
    },

    #[error(
        "Row {row} of table '{table}': column '{column}' holds {value}, which cannot be ordered against the other rows"
    )]
    NotOrderable {
        table: String,
        row: usize,
        column: String,
        value: String,
    },

    #[error("Table '{0}' is empty")]
    EmptyTable(String),
}
