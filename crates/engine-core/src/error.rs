use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StateStoreError {
    #[error("Checkpoint not found at {0}")]
    NotFound(String),

    #[error("Malformed checkpoint at {location}: {reason}")]
    Malformed { location: String, reason: String },

    #[error("Refusing to move checkpoint backwards from {current} to {requested}")]
    Regression {
        current: NaiveDate,
        requested: NaiveDate,
    },

    #[error("Checkpoint I/O error at {location}: {source}")]
    Io {
        location: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Checkpoint CSV error at {location}: {source}")]
    Csv {
        location: String,
        #[source]
        source: csv::Error,
    },

    #[error("State database error: {0}")]
    Sled(#[from] sled::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::Error),
}
