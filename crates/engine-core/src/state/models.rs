use chrono::{DateTime, NaiveDate, Utc};
use model::core::value::Value;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The persisted watermark: the latest `created_date` that a successful run
/// has processed.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Checkpoint {
    pub last_run_date: NaiveDate,
}

impl Checkpoint {
    /// Column name of the control table.
    pub const COLUMN: &'static str = "last_run_date";
    const FORMAT: &'static str = "%Y-%m-%d";

    pub fn new(last_run_date: NaiveDate) -> Self {
        Checkpoint { last_run_date }
    }

    /// Accepts a calendar date or a date with a time of day; the time is
    /// dropped.
    pub fn parse(raw: &str) -> Option<Self> {
        Value::parse_date(raw)
            .and_then(|v| v.as_date())
            .map(Checkpoint::new)
    }
}

impl fmt::Display for Checkpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.last_run_date.format(Self::FORMAT))
    }
}

/// Value stored by the sled backend.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct CheckpointRecord {
    pub checkpoint: Checkpoint,
    pub updated_at: DateTime<Utc>,
}
