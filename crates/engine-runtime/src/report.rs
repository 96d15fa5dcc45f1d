use chrono::NaiveDate;
use model::execution::state::RunState;
use serde::Serialize;

/// How a run left the checkpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RunOutcome {
    Advanced {
        from: NaiveDate,
        to: NaiveDate,
    },
    /// No new rows; the checkpoint was not touched.
    NoOp { checkpoint: NaiveDate },
    DryRun {
        from: NaiveDate,
        would_advance_to: NaiveDate,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RowCounts {
    pub source: usize,
    pub target: usize,
    pub delta: usize,
    pub deduplicated: usize,
    pub merged: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub run_id: String,
    pub pipeline: String,
    pub state: RunState,
    pub outcome: RunOutcome,
    pub rows: RowCounts,
}

impl RunReport {
    /// The checkpoint the next run will start from.
    pub fn checkpoint(&self) -> NaiveDate {
        match self.outcome {
            RunOutcome::Advanced { to, .. } => to,
            RunOutcome::NoOp { checkpoint } => checkpoint,
            RunOutcome::DryRun { from, .. } => from,
        }
    }
}
