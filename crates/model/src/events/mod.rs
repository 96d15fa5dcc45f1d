use crate::execution::state::RunState;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::fmt::Debug;

/// A trait for events emitted while a pipeline runs.
pub trait Event: Send + Sync + Debug + 'static {
    /// Returns a unique identifier for this event type.
    fn event_type(&self) -> &'static str;
}

/// Progress and outcome notifications of a single pipeline run, in the
/// order the orchestrator emits them.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum PipelineEvent {
    RunStarted {
        run_id: String,
        pipeline: String,
        at: DateTime<Utc>,
    },
    TablesLoaded {
        source: String,
        source_rows: usize,
        target: String,
        target_rows: usize,
    },
    CheckpointRead {
        location: String,
        last_run_date: NaiveDate,
    },
    RowCountChecked {
        source_rows: usize,
        target_rows: usize,
    },
    DeltaSelected {
        since: NaiveDate,
        rows: usize,
    },
    /// Nothing newer than the checkpoint; the run ends without changes.
    NoNewData {
        since: NaiveDate,
    },
    Deduplicated {
        before: usize,
        after: usize,
    },
    PrimaryKeyValidated {
        table: String,
        column: String,
        rows: usize,
    },
    LoadSimulated {
        target_rows: usize,
        delta_rows: usize,
        merged_rows: usize,
    },
    Reconciled {
        keys: usize,
    },
    /// Dry runs stop here instead of writing the checkpoint.
    CheckpointWriteSkipped {
        current: NaiveDate,
        would_advance_to: NaiveDate,
    },
    CheckpointAdvanced {
        from: NaiveDate,
        to: NaiveDate,
    },
    RunCompleted {
        run_id: String,
        state: RunState,
        at: DateTime<Utc>,
    },
    RunFailed {
        run_id: String,
        /// Last state reached before the run aborted.
        failed_after: RunState,
        kind: String,
        error: String,
        at: DateTime<Utc>,
    },
}

impl Event for PipelineEvent {
    fn event_type(&self) -> &'static str {
        match self {
            PipelineEvent::RunStarted { .. } => "run.started",
            PipelineEvent::TablesLoaded { .. } => "tables.loaded",
            PipelineEvent::CheckpointRead { .. } => "checkpoint.read",
            PipelineEvent::RowCountChecked { .. } => "validation.row_count",
            PipelineEvent::DeltaSelected { .. } => "delta.selected",
            PipelineEvent::NoNewData { .. } => "delta.empty",
            PipelineEvent::Deduplicated { .. } => "delta.deduplicated",
            PipelineEvent::PrimaryKeyValidated { .. } => "validation.primary_key",
            PipelineEvent::LoadSimulated { .. } => "load.simulated",
            PipelineEvent::Reconciled { .. } => "validation.reconciliation",
            PipelineEvent::CheckpointWriteSkipped { .. } => "checkpoint.skipped",
            PipelineEvent::CheckpointAdvanced { .. } => "checkpoint.advanced",
            PipelineEvent::RunCompleted { .. } => "run.completed",
            PipelineEvent::RunFailed { .. } => "run.failed",
        }
    }
}
