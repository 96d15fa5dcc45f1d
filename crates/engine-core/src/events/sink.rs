use model::events::{Event, PipelineEvent};
use tracing::{debug, error, info, warn};

/// Receives the events of a pipeline run.
///
/// The orchestrator owns the lifecycle: it emits `RunStarted` first and calls
/// [`EventSink::flush`] exactly once when the run ends, whatever the outcome.
pub trait EventSink {
    fn emit(&mut self, event: PipelineEvent);

    fn flush(&mut self) {}
}

/// Renders events as structured `tracing` records.
#[derive(Debug, Default)]
pub struct TracingSink {
    emitted: usize,
}

impl TracingSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl EventSink for TracingSink {
    fn emit(&mut self, event: PipelineEvent) {
        self.emitted += 1;
        let kind = event.event_type();

        match event {
            PipelineEvent::RunStarted {
                run_id, pipeline, ..
            } => {
                info!(event = kind, %run_id, %pipeline, "Starting ETL validation pipeline");
            }
            PipelineEvent::TablesLoaded {
                source,
                source_rows,
                target,
                target_rows,
            } => {
                info!(
                    event = kind,
                    %source,
                    source_rows,
                    %target,
                    target_rows,
                    "Loaded source and target data"
                );
            }
            PipelineEvent::CheckpointRead {
                location,
                last_run_date,
            } => {
                info!(event = kind, %location, %last_run_date, "Read last run date from checkpoint");
            }
            PipelineEvent::RowCountChecked {
                source_rows,
                target_rows,
            } => {
                info!(event = kind, source_rows, target_rows, "Row count validation passed");
            }
            PipelineEvent::DeltaSelected { since, rows } => {
                info!(event = kind, %since, rows, "Incremental record count: {rows}");
            }
            PipelineEvent::NoNewData { since } => {
                warn!(
                    event = kind,
                    %since,
                    "No incremental data found. Pipeline exiting gracefully."
                );
            }
            PipelineEvent::Deduplicated { before, after } => {
                info!(event = kind, before, after, "Deduplicated incremental data");
            }
            PipelineEvent::PrimaryKeyValidated {
                table,
                column,
                rows,
            } => {
                info!(event = kind, %table, %column, rows, "Primary key validation passed");
            }
            PipelineEvent::LoadSimulated {
                target_rows,
                delta_rows,
                merged_rows,
            } => {
                info!(
                    event = kind,
                    target_rows,
                    delta_rows,
                    merged_rows,
                    "Simulated load into target"
                );
            }
            PipelineEvent::Reconciled { keys } => {
                info!(event = kind, keys, "Post-load reconciliation passed");
            }
            PipelineEvent::CheckpointWriteSkipped {
                current,
                would_advance_to,
            } => {
                info!(
                    event = kind,
                    %current,
                    %would_advance_to,
                    "Dry run: checkpoint left unchanged"
                );
            }
            PipelineEvent::CheckpointAdvanced { from, to } => {
                info!(event = kind, %from, %to, "Updated checkpoint with new last run date");
            }
            PipelineEvent::RunCompleted { run_id, state, .. } => {
                info!(event = kind, %run_id, %state, "Pipeline completed successfully");
            }
            PipelineEvent::RunFailed {
                run_id,
                failed_after,
                kind: failure,
                error,
                ..
            } => {
                error!(
                    event = kind,
                    %run_id,
                    %failed_after,
                    failure = %failure,
                    "Pipeline failed: {error}"
                );
            }
        }
    }

    fn flush(&mut self) {
        debug!(events = self.emitted, "Event sink flushed");
        self.emitted = 0;
    }
}

/// Keeps every event in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub events: Vec<PipelineEvent>,
    pub flushes: usize,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn event_types(&self) -> Vec<&'static str> {
        self.events.iter().map(|e| e.event_type()).collect()
    }

    pub fn contains(&self, event_type: &str) -> bool {
        self.events.iter().any(|e| e.event_type() == event_type)
    }
}

impl EventSink for MemorySink {
    fn emit(&mut self, event: PipelineEvent) {
        self.events.push(event);
    }

    fn flush(&mut self) {
        self.flushes += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use model::execution::state::RunState;
    use tracing_test::traced_test;

    fn since() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 3).unwrap()
    }

    #[traced_test]
    #[test]
    fn no_new_data_is_a_warning() {
        let mut sink = TracingSink::new();
        sink.emit(PipelineEvent::NoNewData { since: since() });

        assert!(logs_contain("WARN"));
        assert!(logs_contain("No incremental data found"));
    }

    #[traced_test]
    #[test]
    fn failures_are_logged_with_full_detail() {
        let mut sink = TracingSink::new();
        sink.emit(PipelineEvent::RunFailed {
            run_id: "run-1".into(),
            failed_after: RunState::DeltaSelected,
            kind: "primary_key_violation".into(),
            error: "duplicates found in incremental_source for column id: {5, 9}".into(),
            at: Utc::now(),
        });

        assert!(logs_contain("ERROR"));
        assert!(logs_contain("Pipeline failed"));
        assert!(logs_contain("{5, 9}"));
    }

    #[test]
    fn memory_sink_records_in_order() {
        let mut sink = MemorySink::new();
        sink.emit(PipelineEvent::DeltaSelected {
            since: since(),
            rows: 0,
        });
        sink.emit(PipelineEvent::NoNewData { since: since() });
        sink.flush();

        assert_eq!(sink.event_types(), vec!["delta.selected", "delta.empty"]);
        assert!(sink.contains("delta.empty"));
        assert_eq!(sink.flushes, 1);
    }
}
