use crate::{
    error::PipelineError,
    report::{RowCounts, RunOutcome, RunReport},
};
use chrono::Utc;
use engine_core::{
    connectors::source::DataSource,
    events::sink::EventSink,
    state::{CheckpointStore, models::Checkpoint},
};
use engine_processing::{
    dedup::deduplicate,
    incremental::{select_incremental, watermark},
    merge::merge,
    validation::{validate_primary_key, validate_reconciliation, validate_row_count},
};
use model::{events::PipelineEvent, execution::state::RunState, records::table::Table};
use tracing::{debug, info_span};
use uuid::Uuid;

/// Loads both tables, source first.
pub fn load_tables(
    source: &DataSource,
    target: &DataSource,
) -> Result<(Table, Table), PipelineError> {
    let source = source.load().map_err(|e| PipelineError::io("source", e))?;
    let target = target.load().map_err(|e| PipelineError::io("target", e))?;
    Ok((source, target))
}

/// Which columns play which role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnRoles {
    pub primary_key: String,
    pub date_column: String,
    /// Deduplication order.
    pub order_column: String,
}

impl Default for ColumnRoles {
    fn default() -> Self {
        Self {
            primary_key: "id".to_string(),
            date_column: "created_date".to_string(),
            order_column: "created_date".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineOptions {
    /// Run every step and validation but leave the checkpoint alone.
    pub dry_run: bool,
}

/// Incremental load with validation gates.
///
/// A run either advances the checkpoint to the latest date of the new rows,
/// ends as a no-op when there are none, or aborts. On every path other than a
/// successful advance the checkpoint is left exactly as it was.
pub struct Pipeline {
    name: String,
    source: DataSource,
    target: DataSource,
    checkpoint: Box<dyn CheckpointStore>,
    columns: ColumnRoles,
    options: PipelineOptions,
}

/// Mutable bookkeeping of one run.
struct RunContext<'a> {
    run_id: String,
    sink: &'a mut dyn EventSink,
    state: RunState,
    rows: RowCounts,
}

impl RunContext<'_> {
    fn advance(&mut self, next: RunState) {
        debug_assert!(!self.state.is_terminal(), "run already ended in {}", self.state);
        debug!(from = %self.state, to = %next, "State transition");
        self.state = next;
    }

    fn emit(&mut self, event: PipelineEvent) {
        self.sink.emit(event);
    }
}

impl Pipeline {
    pub fn new(
        name: impl Into<String>,
        source: impl Into<DataSource>,
        target: impl Into<DataSource>,
        checkpoint: Box<dyn CheckpointStore>,
    ) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
            target: target.into(),
            checkpoint,
            columns: ColumnRoles::default(),
            options: PipelineOptions::default(),
        }
    }

    pub fn with_columns(mut self, columns: ColumnRoles) -> Self {
        self.columns = columns;
        self
    }

    pub fn with_options(mut self, options: PipelineOptions) -> Self {
        self.options = options;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &ColumnRoles {
        &self.columns
    }

    pub fn checkpoint_store(&self) -> &dyn CheckpointStore {
        self.checkpoint.as_ref()
    }

    /// Runs the pipeline once. `sink` receives `RunStarted` first, then one
    /// event per stage, then `RunCompleted` or `RunFailed`, and is flushed
    /// exactly once before this returns.
    pub fn run(&self, sink: &mut dyn EventSink) -> Result<RunReport, PipelineError> {
        let run_id = Uuid::new_v4().to_string();
        let span = info_span!("pipeline_run", %run_id, pipeline = %self.name);
        let _enter = span.enter();

        sink.emit(PipelineEvent::RunStarted {
            run_id: run_id.clone(),
            pipeline: self.name.clone(),
            at: Utc::now(),
        });

        let mut ctx = RunContext {
            run_id,
            sink,
            state: RunState::Init,
            rows: RowCounts::default(),
        };

        let result = self.execute(&mut ctx);

        let event = match &result {
            Ok(report) => PipelineEvent::RunCompleted {
                run_id: ctx.run_id.clone(),
                state: report.state,
                at: Utc::now(),
            },
            Err(err) => {
                let failed_after = ctx.state;
                ctx.advance(RunState::Aborted);
                PipelineEvent::RunFailed {
                    run_id: ctx.run_id.clone(),
                    failed_after,
                    kind: err.kind().to_string(),
                    error: err.to_string(),
                    at: Utc::now(),
                }
            }
        };
        ctx.emit(event);
        ctx.sink.flush();

        result
    }

    fn execute(&self, ctx: &mut RunContext<'_>) -> Result<RunReport, PipelineError> {
        let cols = &self.columns;

        let (source, target) = load_tables(&self.source, &self.target)?;
        ctx.rows.source = source.len();
        ctx.rows.target = target.len();
        ctx.emit(PipelineEvent::TablesLoaded {
            source: self.source.to_string(),
            source_rows: source.len(),
            target: self.target.to_string(),
            target_rows: target.len(),
        });

        let current = self
            .checkpoint
            .read()
            .map_err(|e| PipelineError::io("checkpoint", e))?;
        ctx.emit(PipelineEvent::CheckpointRead {
            location: self.checkpoint.location(),
            last_run_date: current.last_run_date,
        });
        ctx.advance(RunState::Loaded);

        validate_row_count(&source, &target).into_result()?;
        ctx.emit(PipelineEvent::RowCountChecked {
            source_rows: source.len(),
            target_rows: target.len(),
        });

        let delta = select_incremental(&source, &current, &cols.date_column)?;
        ctx.rows.delta = delta.len();
        ctx.emit(PipelineEvent::DeltaSelected {
            since: current.last_run_date,
            rows: delta.len(),
        });

        if delta.is_empty() {
            ctx.emit(PipelineEvent::NoNewData {
                since: current.last_run_date,
            });
            ctx.advance(RunState::NoOp);
            return Ok(self.report(
                ctx,
                RunOutcome::NoOp {
                    checkpoint: current.last_run_date,
                },
            ));
        }

        let delta = deduplicate(&delta, &cols.primary_key, &cols.order_column)?;
        ctx.rows.deduplicated = delta.len();
        ctx.emit(PipelineEvent::Deduplicated {
            before: ctx.rows.delta,
            after: delta.len(),
        });
        ctx.advance(RunState::DeltaSelected);

        validate_primary_key(&delta, &cols.primary_key).into_result()?;
        ctx.emit(PipelineEvent::PrimaryKeyValidated {
            table: delta.name.clone(),
            column: cols.primary_key.clone(),
            rows: delta.len(),
        });
        ctx.advance(RunState::DeltaValidated);

        let merged = merge(&target, &delta);
        ctx.rows.merged = merged.len();
        ctx.emit(PipelineEvent::LoadSimulated {
            target_rows: target.len(),
            delta_rows: delta.len(),
            merged_rows: merged.len(),
        });
        ctx.advance(RunState::Merged);

        validate_reconciliation(&delta, &merged, &cols.primary_key).into_result()?;
        ctx.emit(PipelineEvent::Reconciled { keys: delta.len() });
        ctx.advance(RunState::Reconciled);

        let next = Checkpoint::new(watermark(&delta, &cols.date_column)?);

        if self.options.dry_run {
            ctx.emit(PipelineEvent::CheckpointWriteSkipped {
                current: current.last_run_date,
                would_advance_to: next.last_run_date,
            });
            return Ok(self.report(
                ctx,
                RunOutcome::DryRun {
                    from: current.last_run_date,
                    would_advance_to: next.last_run_date,
                },
            ));
        }

        self.checkpoint
            .advance(&current, &next)
            .map_err(|source| PipelineError::CheckpointWriteFailure {
                checkpoint: next,
                source,
            })?;
        ctx.emit(PipelineEvent::CheckpointAdvanced {
            from: current.last_run_date,
            to: next.last_run_date,
        });
        ctx.advance(RunState::CheckpointAdvanced);

        Ok(self.report(
            ctx,
            RunOutcome::Advanced {
                from: current.last_run_date,
                to: next.last_run_date,
            },
        ))
    }

    fn report(&self, ctx: &RunContext<'_>, outcome: RunOutcome) -> RunReport {
        RunReport {
            run_id: ctx.run_id.clone(),
            pipeline: self.name.clone(),
            state: ctx.state,
            outcome,
            rows: ctx.rows.clone(),
        }
    }
}
