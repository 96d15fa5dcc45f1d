use connectors::file::csv::error::FileError;
use engine_core::{error::StateStoreError, state::models::Checkpoint};
use engine_processing::{error::ProcessingError, validation::ValidationFailure};
use model::core::key::{KeyValue, join_keys};
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Why an input could not be read.
#[derive(Debug, Error)]
pub enum InputError {
    #[error(transparent)]
    File(#[from] FileError),

    #[error(transparent)]
    Checkpoint(#[from] StateStoreError),
}

/// Errors that abort a pipeline run. Messages carry every offending key.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Failed to load {stage}: {source}")]
    Io {
        stage: String,
        #[source]
        source: InputError,
    },

    #[error(
        "Row count validation failed: target has {target_rows} rows, more than source's {source_rows}"
    )]
    RowCountViolation {
        source_rows: usize,
        target_rows: usize,
    },

    #[error("Primary key validation failed: duplicates found in {table} for column {column}: {}", join_keys(.duplicates))]
    PrimaryKeyViolation {
        table: String,
        column: String,
        duplicates: Vec<KeyValue>,
    },

    #[error("Source-target reconciliation failed: keys missing in target: {}", join_keys(.missing))]
    ReconciliationViolation { missing: Vec<KeyValue> },

    /// Every validation passed but the new checkpoint could not be stored.
    #[error("Failed to advance checkpoint to {checkpoint}: {source}")]
    CheckpointWriteFailure {
        checkpoint: Checkpoint,
        #[source]
        source: StateStoreError,
    },

    #[error("Invalid data: {0}")]
    InvalidData(#[from] ProcessingError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Io,
    RowCountViolation,
    PrimaryKeyViolation,
    ReconciliationViolation,
    CheckpointWriteFailure,
    InvalidData,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Io => "io",
            ErrorKind::RowCountViolation => "row_count_violation",
            ErrorKind::PrimaryKeyViolation => "primary_key_violation",
            ErrorKind::ReconciliationViolation => "reconciliation_violation",
            ErrorKind::CheckpointWriteFailure => "checkpoint_write_failure",
            ErrorKind::InvalidData => "invalid_data",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl PipelineError {
    pub fn io(stage: impl Into<String>, source: impl Into<InputError>) -> Self {
        PipelineError::Io {
            stage: stage.into(),
            source: source.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            PipelineError::Io { .. } => ErrorKind::Io,
            PipelineError::RowCountViolation { .. } => ErrorKind::RowCountViolation,
            PipelineError::PrimaryKeyViolation { .. } => ErrorKind::PrimaryKeyViolation,
            PipelineError::ReconciliationViolation { .. } => ErrorKind::ReconciliationViolation,
            PipelineError::CheckpointWriteFailure { .. } => ErrorKind::CheckpointWriteFailure,
            PipelineError::InvalidData(_) => ErrorKind::InvalidData,
        }
    }
}

impl From<ValidationFailure> for PipelineError {
    fn from(failure: ValidationFailure) -> Self {
        match failure {
            ValidationFailure::RowCount {
                source_rows,
                target_rows,
            } => PipelineError::RowCountViolation {
                source_rows,
                target_rows,
            },
            ValidationFailure::PrimaryKey {
                table,
                column,
                duplicates,
            } => PipelineError::PrimaryKeyViolation {
                table,
                column,
                duplicates,
            },
            ValidationFailure::Reconciliation { missing } => {
                PipelineError::ReconciliationViolation { missing }
            }
        }
    }
}
