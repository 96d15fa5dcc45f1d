use engine_config::settings::error::SettingsError;
use engine_core::error::StateStoreError;
use engine_runtime::error::{ErrorKind, PipelineError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    /// A pipeline run failed. Its event sink has already logged why.
    #[error(transparent)]
    Run(PipelineError),

    #[error("Failed to read checkpoint: {0}")]
    CheckpointRead(#[source] StateStoreError),

    #[error("Failed to write checkpoint: {0}")]
    CheckpointWrite(#[source] StateStoreError),

    #[error("Failed to write output: {0}")]
    Output(#[from] std::io::Error),

    #[error("Failed to serialize data to JSON: {0}")]
    JsonSerialize(#[from] serde_json::Error),
}

impl CliError {
    pub fn exit_code(&self) -> u8 {
        match self {
            CliError::Settings(_) | CliError::CheckpointRead(_) | CliError::Output(_) => 2,
            CliError::CheckpointWrite(_) => 6,
            CliError::JsonSerialize(_) => 1,
            CliError::Pipeline(err) | CliError::Run(err) => match err.kind() {
                ErrorKind::Io => 2,
                ErrorKind::RowCountViolation => 3,
                ErrorKind::PrimaryKeyViolation => 4,
                ErrorKind::ReconciliationViolation => 5,
                ErrorKind::CheckpointWriteFailure => 6,
                ErrorKind::InvalidData => 1,
            },
        }
    }

    /// Run failures were already logged by the run's event sink.
    pub fn already_logged(&self) -> bool {
        matches!(self, CliError::Run(_))
    }
}
