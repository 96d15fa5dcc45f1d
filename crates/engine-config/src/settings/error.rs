use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading or checking a pipeline configuration.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Failed to read configuration {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Every problem found, not just the first.
    #[error("Configuration validation failed: {}", .0.join("; "))]
    ValidationFailed(Vec<String>),
}
