use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a pipeline run currently stands.
///
/// Successful runs walk `Init → Loaded → DeltaSelected → DeltaValidated →
/// Merged → Reconciled → CheckpointAdvanced`. `NoOp` ends a run that found
/// nothing newer than the checkpoint; `Aborted` ends a failed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    Init,
    Loaded,
    DeltaSelected,
    DeltaValidated,
    Merged,
    Reconciled,
    CheckpointAdvanced,
    NoOp,
    Aborted,
}

impl RunState {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunState::Init => "init",
            RunState::Loaded => "loaded",
            RunState::DeltaSelected => "delta_selected",
            RunState::DeltaValidated => "delta_validated",
            RunState::Merged => "merged",
            RunState::Reconciled => "reconciled",
            RunState::CheckpointAdvanced => "checkpoint_advanced",
            RunState::NoOp => "no_op",
            RunState::Aborted => "aborted",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RunState::CheckpointAdvanced | RunState::NoOp | RunState::Aborted
        )
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
