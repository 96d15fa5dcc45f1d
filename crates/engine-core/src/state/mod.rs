use crate::{error::StateStoreError, state::models::Checkpoint};

pub mod csv_store;
pub mod models;
pub mod sled_store;

/// Persistence of the single "last successfully processed" watermark.
///
/// Implementations hold exactly one value. `overwrite` must replace it
/// atomically: after a crash the store holds either the old value or the
/// new one, never a partial write.
pub trait CheckpointStore {
    fn read(&self) -> Result<Checkpoint, StateStoreError>;

    /// Replaces the stored value without looking at the current one.
    fn overwrite(&self, cp: &Checkpoint) -> Result<(), StateStoreError>;

    fn location(&self) -> String;

    /// Replaces the stored value, refusing to move it backwards.
    fn write(&self, cp: &Checkpoint) -> Result<(), StateStoreError> {
        match self.read() {
            Ok(current) => ensure_forward(&current, cp)?,
            Err(StateStoreError::NotFound(_)) => {}
            Err(err) => return Err(err),
        }
        self.overwrite(cp)
    }

    /// Moves the stored value from `current`, which the caller already read,
    /// to `next`.
    fn advance(&self, current: &Checkpoint, next: &Checkpoint) -> Result<(), StateStoreError> {
        ensure_forward(current, next)?;
        self.overwrite(next)
    }
}

pub fn ensure_forward(current: &Checkpoint, next: &Checkpoint) -> Result<(), StateStoreError> {
    if next < current {
        return Err(StateStoreError::Regression {
            current: current.last_run_date,
            requested: next.last_run_date,
        });
    }
    Ok(())
}
