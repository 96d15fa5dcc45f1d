use crate::{
    error::StateStoreError,
    state::{
        CheckpointStore, ensure_forward,
        models::{Checkpoint, CheckpointRecord},
    },
};
use sled::transaction::{ConflictableTransactionError, TransactionError};
use std::path::{Path, PathBuf};

/// Checkpoint kept in an embedded sled database, one key per pipeline.
pub struct SledCheckpointStore {
    db: sled::Db,
    path: PathBuf,
    key: String,
}

impl SledCheckpointStore {
    pub fn open(path: impl AsRef<Path>, pipeline: &str) -> Result<Self, StateStoreError> {
        let db = sled::open(path.as_ref())?;
        Ok(Self {
            db,
            path: path.as_ref().to_path_buf(),
            key: Self::chk_key(pipeline),
        })
    }

    /// Helper to generate consistent keys for checkpoints
    #[inline]
    fn chk_key(pipeline: &str) -> String {
        format!("chk:{pipeline}")
    }

    fn encode(cp: &Checkpoint) -> Result<Vec<u8>, StateStoreError> {
        let record = CheckpointRecord {
            checkpoint: *cp,
            updated_at: chrono::Utc::now(),
        };
        Ok(bincode::serialize(&record)?)
    }

    fn decode(&self, bytes: &[u8]) -> Result<Checkpoint, StateStoreError> {
        bincode::deserialize::<CheckpointRecord>(bytes)
            .map(|r| r.checkpoint)
            .map_err(|e| StateStoreError::Malformed {
                location: self.location(),
                reason: e.to_string(),
            })
    }
}

impl CheckpointStore for SledCheckpointStore {
    fn read(&self) -> Result<Checkpoint, StateStoreError> {
        match self.db.get(&self.key)? {
            Some(bytes) => self.decode(&bytes),
            None => Err(StateStoreError::NotFound(self.location())),
        }
    }

    fn overwrite(&self, cp: &Checkpoint) -> Result<(), StateStoreError> {
        self.db.insert(self.key.as_str(), Self::encode(cp)?)?;
        self.db.flush()?;
        Ok(())
    }

    fn location(&self) -> String {
        format!("sled:{}#{}", self.path.display(), self.key)
    }

    fn write(&self, cp: &Checkpoint) -> Result<(), StateStoreError> {
        let new_bytes = Self::encode(cp)?;

        // Check and set run in one transaction.
        let result = self.db.transaction::<_, (), StateStoreError>(|tx_db| {
            if let Some(existing_bytes) = tx_db.get(&self.key)? {
                let current = self
                    .decode(&existing_bytes)
                    .map_err(ConflictableTransactionError::Abort)?;
                ensure_forward(&current, cp).map_err(ConflictableTransactionError::Abort)?;
            }

            tx_db.insert(self.key.as_str(), new_bytes.as_slice())?;
            Ok(())
        });

        match result {
            Ok(()) => {}
            Err(TransactionError::Abort(e)) => return Err(e),
            Err(TransactionError::Storage(e)) => return Err(e.into()),
        }

        self.db.flush()?;
        Ok(())
    }
}
