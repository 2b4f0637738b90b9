use crate::domain::entities::CheckpointRecord;
use crate::domain::errors::CheckpointError;
use crate::ports::outbound::CheckpointStore;
use async_trait::async_trait;
use gate_types::{BlockNumber, StreamIdentity};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::PathBuf;

/// File-backed checkpoint store.
///
/// Keeps the full identity map in memory and rewrites the backing JSON
/// file on every recorded position. Writes go to a temporary sibling file
/// which is synced and renamed over the original, so a crash mid-write
/// leaves the previous state intact rather than a torn file.
pub struct FileCheckpointStore {
    path: PathBuf,
    records: Mutex<HashMap<StreamIdentity, CheckpointRecord>>,
}

impl FileCheckpointStore {
    /// Open the store at `path`, loading any existing records.
    ///
    /// A missing file starts the store empty; the file is created by the
    /// first recorded position. A present but unreadable file is an error,
    /// never silently discarded state.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, CheckpointError> {
        let path = path.into();
        let records = match fs::read(&path) {
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(err) => return Err(CheckpointError::Io(err)),
        };
        Ok(Self {
            path,
            records: Mutex::new(records),
        })
    }

    /// The path of the backing file.
    #[must_use]
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    fn persist(
        &self,
        records: &HashMap<StreamIdentity, CheckpointRecord>,
    ) -> Result<(), CheckpointError> {
        let bytes = serde_json::to_vec_pretty(records)?;
        let tmp_path = self.path.with_extension("tmp");

        let mut tmp = fs::File::create(&tmp_path)?;
        tmp.write_all(&bytes)?;
        tmp.sync_all()?;
        drop(tmp);

        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }
}

#[async_trait]
impl CheckpointStore for FileCheckpointStore {
    async fn record_position(
        &self,
        identity: &StreamIdentity,
        position: BlockNumber,
    ) -> Result<(), CheckpointError> {
        // Lock held across the file rewrite so same-identity writes are
        // serialized and the file always reflects a complete map.
        let mut records = self.records.lock();
        records.insert(
            identity.clone(),
            CheckpointRecord::new(identity.clone(), position),
        );
        self.persist(&records)
    }

    async fn last_position(
        &self,
        identity: &StreamIdentity,
    ) -> Result<Option<BlockNumber>, CheckpointError> {
        Ok(self.records.lock().get(identity).map(|r| r.last_position))
    }
}
