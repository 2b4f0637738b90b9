use crate::domain::entities::CheckpointRecord;
use crate::domain::errors::CheckpointError;
use crate::ports::outbound::CheckpointStore;
use async_trait::async_trait;
use gate_types::{BlockNumber, StreamIdentity};
use parking_lot::RwLock;
use std::collections::HashMap;

/// In-memory checkpoint store.
///
/// State is lost on drop, so a listener resumed against a fresh instance
/// starts from the live tip again. Suits tests and callers that want
/// resume state scoped to the process; durable deployments use
/// `FileCheckpointStore`.
#[derive(Default)]
pub struct InMemoryCheckpointStore {
    records: RwLock<HashMap<StreamIdentity, CheckpointRecord>>,
}

impl InMemoryCheckpointStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The full stored record for an identity, if one was written.
    #[must_use]
    pub fn record(&self, identity: &StreamIdentity) -> Option<CheckpointRecord> {
        self.records.read().get(identity).cloned()
    }

    /// Number of identities with a recorded position.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    /// True when no position has been recorded yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

#[async_trait]
impl CheckpointStore for InMemoryCheckpointStore {
    async fn record_position(
        &self,
        identity: &StreamIdentity,
        position: BlockNumber,
    ) -> Result<(), CheckpointError> {
        let mut records = self.records.write();
        records.insert(
            identity.clone(),
            CheckpointRecord::new(identity.clone(), position),
        );
        Ok(())
    }

    async fn last_position(
        &self,
        identity: &StreamIdentity,
    ) -> Result<Option<BlockNumber>, CheckpointError> {
        Ok(self.records.read().get(identity).map(|r| r.last_position))
    }
}
