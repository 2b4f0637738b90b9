//! Shared test doubles and helpers.

use async_trait::async_trait;
use gate_checkpoint::{CheckpointError, CheckpointStore, InMemoryCheckpointStore};
use gate_types::{BlockNumber, StreamIdentity};
use std::sync::atomic::{AtomicBool, Ordering};

/// Install a fmt subscriber honoring `RUST_LOG`, once per process.
///
/// Call at the top of a test when its tracing output is wanted.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

/// Checkpoint store that can be told to refuse writes.
///
/// Reads keep serving whatever was last recorded, which is how a real
/// store with a full disk or revoked credentials behaves.
#[derive(Default)]
pub struct FailingCheckpointStore {
    inner: InMemoryCheckpointStore,
    fail_writes: AtomicBool,
}

impl FailingCheckpointStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl CheckpointStore for FailingCheckpointStore {
    async fn record_position(
        &self,
        identity: &StreamIdentity,
        position: BlockNumber,
    ) -> Result<(), CheckpointError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(CheckpointError::Io(std::io::Error::other(
                "store refused write",
            )));
        }
        self.inner.record_position(identity, position).await
    }

    async fn last_position(
        &self,
        identity: &StreamIdentity,
    ) -> Result<Option<BlockNumber>, CheckpointError> {
        self.inner.last_position(identity).await
    }
}
