//! # Checkpointing Cursor
//!
//! Couples event delivery to durable position writes.

use crate::domain::cursor::{EventCursor, EventListener};
use crate::domain::errors::ListenerError;
use async_trait::async_trait;
use gate_checkpoint::CheckpointStore;
use gate_types::{Positioned, StreamIdentity};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::warn;

/// Decorates a cursor so every delivered event is checkpointed first.
///
/// `pull` records the event's position under this cursor's identity
/// before handing the event out. When the write fails the event is
/// withheld: the caller sees [`ListenerError::CheckpointWriteFailed`] and
/// the stored position still names the previous event, so a listener
/// restarted against the same store resumes from there (at-least-once).
pub struct CheckpointingCursor<T> {
    inner: EventCursor<T>,
    store: Arc<dyn CheckpointStore>,
    identity: StreamIdentity,
    /// Serializes pull-and-record, so no two checkpoint writes for this
    /// cursor are ever in flight even if callers break the
    /// single-consumer rule.
    gate: Mutex<()>,
}

impl<T> CheckpointingCursor<T> {
    /// Wrap `inner` so its events are attributed to `identity` in `store`.
    #[must_use]
    pub fn new(
        inner: EventCursor<T>,
        store: Arc<dyn CheckpointStore>,
        identity: StreamIdentity,
    ) -> Self {
        Self {
            inner,
            store,
            identity,
            gate: Mutex::new(()),
        }
    }
}

#[async_trait]
impl<T: Positioned + Send + 'static> EventListener<T> for CheckpointingCursor<T> {
    async fn pull(&self) -> Result<T, ListenerError> {
        let _ordered = self.gate.lock().await;

        let event = self.inner.pull().await?;
        let position = event.position();
        if let Err(err) = self.store.record_position(&self.identity, position).await {
            warn!(
                identity = %self.identity,
                position,
                error = %err,
                "Checkpoint write failed, withholding event"
            );
            return Err(ListenerError::CheckpointWriteFailed(err));
        }
        Ok(event)
    }

    fn close(&self) -> Result<(), ListenerError> {
        self.inner.close()
    }
}
