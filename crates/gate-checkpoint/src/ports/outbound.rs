//! # Outbound Ports (Driven Ports)
//!
//! The persistence interface the checkpointing layer requires its host to
//! provide.

use crate::domain::errors::CheckpointError;
use async_trait::async_trait;
use gate_types::{BlockNumber, StreamIdentity};

/// Abstract interface for durable position storage.
///
/// One physical store may serve many stream identities at once; every
/// write is attributed to exactly one identity, and implementations
/// serialize conflicting writes to the same identity rather than assuming
/// callers never race.
///
/// Production: `FileCheckpointStore` (adapters/file.rs)
/// Testing: `InMemoryCheckpointStore` (adapters/memory.rs)
#[async_trait]
pub trait CheckpointStore: Send + Sync {
    /// Record that every event at or before `position` has been delivered
    /// for the given stream.
    ///
    /// Upserts: a later call for the same identity supersedes the earlier
    /// record. Recording the same position twice is harmless.
    async fn record_position(
        &self,
        identity: &StreamIdentity,
        position: BlockNumber,
    ) -> Result<(), CheckpointError>;

    /// The most recently recorded position for the given stream, if any.
    async fn last_position(
        &self,
        identity: &StreamIdentity,
    ) -> Result<Option<BlockNumber>, CheckpointError>;
}
