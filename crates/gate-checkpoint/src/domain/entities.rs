//! # Checkpoint Domain Entities

use chrono::{DateTime, Utc};
use gate_types::{BlockNumber, StreamIdentity};
use serde::{Deserialize, Serialize};

/// The persisted resume state for one stream identity.
///
/// A record means every event at or before `last_position` has been
/// delivered to the consumer; resume strictly after it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckpointRecord {
    /// The stream this record belongs to.
    pub identity: StreamIdentity,
    /// Highest block position whose delivery has been acknowledged.
    pub last_position: BlockNumber,
    /// When the record was last written.
    pub updated_at: DateTime<Utc>,
}

impl CheckpointRecord {
    /// Create a record stamped with the current time.
    #[must_use]
    pub fn new(identity: StreamIdentity, last_position: BlockNumber) -> Self {
        Self {
            identity,
            last_position,
            updated_at: Utc::now(),
        }
    }
}
