//! # Value Objects
//!
//! Stream categories, start positions, and checkpoint identities.

use crate::entities::BlockNumber;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The four kinds of event streams a ledger connection can serve.
///
/// Listener names are namespaced per category, so the same name may be in
/// use under two categories at once without collision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StreamCategory {
    /// Application events emitted by contract transactions.
    LedgerEvents,
    /// Full committed blocks.
    Blocks,
    /// Reduced per-transaction views of committed blocks.
    FilteredBlocks,
    /// Full blocks with readable private data collections.
    BlocksWithPrivateData,
}

impl StreamCategory {
    /// All categories, in a fixed iteration order.
    pub const ALL: [StreamCategory; 4] = [
        StreamCategory::LedgerEvents,
        StreamCategory::Blocks,
        StreamCategory::FilteredBlocks,
        StreamCategory::BlocksWithPrivateData,
    ];
}

impl fmt::Display for StreamCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::LedgerEvents => "ledger-events",
            Self::Blocks => "blocks",
            Self::FilteredBlocks => "filtered-blocks",
            Self::BlocksWithPrivateData => "blocks-with-private-data",
        };
        f.write_str(name)
    }
}

/// Where a newly opened subscription should begin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum StartPosition {
    /// Deliver events starting with the next block to commit.
    #[default]
    NextCommit,
    /// Deliver events starting at the given block number.
    Block(BlockNumber),
}

/// Checkpoint attribution key for one logical stream.
///
/// Ledger event streams are keyed by originating contract so two contracts
/// never share a resume position. Block-shaped streams are keyed by their
/// category alone.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StreamIdentity(String);

impl StreamIdentity {
    /// Identity for the ledger event stream of the given contract.
    #[must_use]
    pub fn ledger_events(contract_name: &str) -> Self {
        Self(format!("ledger-events/{contract_name}"))
    }

    /// Identity for the full block stream.
    #[must_use]
    pub fn blocks() -> Self {
        Self("blocks".to_string())
    }

    /// Identity for the filtered block stream.
    #[must_use]
    pub fn filtered_blocks() -> Self {
        Self("filtered-blocks".to_string())
    }

    /// Identity for the private data block stream.
    #[must_use]
    pub fn blocks_with_private_data() -> Self {
        Self("blocks-with-private-data".to_string())
    }

    /// The identity as a plain string key.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StreamIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
