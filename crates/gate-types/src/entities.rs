//! # Core Domain Entities
//!
//! Defines the event payloads delivered by ledger event streams and the
//! identifiers they carry.
//!
//! ## Clusters
//!
//! - **Identifiers**: `BlockNumber`, `Hash`, `TransactionId`
//! - **Events**: `LedgerEvent`, `Block`, `FilteredBlock`,
//!   `BlockWithPrivateData`

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// =============================================================================
// CLUSTER A: IDENTIFIERS
// =============================================================================

/// A ledger block number.
///
/// Non-negative and monotonically non-decreasing along any one stream.
pub type BlockNumber = u64;

/// A 32-byte hash (block linkage and data digests).
pub type Hash = [u8; 32];

/// Unique identifier for a ledger transaction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct TransactionId(pub String);

impl TransactionId {
    /// Generate a random transaction id (uuid v4 in hyphen-free hex form).
    #[must_use]
    pub fn random() -> Self {
        Self(uuid::Uuid::new_v4().simple().to_string())
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// CLUSTER B: EVENT PAYLOADS
// =============================================================================

/// Validation verdict recorded for a transaction in a filtered block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionStatus {
    /// The transaction committed successfully.
    Valid,
    /// The transaction was rejected during validation.
    Invalid,
}

/// An application event emitted by a contract transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEvent {
    /// Block in which the emitting transaction committed.
    pub block_number: BlockNumber,
    /// The emitting transaction.
    pub transaction_id: TransactionId,
    /// Name of the contract that emitted the event.
    pub contract_name: String,
    /// Application-chosen event name.
    pub event_name: String,
    /// Opaque event payload.
    pub payload: Vec<u8>,
}

/// The header of a committed block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct BlockHeader {
    /// Block number in the chain.
    pub number: BlockNumber,
    /// Hash of the previous block header (creates the chain linkage).
    pub previous_hash: Hash,
    /// Hash over the block's data envelopes.
    pub data_hash: Hash,
}

/// A full committed block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Block {
    /// The block header.
    pub header: BlockHeader,
    /// Serialized transaction envelopes, in commit order.
    pub envelopes: Vec<Vec<u8>>,
}

/// One transaction's entry in a filtered block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilteredTransaction {
    /// The committed transaction.
    pub transaction_id: TransactionId,
    /// Its validation verdict.
    pub status: TransactionStatus,
}

/// A reduced view of a committed block: transaction ids and verdicts only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct FilteredBlock {
    /// Block number in the chain.
    pub block_number: BlockNumber,
    /// Per-transaction entries, in commit order.
    pub transactions: Vec<FilteredTransaction>,
}

/// A full block together with the private data collections readable by
/// this client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct BlockWithPrivateData {
    /// The committed block.
    pub block: Block,
    /// Private collection payloads keyed by transaction sequence number
    /// within the block.
    pub private_data: BTreeMap<u64, Vec<u8>>,
}

// =============================================================================
// CLUSTER C: POSITION EXTRACTION
// =============================================================================

/// Access to the ledger position an event was produced at.
///
/// This is the only per-payload surface the subscription layer needs;
/// cursors, checkpointing, and the registry treat the four event payloads
/// uniformly through it.
pub trait Positioned {
    /// The block number this event belongs to.
    fn position(&self) -> BlockNumber;
}

impl Positioned for LedgerEvent {
    fn position(&self) -> BlockNumber {
        self.block_number
    }
}

impl Positioned for Block {
    fn position(&self) -> BlockNumber {
        self.header.number
    }
}

impl Positioned for FilteredBlock {
    fn position(&self) -> BlockNumber {
        self.block_number
    }
}

impl Positioned for BlockWithPrivateData {
    fn position(&self) -> BlockNumber {
        self.block.header.number
    }
}
