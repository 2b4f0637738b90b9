//! # Gate Checkpoint Crate
//!
//! Durable resume positions for ledger event streams.
//!
//! A checkpoint store remembers, per [`StreamIdentity`], the highest block
//! position whose delivery the consumer has acknowledged. After a crash or
//! restart the listener layer asks the store where to resume, so processing
//! continues without losing events.
//!
//! ## Adapters
//!
//! - [`InMemoryCheckpointStore`]: session-scoped; resume state dies with
//!   the process. Used by tests and short-lived tooling.
//! - [`FileCheckpointStore`]: JSON file rewritten atomically on every
//!   update; survives restart.
//!
//! [`StreamIdentity`]: gate_types::StreamIdentity

pub mod adapters;
pub mod domain;
pub mod ports;

pub use adapters::{FileCheckpointStore, InMemoryCheckpointStore};
pub use domain::entities::CheckpointRecord;
pub use domain::errors::CheckpointError;
pub use ports::outbound::CheckpointStore;
