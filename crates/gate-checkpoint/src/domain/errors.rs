//! # Domain Errors
//!
//! Error types for checkpoint storage.
//!
//! ## Design Principles
//!
//! - A failed write must be loud: the listener layer withholds the event
//!   it could not attribute, so callers see every persistence fault.
//! - No panics in store logic (use Result instead).

use thiserror::Error;

/// Errors that can occur while reading or writing checkpoint state.
#[derive(Debug, Error)]
pub enum CheckpointError {
    /// Reading or writing the backing store failed.
    #[error("checkpoint store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// Encoding or decoding a checkpoint record failed.
    #[error("checkpoint record encoding failed: {0}")]
    Codec(#[from] serde_json::Error),
}
