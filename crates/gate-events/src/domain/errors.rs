//! # Domain Errors
//!
//! Error taxonomy for listener operations.
//!
//! ## Design Principles
//!
//! - Every failure surfaces synchronously to the caller of the failing
//!   operation; nothing is swallowed.
//! - Registry shutdown is best-effort: it attempts every slot and
//!   collects all failures instead of stopping at the first.

use gate_checkpoint::CheckpointError;
use gate_types::StreamCategory;
use thiserror::Error;

/// Errors surfaced by listener and registry operations.
#[derive(Debug, Error)]
pub enum ListenerError {
    /// The operation referenced a name with no installed listener in
    /// this category.
    #[error("no {category} listener named '{name}'")]
    NoSuchListener {
        /// Category the lookup targeted.
        category: StreamCategory,
        /// The listener name that was absent.
        name: String,
    },

    /// The underlying subscription delivered everything it ever will.
    #[error("event stream ended")]
    StreamEnded,

    /// The underlying subscription failed (network or server fault).
    ///
    /// Not retried here; retry and backoff policy belongs to the caller
    /// or the connection collaborator.
    #[error("event stream failed: {0}")]
    StreamError(String),

    /// A pull was issued against, or was in flight during, a closed
    /// cursor.
    #[error("listener closed")]
    Closed,

    /// Checkpoint store access failed.
    ///
    /// On the pull path this means the consumed position could not be
    /// persisted and the event is withheld; at listener start it means
    /// the resume position could not be read.
    #[error("checkpoint write failed: {0}")]
    CheckpointWriteFailed(#[from] CheckpointError),

    /// Opening or releasing a subscription, or the connection itself,
    /// failed.
    #[error("connection failure: {0}")]
    Connection(String),
}

/// One failure inside a best-effort registry shutdown.
#[derive(Debug)]
pub enum ShutdownFailure {
    /// A listener's close reported an error.
    Listener {
        /// Category the listener belonged to.
        category: StreamCategory,
        /// The listener's name.
        name: String,
        /// The close failure.
        error: ListenerError,
    },
    /// Releasing the underlying connection reported an error.
    Connection {
        /// The release failure.
        error: ListenerError,
    },
}

/// Aggregated failures from a registry shutdown.
///
/// Shutdown still closed every slot it could; the failures listed here
/// are the slots (and possibly the connection release) that reported
/// errors along the way.
#[derive(Debug, Error)]
#[error("shutdown completed with {} failure(s)", failures.len())]
pub struct ShutdownError {
    /// Everything that failed, in the order it was attempted.
    pub failures: Vec<ShutdownFailure>,
}
