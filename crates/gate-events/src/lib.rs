//! # Gate Events - Listener and Cursor Layer
//!
//! Pull-based consumption of ledger event streams with named listeners,
//! optional durable checkpointing, and deterministic teardown.
//!
//! ## Shape
//!
//! ```text
//! ┌────────────────────┐   listen / next / close   ┌──────────────────┐
//! │      Caller        │ ────────────────────────► │ ListenerRegistry │
//! └────────────────────┘                           └────────┬─────────┘
//!                                                           │ owns
//!                                            ┌──────────────┴──────────────┐
//!                                            ▼                             ▼
//!                                   ┌────────────────┐          ┌──────────────────┐
//!                                   │  EventCursor   │ ◄─wraps─ │ Checkpointing    │
//!                                   │  (one feed)    │          │ Cursor           │
//!                                   └───────┬────────┘          └────────┬─────────┘
//!                                           │ pulls                      │ records
//!                                           ▼                            ▼
//!                                   LedgerConnection            CheckpointStore
//! ```
//!
//! ## Guarantees
//!
//! - One cursor owns exactly one subscription; pulls deliver that
//!   subscription's events in ledger order.
//! - A checkpointing cursor persists the event's position before handing
//!   the event out; a failed write withholds the event (at-least-once).
//! - Closing a cursor is idempotent and promptly unblocks a pull that is
//!   already suspended.
//! - Registry shutdown closes every listener best-effort, then releases
//!   the connection exactly once.

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod adapters;
pub mod application;
pub mod domain;
pub mod ports;

// Re-export main types
pub use adapters::MockLedger;
pub use application::{ListenOptions, ListenerRegistry};
pub use domain::checkpointing::CheckpointingCursor;
pub use domain::cursor::{EventCursor, EventListener};
pub use domain::errors::{ListenerError, ShutdownError, ShutdownFailure};
pub use ports::outbound::{BoxEventStream, EventFeed, FeedCloser, LedgerConnection};

/// Maximum events buffered per feed before the producer is considered to
/// have overrun the consumer.
pub const DEFAULT_FEED_CAPACITY: usize = 1024;
