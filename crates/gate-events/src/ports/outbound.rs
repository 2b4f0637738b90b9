//! # Outbound Ports
//!
//! The connection surface the listener layer drives. Everything network
//! shaped lives behind [`LedgerConnection`]; the rest of the crate only
//! ever sees raw feeds.

use crate::domain::errors::ListenerError;
use async_trait::async_trait;
use gate_types::{Block, BlockWithPrivateData, FilteredBlock, LedgerEvent, StartPosition};
use std::pin::Pin;
use tokio_stream::Stream;

/// A boxed, sendable stream of events or stream faults.
pub type BoxEventStream<T> = Pin<Box<dyn Stream<Item = Result<T, ListenerError>> + Send>>;

/// Release hook for one subscription's server-side resources.
///
/// Runs at most once, when the owning cursor is first closed.
pub type FeedCloser = Box<dyn FnOnce() -> Result<(), ListenerError> + Send>;

/// One raw, closeable event sequence handed out by a connection.
///
/// The stream yields events in ledger order from the requested start
/// position, without duplication or gaps, until the subscription ends or
/// fails. The closer releases whatever the connection holds open for
/// this subscription.
pub struct EventFeed<T> {
    stream: BoxEventStream<T>,
    closer: FeedCloser,
}

impl<T> EventFeed<T> {
    /// A feed with an explicit release hook.
    pub fn new(stream: BoxEventStream<T>, closer: FeedCloser) -> Self {
        Self { stream, closer }
    }

    /// A feed whose release is a no-op (fully in-process sources).
    pub fn from_stream(stream: BoxEventStream<T>) -> Self {
        Self {
            stream,
            closer: Box::new(|| Ok(())),
        }
    }

    /// Split into the stream and its release hook.
    #[must_use]
    pub fn into_parts(self) -> (BoxEventStream<T>, FeedCloser) {
        (self.stream, self.closer)
    }
}

/// Ledger connection - outbound port.
///
/// One fresh subscription per call. Opening against a released or
/// unauthorized connection fails synchronously with
/// [`ListenerError::Connection`]; no feed is handed out in that case.
///
/// Production: a gRPC or websocket client supplied by the host.
/// Testing: `MockLedger` (adapters/mock_ledger.rs)
#[async_trait]
pub trait LedgerConnection: Send + Sync {
    /// Events emitted by the given contract, from `start` onward.
    async fn ledger_events(
        &self,
        contract_name: &str,
        start: StartPosition,
    ) -> Result<EventFeed<LedgerEvent>, ListenerError>;

    /// Full committed blocks, from `start` onward.
    async fn blocks(&self, start: StartPosition) -> Result<EventFeed<Block>, ListenerError>;

    /// Filtered views of committed blocks, from `start` onward.
    async fn filtered_blocks(
        &self,
        start: StartPosition,
    ) -> Result<EventFeed<FilteredBlock>, ListenerError>;

    /// Blocks with readable private data collections, from `start` onward.
    async fn blocks_with_private_data(
        &self,
        start: StartPosition,
    ) -> Result<EventFeed<BlockWithPrivateData>, ListenerError>;

    /// Release the connection itself.
    ///
    /// Called once by the registry after all listeners are closed.
    /// Subsequent subscription opens fail.
    fn close(&self) -> Result<(), ListenerError>;
}
