//! # Listener Registry
//!
//! Named listeners over the four stream categories, with optional
//! checkpointing and deterministic teardown.
//!
//! One registry per logical session. It owns the connection and every
//! cursor it creates; no cursor outlives its registry, because
//! [`ListenerRegistry::close_all`] closes all of them unconditionally
//! before releasing the connection.

use crate::domain::checkpointing::CheckpointingCursor;
use crate::domain::cursor::{EventCursor, EventListener};
use crate::domain::errors::{ListenerError, ShutdownError, ShutdownFailure};
use crate::ports::outbound::{EventFeed, LedgerConnection};
use dashmap::DashMap;
use gate_checkpoint::CheckpointStore;
use gate_types::{
    Block, BlockNumber, BlockWithPrivateData, FilteredBlock, LedgerEvent, Positioned,
    StartPosition, StreamCategory, StreamIdentity,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

/// Options for starting a listener.
#[derive(Default, Clone)]
pub struct ListenOptions {
    start_block: Option<BlockNumber>,
    checkpointer: Option<Arc<dyn CheckpointStore>>,
}

impl ListenOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin at an explicit block.
    ///
    /// Takes precedence over any checkpointed position, which makes
    /// operator-driven replay reliable: "from block N" means block N.
    #[must_use]
    pub fn with_start_block(mut self, block: BlockNumber) -> Self {
        self.start_block = Some(block);
        self
    }

    /// Checkpoint delivered events in `store`, and resume strictly after
    /// its recorded position when no explicit start block is given.
    #[must_use]
    pub fn with_checkpointer(mut self, store: Arc<dyn CheckpointStore>) -> Self {
        self.checkpointer = Some(store);
        self
    }
}

/// Named listeners for one stream category.
struct ListenerMap<T> {
    category: StreamCategory,
    listeners: DashMap<String, Arc<dyn EventListener<T>>>,
}

impl<T: Send + 'static> ListenerMap<T> {
    fn new(category: StreamCategory) -> Self {
        Self {
            category,
            listeners: DashMap::new(),
        }
    }

    fn install(&self, name: &str, listener: Arc<dyn EventListener<T>>) {
        self.listeners.insert(name.to_string(), listener);
        debug!(category = %self.category, name, "Listener installed");
    }

    fn get(&self, name: &str) -> Result<Arc<dyn EventListener<T>>, ListenerError> {
        self.listeners
            .get(name)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| ListenerError::NoSuchListener {
                category: self.category,
                name: name.to_string(),
            })
    }

    /// Close and remove the named listener; no-op when absent.
    fn close(&self, name: &str) -> Result<(), ListenerError> {
        match self.listeners.remove(name) {
            Some((_, listener)) => {
                debug!(category = %self.category, name, "Listener closed");
                listener.close()
            }
            None => Ok(()),
        }
    }

    /// Supersession path: retire the prior holder of a name silently.
    fn discard(&self, name: &str) {
        if let Some((_, prior)) = self.listeners.remove(name) {
            match prior.close() {
                Ok(()) => debug!(category = %self.category, name, "Superseded listener closed"),
                Err(error) => {
                    warn!(category = %self.category, name, %error, "Superseded listener close failed");
                }
            }
        }
    }

    /// Close every listener, collecting failures instead of stopping.
    fn drain_into(&self, failures: &mut Vec<ShutdownFailure>) {
        let names: Vec<String> = self.listeners.iter().map(|e| e.key().clone()).collect();
        for name in names {
            if let Some((name, listener)) = self.listeners.remove(&name) {
                if let Err(error) = listener.close() {
                    failures.push(ShutdownFailure::Listener {
                        category: self.category,
                        name,
                        error,
                    });
                }
            }
        }
    }

    fn len(&self) -> usize {
        self.listeners.len()
    }
}

/// Explicit start block wins; else resume strictly after the checkpointed
/// position; else start from the next commit.
async fn resolve_start(
    start_block: Option<BlockNumber>,
    checkpointer: Option<&Arc<dyn CheckpointStore>>,
    identity: &StreamIdentity,
) -> Result<StartPosition, ListenerError> {
    if let Some(block) = start_block {
        return Ok(StartPosition::Block(block));
    }
    if let Some(store) = checkpointer {
        if let Some(last) = store.last_position(identity).await? {
            return Ok(StartPosition::Block(last.saturating_add(1)));
        }
    }
    Ok(StartPosition::NextCommit)
}

fn wrap<T: Positioned + Send + Sync + 'static>(
    feed: EventFeed<T>,
    checkpointer: Option<Arc<dyn CheckpointStore>>,
    identity: StreamIdentity,
) -> Arc<dyn EventListener<T>> {
    let cursor = EventCursor::new(feed);
    match checkpointer {
        Some(store) => Arc::new(CheckpointingCursor::new(cursor, store, identity)),
        None => Arc::new(cursor),
    }
}

/// Named listeners over one ledger connection.
///
/// Listener names are namespaced per category. Starting a listener under
/// a name that is already taken retires the prior listener first
/// (supersession, silent). Shutdown via [`close_all`] is best-effort over
/// every slot and then releases the connection exactly once.
///
/// [`close_all`]: ListenerRegistry::close_all
pub struct ListenerRegistry {
    connection: Arc<dyn LedgerConnection>,
    ledger_events: ListenerMap<LedgerEvent>,
    blocks: ListenerMap<Block>,
    filtered_blocks: ListenerMap<FilteredBlock>,
    blocks_with_private_data: ListenerMap<BlockWithPrivateData>,
    connection_released: AtomicBool,
}

impl ListenerRegistry {
    /// A registry over `connection` with no listeners installed.
    #[must_use]
    pub fn new(connection: Arc<dyn LedgerConnection>) -> Self {
        Self {
            connection,
            ledger_events: ListenerMap::new(StreamCategory::LedgerEvents),
            blocks: ListenerMap::new(StreamCategory::Blocks),
            filtered_blocks: ListenerMap::new(StreamCategory::FilteredBlocks),
            blocks_with_private_data: ListenerMap::new(StreamCategory::BlocksWithPrivateData),
            connection_released: AtomicBool::new(false),
        }
    }

    // -------------------------------------------------------------------------
    // Ledger events
    // -------------------------------------------------------------------------

    /// Listen for events emitted by `contract_name`, under `name`.
    ///
    /// Any prior listener under `name` is closed first. On failure the
    /// slot is left absent; nothing is partially registered.
    pub async fn listen_ledger_events(
        &self,
        name: &str,
        contract_name: &str,
        options: ListenOptions,
    ) -> Result<(), ListenerError> {
        self.ledger_events.discard(name);

        let identity = StreamIdentity::ledger_events(contract_name);
        let start =
            resolve_start(options.start_block, options.checkpointer.as_ref(), &identity).await?;
        let feed = self.connection.ledger_events(contract_name, start).await?;
        debug!(category = %StreamCategory::LedgerEvents, name, contract_name, ?start, "Subscription opened");

        self.ledger_events
            .install(name, wrap(feed, options.checkpointer, identity));
        Ok(())
    }

    /// Next event from the named ledger event listener.
    pub async fn next_ledger_event(&self, name: &str) -> Result<LedgerEvent, ListenerError> {
        let listener = self.ledger_events.get(name)?;
        listener.pull().await
    }

    /// Close the named ledger event listener; no-op when absent.
    pub fn close_ledger_events(&self, name: &str) -> Result<(), ListenerError> {
        self.ledger_events.close(name)
    }

    // -------------------------------------------------------------------------
    // Blocks
    // -------------------------------------------------------------------------

    /// Listen for full committed blocks, under `name`.
    pub async fn listen_blocks(
        &self,
        name: &str,
        options: ListenOptions,
    ) -> Result<(), ListenerError> {
        self.blocks.discard(name);

        let identity = StreamIdentity::blocks();
        let start =
            resolve_start(options.start_block, options.checkpointer.as_ref(), &identity).await?;
        let feed = self.connection.blocks(start).await?;
        debug!(category = %StreamCategory::Blocks, name, ?start, "Subscription opened");

        self.blocks
            .install(name, wrap(feed, options.checkpointer, identity));
        Ok(())
    }

    /// Next block from the named block listener.
    pub async fn next_block(&self, name: &str) -> Result<Block, ListenerError> {
        let listener = self.blocks.get(name)?;
        listener.pull().await
    }

    /// Close the named block listener; no-op when absent.
    pub fn close_blocks(&self, name: &str) -> Result<(), ListenerError> {
        self.blocks.close(name)
    }

    // -------------------------------------------------------------------------
    // Filtered blocks
    // -------------------------------------------------------------------------

    /// Listen for filtered block views, under `name`.
    pub async fn listen_filtered_blocks(
        &self,
        name: &str,
        options: ListenOptions,
    ) -> Result<(), ListenerError> {
        self.filtered_blocks.discard(name);

        let identity = StreamIdentity::filtered_blocks();
        let start =
            resolve_start(options.start_block, options.checkpointer.as_ref(), &identity).await?;
        let feed = self.connection.filtered_blocks(start).await?;
        debug!(category = %StreamCategory::FilteredBlocks, name, ?start, "Subscription opened");

        self.filtered_blocks
            .install(name, wrap(feed, options.checkpointer, identity));
        Ok(())
    }

    /// Next filtered block from the named listener.
    pub async fn next_filtered_block(&self, name: &str) -> Result<FilteredBlock, ListenerError> {
        let listener = self.filtered_blocks.get(name)?;
        listener.pull().await
    }

    /// Close the named filtered block listener; no-op when absent.
    pub fn close_filtered_blocks(&self, name: &str) -> Result<(), ListenerError> {
        self.filtered_blocks.close(name)
    }

    // -------------------------------------------------------------------------
    // Blocks with private data
    // -------------------------------------------------------------------------

    /// Listen for blocks with readable private data, under `name`.
    pub async fn listen_blocks_with_private_data(
        &self,
        name: &str,
        options: ListenOptions,
    ) -> Result<(), ListenerError> {
        self.blocks_with_private_data.discard(name);

        let identity = StreamIdentity::blocks_with_private_data();
        let start =
            resolve_start(options.start_block, options.checkpointer.as_ref(), &identity).await?;
        let feed = self.connection.blocks_with_private_data(start).await?;
        debug!(category = %StreamCategory::BlocksWithPrivateData, name, ?start, "Subscription opened");

        self.blocks_with_private_data
            .install(name, wrap(feed, options.checkpointer, identity));
        Ok(())
    }

    /// Next private-data block from the named listener.
    pub async fn next_block_with_private_data(
        &self,
        name: &str,
    ) -> Result<BlockWithPrivateData, ListenerError> {
        let listener = self.blocks_with_private_data.get(name)?;
        listener.pull().await
    }

    /// Close the named private-data block listener; no-op when absent.
    pub fn close_blocks_with_private_data(&self, name: &str) -> Result<(), ListenerError> {
        self.blocks_with_private_data.close(name)
    }

    // -------------------------------------------------------------------------
    // Registry-wide
    // -------------------------------------------------------------------------

    /// Close every listener across every category, then release the
    /// connection.
    ///
    /// Best-effort: every slot is attempted even when earlier closes
    /// fail, and all failures come back together in the error. The
    /// connection is released exactly once across repeated calls, so
    /// calling this again (or from a cleanup path that never listened at
    /// all) is safe.
    pub fn close_all(&self) -> Result<(), ShutdownError> {
        let mut failures = Vec::new();
        self.ledger_events.drain_into(&mut failures);
        self.blocks.drain_into(&mut failures);
        self.filtered_blocks.drain_into(&mut failures);
        self.blocks_with_private_data.drain_into(&mut failures);

        if !self.connection_released.swap(true, Ordering::SeqCst) {
            debug!("Releasing ledger connection");
            if let Err(error) = self.connection.close() {
                failures.push(ShutdownFailure::Connection { error });
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            warn!(failures = failures.len(), "Shutdown completed with failures");
            Err(ShutdownError { failures })
        }
    }

    /// Number of installed listeners in one category.
    #[must_use]
    pub fn active_listeners(&self, category: StreamCategory) -> usize {
        match category {
            StreamCategory::LedgerEvents => self.ledger_events.len(),
            StreamCategory::Blocks => self.blocks.len(),
            StreamCategory::FilteredBlocks => self.filtered_blocks.len(),
            StreamCategory::BlocksWithPrivateData => self.blocks_with_private_data.len(),
        }
    }
}
