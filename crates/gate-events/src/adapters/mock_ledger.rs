//! # In-Process Ledger
//!
//! A [`LedgerConnection`] backed by an in-process commit log. Tests drive
//! the producer side; the consumer side behaves like a real ordering
//! service: every feed replays committed blocks from its start position,
//! then follows live commits, in order and without gaps.

use crate::domain::errors::ListenerError;
use crate::ports::outbound::{EventFeed, FeedCloser, LedgerConnection};
use crate::DEFAULT_FEED_CAPACITY;
use async_trait::async_trait;
use gate_types::{
    Block, BlockHeader, BlockNumber, BlockWithPrivateData, FilteredBlock, FilteredTransaction,
    Hash, LedgerEvent, StartPosition, TransactionId, TransactionStatus,
};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};
use tokio_stream::wrappers::ReceiverStream;
use tracing::debug;

/// Everything derived from one committed block, shared by all feeds.
struct CommittedEntry {
    block: Block,
    filtered: FilteredBlock,
    private: BlockWithPrivateData,
    events: Vec<LedgerEvent>,
}

impl CommittedEntry {
    fn number(&self) -> BlockNumber {
        self.block.header.number
    }
}

struct LedgerState {
    entries: Vec<Arc<CommittedEntry>>,
    next_block: BlockNumber,
    previous_hash: Hash,
}

/// An in-process ledger connection.
///
/// The producer methods (`commit_block`, `emit_event`, ...) append to the
/// commit log; each open subscription sees every committed block from its
/// resolved start position exactly once, regardless of whether it was
/// committed before or after the subscription opened.
pub struct MockLedger {
    /// Commit log; the lock also orders commits against new-feed
    /// snapshots so no block lands in neither the snapshot nor the live
    /// channel.
    state: Mutex<LedgerState>,
    /// Live fan-out of newly committed blocks.
    live_tx: broadcast::Sender<Arc<CommittedEntry>>,
    /// Feeds whose closer has not yet run.
    open_feeds: Arc<AtomicUsize>,
    fail_connections: AtomicBool,
    closed: AtomicBool,
}

impl Default for MockLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl MockLedger {
    #[must_use]
    pub fn new() -> Self {
        let (live_tx, _) = broadcast::channel(DEFAULT_FEED_CAPACITY);
        Self {
            state: Mutex::new(LedgerState {
                entries: Vec::new(),
                next_block: 1,
                previous_hash: [0u8; 32],
            }),
            live_tx,
            open_feeds: Arc::new(AtomicUsize::new(0)),
            fail_connections: AtomicBool::new(false),
            closed: AtomicBool::new(false),
        }
    }

    // -------------------------------------------------------------------------
    // Producer side
    // -------------------------------------------------------------------------

    /// Commit a block carrying the given transaction envelopes.
    ///
    /// Returns the committed block's number.
    pub fn commit_block(&self, envelopes: Vec<Vec<u8>>) -> BlockNumber {
        self.commit(envelopes, Vec::new(), BTreeMap::new())
    }

    /// Commit a block whose private data collections are readable by this
    /// client.
    pub fn commit_block_with_private_data(
        &self,
        envelopes: Vec<Vec<u8>>,
        private_data: BTreeMap<u64, Vec<u8>>,
    ) -> BlockNumber {
        self.commit(envelopes, Vec::new(), private_data)
    }

    /// Commit a block whose single transaction emits one contract event.
    pub fn emit_event(&self, contract_name: &str, event_name: &str, payload: &[u8]) -> BlockNumber {
        self.commit(
            Vec::new(),
            vec![EventSpec {
                contract_name: contract_name.to_string(),
                event_name: event_name.to_string(),
                payload: payload.to_vec(),
            }],
            BTreeMap::new(),
        )
    }

    /// Commit one block emitting one event per `(event_name, payload)`
    /// entry, all from the same contract.
    pub fn emit_events(&self, contract_name: &str, events: &[(&str, &[u8])]) -> BlockNumber {
        let specs = events
            .iter()
            .map(|(event_name, payload)| EventSpec {
                contract_name: contract_name.to_string(),
                event_name: (*event_name).to_string(),
                payload: payload.to_vec(),
            })
            .collect();
        self.commit(Vec::new(), specs, BTreeMap::new())
    }

    /// Choose the number the next committed block receives.
    ///
    /// Only moves forward; a number at or below the current assignment is
    /// ignored so the chain stays monotone.
    pub fn set_next_block(&self, number: BlockNumber) {
        let mut state = self.state.lock();
        state.next_block = state.next_block.max(number);
    }

    /// Highest committed block number, if any block was committed.
    #[must_use]
    pub fn tip(&self) -> Option<BlockNumber> {
        self.state.lock().entries.last().map(|entry| entry.number())
    }

    /// Number of feeds currently open (a closed feed is released).
    #[must_use]
    pub fn open_feeds(&self) -> usize {
        self.open_feeds.load(Ordering::SeqCst)
    }

    /// Make subsequent subscription opens fail with a connection error.
    pub fn fail_connections(&self, fail: bool) {
        self.fail_connections.store(fail, Ordering::SeqCst);
    }

    /// Whether `close` has released this connection.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn commit(
        &self,
        envelopes: Vec<Vec<u8>>,
        events: Vec<EventSpec>,
        private_data: BTreeMap<u64, Vec<u8>>,
    ) -> BlockNumber {
        let mut state = self.state.lock();
        let number = state.next_block;
        state.next_block += 1;

        let mut all_envelopes = Vec::new();
        let mut transactions = Vec::new();
        let mut ledger_events = Vec::new();

        for envelope in envelopes {
            transactions.push(FilteredTransaction {
                transaction_id: TransactionId::random(),
                status: TransactionStatus::Valid,
            });
            all_envelopes.push(envelope);
        }
        for spec in events {
            let transaction_id = TransactionId::random();
            transactions.push(FilteredTransaction {
                transaction_id: transaction_id.clone(),
                status: TransactionStatus::Valid,
            });
            all_envelopes.push(spec.payload.clone());
            ledger_events.push(LedgerEvent {
                block_number: number,
                transaction_id,
                contract_name: spec.contract_name,
                event_name: spec.event_name,
                payload: spec.payload,
            });
        }

        let header = BlockHeader {
            number,
            previous_hash: state.previous_hash,
            data_hash: pseudo_hash(b'd', number),
        };
        state.previous_hash = pseudo_hash(b'h', number);

        let block = Block {
            header,
            envelopes: all_envelopes,
        };
        let entry = Arc::new(CommittedEntry {
            filtered: FilteredBlock {
                block_number: number,
                transactions,
            },
            private: BlockWithPrivateData {
                block: block.clone(),
                private_data,
            },
            events: ledger_events,
            block,
        });

        state.entries.push(Arc::clone(&entry));
        // No receivers is fine; feeds opened later replay from the log.
        let _ = self.live_tx.send(entry);

        debug!(block = number, "Block committed");
        number
    }

    // -------------------------------------------------------------------------
    // Consumer side
    // -------------------------------------------------------------------------

    fn ensure_open(&self) -> Result<(), ListenerError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(ListenerError::Connection(
                "connection released".to_string(),
            ));
        }
        if self.fail_connections.load(Ordering::SeqCst) {
            return Err(ListenerError::Connection(
                "connection unavailable".to_string(),
            ));
        }
        Ok(())
    }

    fn open_feed<T, F>(&self, start: StartPosition, extract: F) -> Result<EventFeed<T>, ListenerError>
    where
        T: Send + 'static,
        F: Fn(&CommittedEntry) -> Vec<T> + Send + 'static,
    {
        self.ensure_open()?;

        let (snapshot, mut live_rx) = {
            let state = self.state.lock();
            // Subscribing under the state lock closes the race between
            // the replay snapshot and live commits: every block lands in
            // exactly one of the two.
            let live_rx = self.live_tx.subscribe();
            let snapshot: Vec<T> = match start {
                StartPosition::NextCommit => Vec::new(),
                StartPosition::Block(from) => state
                    .entries
                    .iter()
                    .filter(|entry| entry.number() >= from)
                    .flat_map(|entry| extract(entry))
                    .collect(),
            };
            (snapshot, live_rx)
        };

        // An explicit start bounds the live side too: a feed opened ahead
        // of the tip stays silent until the chain reaches its start block.
        let lower = match start {
            StartPosition::NextCommit => 0,
            StartPosition::Block(from) => from,
        };

        let (tx, rx) = mpsc::channel(DEFAULT_FEED_CAPACITY);
        let task = tokio::spawn(async move {
            for item in snapshot {
                if tx.send(Ok(item)).await.is_err() {
                    return;
                }
            }
            loop {
                match live_rx.recv().await {
                    Ok(entry) => {
                        if entry.number() < lower {
                            continue;
                        }
                        for item in extract(&entry) {
                            if tx.send(Ok(item)).await.is_err() {
                                return;
                            }
                        }
                    }
                    // Ledger dropped: nothing more will ever be committed.
                    Err(broadcast::error::RecvError::Closed) => return,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        // A gap would silently violate ordering, so fail
                        // the stream instead of resuming past it.
                        let _ = tx
                            .send(Err(ListenerError::StreamError(format!(
                                "event feed overrun, {skipped} commits dropped"
                            ))))
                            .await;
                        return;
                    }
                }
            }
        });

        self.open_feeds.fetch_add(1, Ordering::SeqCst);
        let open_feeds = Arc::clone(&self.open_feeds);
        let abort = task.abort_handle();
        let closer: FeedCloser = Box::new(move || {
            abort.abort();
            open_feeds.fetch_sub(1, Ordering::SeqCst);
            Ok(())
        });

        Ok(EventFeed::new(Box::pin(ReceiverStream::new(rx)), closer))
    }
}

#[async_trait]
impl LedgerConnection for MockLedger {
    async fn ledger_events(
        &self,
        contract_name: &str,
        start: StartPosition,
    ) -> Result<EventFeed<LedgerEvent>, ListenerError> {
        let contract = contract_name.to_string();
        self.open_feed(start, move |entry| {
            entry
                .events
                .iter()
                .filter(|event| event.contract_name == contract)
                .cloned()
                .collect()
        })
    }

    async fn blocks(&self, start: StartPosition) -> Result<EventFeed<Block>, ListenerError> {
        self.open_feed(start, |entry| vec![entry.block.clone()])
    }

    async fn filtered_blocks(
        &self,
        start: StartPosition,
    ) -> Result<EventFeed<FilteredBlock>, ListenerError> {
        self.open_feed(start, |entry| vec![entry.filtered.clone()])
    }

    async fn blocks_with_private_data(
        &self,
        start: StartPosition,
    ) -> Result<EventFeed<BlockWithPrivateData>, ListenerError> {
        self.open_feed(start, |entry| vec![entry.private.clone()])
    }

    fn close(&self) -> Result<(), ListenerError> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

struct EventSpec {
    contract_name: String,
    event_name: String,
    payload: Vec<u8>,
}

/// Stand-in linkage hash, stable per block number. Good enough for an
/// in-process chain; nothing verifies these cryptographically.
fn pseudo_hash(tag: u8, number: BlockNumber) -> Hash {
    let mut hash = [0u8; 32];
    hash[0] = tag;
    hash[1..9].copy_from_slice(&number.to_be_bytes());
    hash
}
