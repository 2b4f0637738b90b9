//! # Event Cursors
//!
//! Pull-based consumption of one event stream.

use crate::domain::errors::ListenerError;
use crate::ports::outbound::{BoxEventStream, EventFeed, FeedCloser};
use async_trait::async_trait;
use tokio::sync::{watch, Mutex};
use tokio_stream::StreamExt;

/// Pull-based access to one event stream.
///
/// Implemented by the plain [`EventCursor`] and the checkpointing
/// decorator around it, so the registry can hold either behind one
/// object type.
#[async_trait]
pub trait EventListener<T>: Send + Sync {
    /// Wait for and return the next event.
    ///
    /// Suspends until an event arrives, then fails with
    /// [`ListenerError::StreamEnded`] or [`ListenerError::StreamError`]
    /// once the subscription terminates. Intended for a single logical
    /// consumer; concurrent pulls are serialized, not rejected.
    async fn pull(&self) -> Result<T, ListenerError>;

    /// Release the underlying subscription.
    ///
    /// Idempotent. A pull suspended at close time promptly fails with
    /// [`ListenerError::Closed`], and every later pull does too.
    fn close(&self) -> Result<(), ListenerError>;
}

/// A cursor over one raw event feed.
///
/// Owns the feed for its whole lifetime: created on listen, consumed via
/// repeated pulls, terminated exactly once via [`EventListener::close`].
pub struct EventCursor<T> {
    /// The feed's stream. The lock serializes pulls so a second caller
    /// waits instead of splitting the event sequence.
    stream: Mutex<BoxEventStream<T>>,
    /// Release hook for the subscription; taken on first close.
    closer: parking_lot::Mutex<Option<FeedCloser>>,
    /// Close signal; every pull races against it.
    closed_tx: watch::Sender<bool>,
}

impl<T> EventCursor<T> {
    /// Wrap a raw feed in a cursor.
    #[must_use]
    pub fn new(feed: EventFeed<T>) -> Self {
        let (stream, closer) = feed.into_parts();
        let (closed_tx, _) = watch::channel(false);
        Self {
            stream: Mutex::new(stream),
            closer: parking_lot::Mutex::new(Some(closer)),
            closed_tx,
        }
    }
}

#[async_trait]
impl<T: Send + 'static> EventListener<T> for EventCursor<T> {
    async fn pull(&self) -> Result<T, ListenerError> {
        let mut closed = self.closed_tx.subscribe();
        if *closed.borrow_and_update() {
            return Err(ListenerError::Closed);
        }

        // Waiting for the stream lock is itself interruptible, so a pull
        // queued behind another consumer still unblocks on close.
        let mut stream = tokio::select! {
            guard = self.stream.lock() => guard,
            _ = closed.changed() => return Err(ListenerError::Closed),
        };

        tokio::select! {
            item = stream.next() => match item {
                Some(Ok(event)) => Ok(event),
                Some(Err(err)) => Err(err),
                None => Err(ListenerError::StreamEnded),
            },
            _ = closed.changed() => Err(ListenerError::Closed),
        }
    }

    fn close(&self) -> Result<(), ListenerError> {
        if self.closed_tx.send_replace(true) {
            // Already closed; the release hook has run.
            return Ok(());
        }
        let closer = self.closer.lock().take();
        match closer {
            Some(release) => release(),
            None => Ok(()),
        }
    }
}
