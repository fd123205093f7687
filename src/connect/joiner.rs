//! Fan-in connector.
//!
//! A [`Joiner`] owns the input queue of one Transform or Sink. Every edge
//! wired into the node registers one feed; the queue is closed to the node's
//! function only after all registered feeds have closed.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use futures::Stream;
use parking_lot::Mutex;

pub(crate) struct Joiner<T> {
    owner: String,
    capacity: usize,
    /// Kept until the last registered feed closes, so the queue cannot
    /// disconnect while a wired producer has yet to start.
    sender: Mutex<Option<flume::Sender<T>>>,
    receiver: Mutex<Option<flume::Receiver<T>>>,
    open_feeds: AtomicUsize,
}

impl<T> Joiner<T> {
    pub(crate) fn new(owner: impl Into<String>, capacity: usize) -> Self {
        let (sender, receiver) = flume::bounded(capacity);
        Self {
            owner: owner.into(),
            capacity,
            sender: Mutex::new(Some(sender)),
            receiver: Mutex::new(Some(receiver)),
            open_feeds: AtomicUsize::new(0),
        }
    }

    pub(crate) fn owner(&self) -> &str {
        &self.owner
    }

    pub(crate) fn capacity(&self) -> usize {
        self.capacity
    }

    /// Feeds registered and not yet closed
    pub(crate) fn open_feeds(&self) -> usize {
        self.open_feeds.load(Ordering::Acquire)
    }

    /// Account for one more upstream edge. Called at wiring time.
    pub(crate) fn register(&self) {
        self.open_feeds.fetch_add(1, Ordering::AcqRel);
    }

    /// Hand out the send handle for one registered edge.
    ///
    /// Returns `None` once every registered feed has already closed.
    pub(crate) fn feed(self: &Arc<Self>) -> Option<Feed<T>> {
        let sender = self.sender.lock().clone()?;
        Some(Feed {
            sender,
            joiner: Arc::clone(self),
            disconnected: AtomicBool::new(false),
        })
    }

    /// Take the receive end. There is exactly one reader per Joiner.
    pub(crate) fn inbox(&self) -> Option<Inbox<T>> {
        let receiver = self.receiver.lock().take()?;
        Some(Inbox {
            receiver,
            capacity: self.capacity,
        })
    }

    fn release(&self) {
        if self.open_feeds.fetch_sub(1, Ordering::AcqRel) == 1 {
            tracing::trace!(node = %self.owner, "all feeds closed, closing input");
            self.sender.lock().take();
        }
    }
}

/// One producer's handle into a Joiner's shared queue.
///
/// Dropping the feed closes it.
pub(crate) struct Feed<T> {
    sender: flume::Sender<T>,
    joiner: Arc<Joiner<T>>,
    disconnected: AtomicBool,
}

impl<T> Feed<T> {
    /// Push an item into the shared queue, handing it back if the reader is gone.
    pub(crate) async fn send(&self, item: T) -> std::result::Result<(), T> {
        match self.sender.send_async(item).await {
            Ok(()) => Ok(()),
            Err(flume::SendError(item)) => {
                if !self.disconnected.swap(true, Ordering::Relaxed) {
                    tracing::warn!(node = %self.joiner.owner(), "receiver dropped its input");
                }
                Err(item)
            }
        }
    }
}

impl<T> Drop for Feed<T> {
    fn drop(&mut self) {
        self.joiner.release();
    }
}

/// The receive end handed to a Transform or Sink function.
///
/// Items from every upstream producer arrive interleaved on this one stream.
/// [`Inbox::recv`] returns `None` once all upstream producers have finished
/// and the buffer is drained.
pub struct Inbox<T> {
    receiver: flume::Receiver<T>,
    capacity: usize,
}

impl<T> Inbox<T> {
    /// Receive the next item, waiting while the queue is empty.
    pub async fn recv(&mut self) -> Option<T> {
        self.receiver.recv_async().await.ok()
    }

    /// Receive an item if one is ready.
    pub fn try_recv(&mut self) -> Option<T> {
        self.receiver.try_recv().ok()
    }

    /// Number of items buffered right now
    pub fn len(&self) -> usize {
        self.receiver.len()
    }

    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }

    /// Configured buffer capacity of this input
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns true once every upstream feed closed and nothing is left to read.
    pub fn is_closed(&self) -> bool {
        self.receiver.is_disconnected() && self.receiver.is_empty()
    }

    /// Consume the inbox as a `Stream`.
    pub fn into_stream(self) -> impl Stream<Item = T> + Send + 'static
    where
        T: Send + 'static,
    {
        self.receiver.into_stream()
    }
}
