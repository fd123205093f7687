//! Fan-out connector.
//!
//! The [`Outbox`] is the single send end a Source or Transform function
//! writes to. It holds one feed per wired edge and broadcasts every item to
//! all of them.

use std::sync::Arc;

use crate::connect::joiner::{Feed, Joiner};
use crate::error::{Error, Result};

/// The send end handed to a Source or Transform function.
///
/// Every item is delivered to each downstream receiver before
/// [`Outbox::send`] returns. Dropping the outbox, or calling
/// [`Outbox::close`], tells every receiver this producer is done.
pub struct Outbox<T> {
    node: String,
    feeds: Vec<Feed<T>>,
}

impl<T> Outbox<T> {
    /// Open one feed on each target Joiner.
    pub(crate) fn fork(node: impl Into<String>, targets: &[Arc<Joiner<T>>]) -> Self {
        let node = node.into();
        let feeds = targets
            .iter()
            .filter_map(|joiner| {
                let feed = joiner.feed();
                if feed.is_none() {
                    tracing::warn!(node = %node, target = %joiner.owner(), "target input already closed");
                }
                feed
            })
            .collect();
        Self { node, feeds }
    }

    /// Number of downstream feeds
    pub fn receivers(&self) -> usize {
        self.feeds.len()
    }

    /// Close every downstream feed.
    pub fn close(self) {
        tracing::trace!(node = %self.node, receivers = self.feeds.len(), "closing outbox");
    }

    fn disconnected(&self) -> Error {
        Error::Disconnected {
            node: self.node.clone(),
        }
    }
}

impl<T: Clone> Outbox<T> {
    /// Broadcast an item to every downstream receiver.
    ///
    /// Waits on each receiver in wiring order, so a full or unbuffered input
    /// holds up the whole broadcast. Receivers that dropped their input are
    /// skipped; the call fails with [`Error::Disconnected`] only when none
    /// of them took the item.
    pub async fn send(&self, item: T) -> Result<()> {
        let Some((last, rest)) = self.feeds.split_last() else {
            return Err(self.disconnected());
        };

        let mut delivered = false;
        for feed in rest {
            delivered |= feed.send(item.clone()).await.is_ok();
        }
        delivered |= last.send(item).await.is_ok();

        if delivered {
            Ok(())
        } else {
            Err(self.disconnected())
        }
    }
}
