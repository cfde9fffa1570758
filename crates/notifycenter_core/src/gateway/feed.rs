//! In-process change feed and subscription handles.
//!
//! # Responsibility
//! - Fan out remote changes to every live subscription.
//! - Model connection loss so consumers can observe a dropped channel.
//!
//! # Invariants
//! - A released (or dropped) subscription receives no further changes.
//! - After `close()`, every existing subscription reports disconnection once
//!   its buffered changes are drained, and new subscriptions start
//!   disconnected.

use super::change::RemoteChange;
use log::{debug, warn};
use std::collections::HashMap;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Default)]
struct FeedState {
    next_id: u64,
    subscribers: HashMap<u64, Sender<RemoteChange>>,
    closed: bool,
}

/// Broadcast channel for remote changes.
///
/// Cloning yields another handle to the same feed.
#[derive(Clone, Default)]
pub struct ChangeFeed {
    state: Arc<Mutex<FeedState>>,
}

impl ChangeFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new subscription.
    pub fn subscribe(&self) -> Subscription {
        let (sender, receiver) = mpsc::channel();
        let mut state = self.lock();
        let id = state.next_id;
        state.next_id += 1;
        if state.closed {
            drop(sender);
        } else {
            state.subscribers.insert(id, sender);
        }
        debug!("event=feed_subscribe module=gateway status=ok subscription_id={id}");
        Subscription {
            id,
            receiver,
            feed: self.clone(),
        }
    }

    /// Delivers `change` to every live subscription.
    ///
    /// Returns the number of subscriptions reached.
    pub fn publish(&self, change: RemoteChange) -> usize {
        let mut state = self.lock();
        state
            .subscribers
            .retain(|_, sender| sender.send(change.clone()).is_ok());
        state.subscribers.len()
    }

    /// Drops the channel for every subscriber, as a lost realtime connection
    /// would.
    pub fn close(&self) {
        let mut state = self.lock();
        let dropped = state.subscribers.len();
        state.subscribers.clear();
        state.closed = true;
        warn!("event=feed_closed module=gateway status=ok dropped_subscriptions={dropped}");
    }

    /// Reopens a closed feed for subsequent subscriptions.
    pub fn reopen(&self) {
        self.lock().closed = false;
    }

    pub fn subscriber_count(&self) -> usize {
        self.lock().subscribers.len()
    }

    fn unsubscribe(&self, id: u64) {
        if self.lock().subscribers.remove(&id).is_some() {
            debug!("event=feed_unsubscribe module=gateway status=ok subscription_id={id}");
        }
    }

    fn lock(&self) -> MutexGuard<'_, FeedState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Changes drained from a subscription in one poll.
#[derive(Debug, Default)]
pub struct SubscriptionBatch {
    pub changes: Vec<RemoteChange>,
    /// `false` once the feed side of the channel is gone.
    pub connected: bool,
}

/// Live subscription handle. Released on drop.
pub struct Subscription {
    id: u64,
    receiver: Receiver<RemoteChange>,
    feed: ChangeFeed,
}

impl Subscription {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Returns every change delivered since the last poll without blocking.
    pub fn drain(&self) -> SubscriptionBatch {
        let mut batch = SubscriptionBatch {
            changes: Vec::new(),
            connected: true,
        };
        loop {
            match self.receiver.try_recv() {
                Ok(change) => batch.changes.push(change),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    batch.connected = false;
                    break;
                }
            }
        }
        batch
    }

    /// Stops delivery of further changes.
    pub fn release(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.feed.unsubscribe(self.id);
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}
