// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Typed change notifications.
//!
//! Each emitting service owns an [`EventBus`] for its own event type.
//! Observers receive events through a channel they drain on their own task,
//! so emitters never run observer code.

use std::ops::Range;
use std::sync::Mutex;

use tokio::sync::mpsc;
use url::Url;

use crate::lock;
use crate::models::Profile;

/// How the feed collection changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedChangeEvent {
    /// Records were appended at `range` (old length .. new length).
    Appended { range: Range<usize> },
    /// The record at `index` was replaced by a copy with a new like state.
    Replaced { index: usize, photo_id: String },
    /// The feed was emptied (logout).
    Cleared,
}

/// How the cached profile changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileEvent {
    ProfileChanged(Profile),
    AvatarChanged(Url),
    Cleared,
}

/// Handle used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// A live subscription: its id plus the receiving end of the channel.
#[derive(Debug)]
pub struct Subscription<E> {
    pub id: SubscriptionId,
    pub events: mpsc::UnboundedReceiver<E>,
}

impl<E> Subscription<E> {
    /// Wait for the next event; `None` once unsubscribed.
    pub async fn recv(&mut self) -> Option<E> {
        self.events.recv().await
    }

    /// Next event if one is already queued.
    pub fn try_recv(&mut self) -> Option<E> {
        self.events.try_recv().ok()
    }

    /// Everything queued right now, in emission order.
    pub fn drain(&mut self) -> Vec<E> {
        let mut out = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            out.push(event);
        }
        out
    }
}

struct Subscribers<E> {
    next_id: u64,
    senders: Vec<(SubscriptionId, mpsc::UnboundedSender<E>)>,
}

/// Subscriber list for one event type.
pub struct EventBus<E> {
    inner: Mutex<Subscribers<E>>,
}

impl<E: Clone> EventBus<E> {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Subscribers {
                next_id: 0,
                senders: Vec::new(),
            }),
        }
    }

    pub fn subscribe(&self) -> Subscription<E> {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut inner = lock(&self.inner);
        inner.next_id += 1;
        let id = SubscriptionId(inner.next_id);
        inner.senders.push((id, tx));
        Subscription { id, events: rx }
    }

    /// Remove a subscriber. Returns false if it was already gone.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut inner = lock(&self.inner);
        let before = inner.senders.len();
        inner.senders.retain(|(sid, _)| *sid != id);
        inner.senders.len() != before
    }

    /// Send `event` to every subscriber, pruning ones whose receiver dropped.
    pub fn emit(&self, event: E) {
        let mut inner = lock(&self.inner);
        inner
            .senders
            .retain(|(_, tx)| tx.send(event.clone()).is_ok());
    }

    pub fn subscriber_count(&self) -> usize {
        lock(&self.inner).senders.len()
    }
}

impl<E: Clone> Default for EventBus<E> {
    fn default() -> Self {
        Self::new()
    }
}
