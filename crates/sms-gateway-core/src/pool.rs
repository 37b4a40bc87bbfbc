//! Fan-out of delivery receipts to registered subscribers.

use std::{
    collections::HashMap,
    pin::Pin,
    sync::{Arc, Mutex},
    task::{Context, Poll},
};

use tokio::sync::mpsc;
use uuid::Uuid;

use crate::receipt::Receipt;

/// Subscriber identifier.
pub type SubscriberId = Uuid;

/// Per-subscriber inbox capacity. Small on purpose: a consumer slower than
/// the upstream receive path loses receipts rather than backing it up.
pub const INBOX_CAPACITY: usize = 32;

struct Subscriber {
    inbox: mpsc::Sender<Receipt>,
    dropped: u64,
}

/// Concurrency-safe registry of receipt subscribers.
///
/// `broadcast` runs on the upstream session's single receive path, so it
/// only ever performs non-blocking enqueues; a full inbox costs that one
/// subscriber the receipt and nothing else. The registry is read far more
/// often than it is mutated, but subscriber counts stay small enough that a
/// coarse mutex over the map is adequate.
#[derive(Default)]
pub struct NotificationPool {
    subscribers: Mutex<HashMap<SubscriberId, Subscriber>>,
}

impl NotificationPool {
    /// Create an empty pool.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a subscriber with a fresh id and a bounded inbox.
    ///
    /// Prefer [`NotificationPool::subscribe`] in adapters; it ties
    /// unregistration to scope exit.
    #[must_use]
    pub fn register(&self) -> (SubscriberId, mpsc::Receiver<Receipt>) {
        let id = Uuid::new_v4();
        let (tx, rx) = mpsc::channel(INBOX_CAPACITY);
        self.subscribers
            .lock()
            .unwrap()
            .insert(id, Subscriber { inbox: tx, dropped: 0 });
        tracing::debug!(subscriber = %id, "registered receipt subscriber");
        (id, rx)
    }

    /// Remove a subscriber and release its inbox. Idempotent: unknown ids
    /// are a no-op.
    pub fn unregister(&self, id: SubscriberId) {
        if self.subscribers.lock().unwrap().remove(&id).is_some() {
            tracing::debug!(subscriber = %id, "unregistered receipt subscriber");
        }
    }

    /// Register and wrap the inbox in a guard that unregisters on drop.
    #[must_use]
    pub fn subscribe(self: &Arc<Self>) -> Subscription {
        let (id, rx) = self.register();
        Subscription {
            id,
            rx,
            pool: Arc::clone(self),
        }
    }

    /// Offer a receipt to every currently registered subscriber.
    ///
    /// Never blocks and never fails: each inbox gets a non-blocking enqueue,
    /// and a full inbox drops the receipt for that subscriber only.
    pub fn broadcast(&self, receipt: &Receipt) {
        let mut subscribers = self.subscribers.lock().unwrap();
        for (id, sub) in subscribers.iter_mut() {
            if sub.inbox.try_send(receipt.clone()).is_err() {
                sub.dropped += 1;
                tracing::debug!(
                    subscriber = %id,
                    message_id = %receipt.message_id,
                    dropped = sub.dropped,
                    "inbox full, receipt dropped"
                );
            }
        }
    }

    /// Number of currently registered subscribers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.subscribers.lock().unwrap().len()
    }

    /// Whether no subscribers are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Receipts dropped so far for one subscriber, or `None` if it is not
    /// registered.
    #[must_use]
    pub fn dropped(&self, id: SubscriberId) -> Option<u64> {
        self.subscribers.lock().unwrap().get(&id).map(|s| s.dropped)
    }
}

/// A registered subscriber's read side.
///
/// Yields receipts in broadcast order and unregisters the subscriber when
/// dropped, so adapter loops clean up on any exit path.
pub struct Subscription {
    id: SubscriberId,
    rx: mpsc::Receiver<Receipt>,
    pool: Arc<NotificationPool>,
}

impl Subscription {
    /// Identifier of the underlying subscriber.
    #[must_use]
    pub const fn id(&self) -> SubscriberId {
        self.id
    }

    /// Wait for the next receipt; `None` once unregistered.
    pub async fn next_receipt(&mut self) -> Option<Receipt> {
        self.rx.recv().await
    }
}

impl futures::Stream for Subscription {
    type Item = Receipt;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_recv(cx)
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.pool.unregister(self.id);
    }
}

/// Cloneable handle injected into the upstream session at construction.
///
/// The session calls [`DeliverySink::deliver`] once per inbound receipt;
/// this is the single receipt listener the design allows, replacing any
/// notion of a reassignable global handler.
#[derive(Clone)]
pub struct DeliverySink {
    pool: Arc<NotificationPool>,
}

impl DeliverySink {
    /// Build a sink feeding the given pool.
    #[must_use]
    pub fn new(pool: Arc<NotificationPool>) -> Self {
        Self { pool }
    }

    /// Fan the receipt out to all registered subscribers. Non-blocking.
    pub fn deliver(&self, receipt: &Receipt) {
        self.pool.broadcast(receipt);
    }
}
