//! In-memory document store backend.
//!
//! A complete [`DocumentStore`] implementation backed by process memory.
//! Used by the test suite and as a reference for the subscription
//! semantics real backends must provide: a full snapshot immediately on
//! subscribe, then a fresh full snapshot after every matching change.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::mpsc;
use tracing::debug;
use uuid::Uuid;

use super::{Document, DocumentStore, RemoteError, Snapshot, SnapshotFeed, SubscriptionHandle};

/// In-memory remote document store.
///
/// Cheaply cloneable; clones share the same underlying collections, so a
/// test can hold one clone for assertions while the store under test holds
/// another. Generated keys are UUID v4.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    /// Collection name -> documents in insertion order.
    collections: Mutex<HashMap<String, Vec<Document>>>,
    subscribers: Mutex<Vec<Subscriber>>,
    next_subscriber: AtomicU64,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    fail_subscribes: AtomicBool,
}

struct Subscriber {
    id: u64,
    collection: String,
    field: String,
    value: String,
    tx: mpsc::UnboundedSender<Snapshot>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent `list` calls fail (for failure-path tests).
    pub fn fail_reads(&self, fail: bool) {
        self.inner.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Make subsequent `set`/`add` calls fail (for failure-path tests).
    pub fn fail_writes(&self, fail: bool) {
        self.inner.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Make subsequent `subscribe` calls fail (for failure-path tests).
    pub fn fail_subscribes(&self, fail: bool) {
        self.inner.fail_subscribes.store(fail, Ordering::SeqCst);
    }

    /// Current contents of a collection, without going through the port.
    #[must_use]
    pub fn contents(&self, collection: &str) -> Snapshot {
        lock(&self.inner.collections)
            .get(collection)
            .cloned()
            .unwrap_or_default()
    }

    /// Delete a document out-of-band, as an external actor would.
    ///
    /// Deletion is not part of the [`DocumentStore`] port; it exists here
    /// so tests can observe removals arriving through the live feed.
    pub fn remove(&self, collection: &str, key: &str) {
        {
            let mut collections = lock(&self.inner.collections);
            if let Some(docs) = collections.get_mut(collection) {
                docs.retain(|doc| doc.id != key);
            }
        }
        self.notify(collection);
    }

    /// Number of live subscriptions (for teardown assertions).
    #[must_use]
    pub fn subscription_count(&self) -> usize {
        lock(&self.inner.subscribers).len()
    }

    fn matching(docs: &[Document], field: &str, value: &str) -> Snapshot {
        docs.iter()
            .filter(|doc| doc.data.get(field).and_then(serde_json::Value::as_str) == Some(value))
            .cloned()
            .collect()
    }

    /// Push a fresh snapshot to every subscriber of `collection`.
    ///
    /// Subscribers whose receiver has gone away are dropped here.
    fn notify(&self, collection: &str) {
        let docs = self.contents(collection);
        let mut subscribers = lock(&self.inner.subscribers);
        subscribers.retain(|sub| {
            if sub.collection != collection {
                return true;
            }
            let snapshot = Self::matching(&docs, &sub.field, &sub.value);
            sub.tx.send(snapshot).is_ok()
        });
    }
}

#[async_trait::async_trait]
impl DocumentStore for MemoryStore {
    async fn list(&self, collection: &str) -> Result<Snapshot, RemoteError> {
        if self.inner.fail_reads.load(Ordering::SeqCst) {
            return Err(RemoteError::Read(format!("{collection}: unavailable")));
        }
        Ok(self.contents(collection))
    }

    async fn set(
        &self,
        collection: &str,
        key: &str,
        data: serde_json::Value,
    ) -> Result<(), RemoteError> {
        if self.inner.fail_writes.load(Ordering::SeqCst) {
            return Err(RemoteError::Write(format!("{collection}/{key}: rejected")));
        }
        {
            let mut collections = lock(&self.inner.collections);
            let docs = collections.entry(collection.to_owned()).or_default();
            match docs.iter_mut().find(|doc| doc.id == key) {
                Some(existing) => existing.data = data,
                None => docs.push(Document::new(key, data)),
            }
        }
        self.notify(collection);
        Ok(())
    }

    async fn add(&self, collection: &str, data: serde_json::Value) -> Result<String, RemoteError> {
        if self.inner.fail_writes.load(Ordering::SeqCst) {
            return Err(RemoteError::Write(format!("{collection}: rejected")));
        }
        let key = Uuid::new_v4().to_string();
        {
            let mut collections = lock(&self.inner.collections);
            collections
                .entry(collection.to_owned())
                .or_default()
                .push(Document::new(key.clone(), data));
        }
        self.notify(collection);
        Ok(key)
    }

    async fn subscribe(
        &self,
        collection: &str,
        field: &str,
        value: &str,
    ) -> Result<SnapshotFeed, RemoteError> {
        if self.inner.fail_subscribes.load(Ordering::SeqCst) {
            return Err(RemoteError::Subscribe(format!("{collection}: unavailable")));
        }
        let (tx, rx) = mpsc::unbounded_channel();
        let id = self.inner.next_subscriber.fetch_add(1, Ordering::SeqCst);

        {
            // The initial snapshot and the registration happen under the
            // subscribers lock, so a concurrent change cannot land between
            // them and go unseen: its notify either precedes the initial
            // snapshot or reaches the registered subscriber.
            let mut subscribers = lock(&self.inner.subscribers);
            let initial = Self::matching(&self.contents(collection), field, value);
            tx.send(initial)
                .map_err(|_| RemoteError::Subscribe("receiver closed".to_owned()))?;
            subscribers.push(Subscriber {
                id,
                collection: collection.to_owned(),
                field: field.to_owned(),
                value: value.to_owned(),
                tx,
            });
        }
        debug!(subscription = id, collection, field, value, "subscribed");

        let inner = Arc::clone(&self.inner);
        let handle = SubscriptionHandle::new(move || {
            lock(&inner.subscribers).retain(|sub| sub.id != id);
            debug!(subscription = id, "unsubscribed");
        });

        Ok(SnapshotFeed {
            snapshots: rx,
            handle,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_set_writes_by_key_and_replaces() {
        let store = MemoryStore::new();
        store
            .set("bases", "coffee", json!({"name": "Coffee"}))
            .await
            .unwrap();
        store
            .set("bases", "coffee", json!({"name": "Drip Coffee"}))
            .await
            .unwrap();

        let docs = store.list("bases").await.unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].data["name"], "Drip Coffee");
    }

    #[tokio::test]
    async fn test_add_generates_distinct_keys() {
        let store = MemoryStore::new();
        let a = store.add("beverages", json!({"name": "a"})).await.unwrap();
        let b = store.add("beverages", json!({"name": "b"})).await.unwrap();
        assert_ne!(a, b);
        assert_eq!(store.list("beverages").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_subscribe_delivers_initial_then_filtered_updates() {
        let store = MemoryStore::new();
        store
            .add("beverages", json!({"name": "mine", "ownerId": "a"}))
            .await
            .unwrap();

        let mut feed = store.subscribe("beverages", "ownerId", "a").await.unwrap();
        let initial = feed.snapshots.recv().await.unwrap();
        assert_eq!(initial.len(), 1);

        // A document for another owner does not match, but still triggers
        // a (filtered) snapshot for this collection.
        store
            .add("beverages", json!({"name": "theirs", "ownerId": "b"}))
            .await
            .unwrap();
        let next = feed.snapshots.recv().await.unwrap();
        assert_eq!(next.len(), 1);

        store
            .add("beverages", json!({"name": "also mine", "ownerId": "a"}))
            .await
            .unwrap();
        let next = feed.snapshots.recv().await.unwrap();
        assert_eq!(next.len(), 2);
    }

    #[tokio::test]
    async fn test_subscribe_failure_registers_nothing() {
        let store = MemoryStore::new();
        store.fail_subscribes(true);
        assert!(store.subscribe("beverages", "ownerId", "a").await.is_err());
        assert_eq!(store.subscription_count(), 0);

        store.fail_subscribes(false);
        let feed = store.subscribe("beverages", "ownerId", "a").await;
        assert!(feed.is_ok());
        assert_eq!(store.subscription_count(), 1);
    }

    #[tokio::test]
    async fn test_cancel_removes_subscriber() {
        let store = MemoryStore::new();
        let mut feed = store.subscribe("beverages", "ownerId", "a").await.unwrap();
        assert_eq!(store.subscription_count(), 1);

        feed.handle.cancel();
        assert_eq!(store.subscription_count(), 0);

        // cancelling again is a no-op
        feed.handle.cancel();
        assert_eq!(store.subscription_count(), 0);
    }
}
