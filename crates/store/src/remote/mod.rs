//! Remote document store port.
//!
//! The store talks to its persistence engine exclusively through the
//! [`DocumentStore`] trait: flat document collections with read-all,
//! write-by-key, add-with-generated-key, and equality-filtered live
//! subscriptions. Backends implement the trait; [`MemoryStore`] is the
//! bundled in-memory reference used by the test suite.

mod memory;

pub use memory::MemoryStore;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

/// Errors surfaced by a remote document store backend.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// Reading a collection failed.
    #[error("remote read failed: {0}")]
    Read(String),

    /// Writing a document failed.
    #[error("remote write failed: {0}")]
    Write(String),

    /// Establishing a live subscription failed.
    #[error("remote subscription failed: {0}")]
    Subscribe(String),
}

/// A single remote document: its key plus a flat field map.
///
/// The key lives outside the body, so the same body shape works for both
/// keyed writes and generated-key adds.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub data: serde_json::Value,
}

impl Document {
    /// Create a document from a key and a body.
    #[must_use]
    pub fn new(id: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            id: id.into(),
            data,
        }
    }
}

/// A complete point-in-time view of every document matching a live query.
pub type Snapshot = Vec<Document>;

/// A live filtered query: a stream of complete snapshots plus the handle
/// that tears the subscription down.
///
/// The backend delivers the current matching contents immediately on
/// subscribe, then a fresh full snapshot after every matching change.
/// Snapshots are complete views, never diffs.
pub struct SnapshotFeed {
    pub snapshots: mpsc::UnboundedReceiver<Snapshot>,
    pub handle: SubscriptionHandle,
}

/// Teardown handle for one live subscription.
///
/// Cancellation is idempotent: the underlying closure is taken on first
/// invocation, so a second `cancel` (or a cancel followed by drop) is a
/// no-op. Dropping an un-cancelled handle cancels the subscription.
pub struct SubscriptionHandle {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl SubscriptionHandle {
    /// Wrap a backend's teardown closure.
    #[must_use]
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// Tear the subscription down. Safe to call more than once.
    pub fn cancel(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }

    /// Whether teardown has already run.
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        self.cancel.is_none()
    }
}

impl Drop for SubscriptionHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl std::fmt::Debug for SubscriptionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriptionHandle")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

/// Port trait for the remote document store collaborator.
///
/// Collections are flat maps of key to document body; no nested
/// sub-collections. All operations are asynchronous and may fail with a
/// [`RemoteError`]; callers decide whether a failure is fatal.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Read every document in a collection.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::Read`] if the collection cannot be read.
    async fn list(&self, collection: &str) -> Result<Snapshot, RemoteError>;

    /// Write a document body under a caller-chosen key, replacing any
    /// existing document with that key.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::Write`] if the write is rejected.
    async fn set(
        &self,
        collection: &str,
        key: &str,
        data: serde_json::Value,
    ) -> Result<(), RemoteError>;

    /// Add a document body under a backend-generated key and return the key.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::Write`] if the write is rejected.
    async fn add(&self, collection: &str, data: serde_json::Value) -> Result<String, RemoteError>;

    /// Open a live subscription to the documents in `collection` whose
    /// `field` equals `value`.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::Subscribe`] if the subscription cannot be
    /// established.
    async fn subscribe(
        &self,
        collection: &str,
        field: &str,
        value: &str,
    ) -> Result<SnapshotFeed, RemoteError>;
}
