//! Identity binding.
//!
//! The auth collaborator publishes the signed-in identity over a
//! `tokio::sync::watch` channel; [`IdentityBinding`] forwards each change
//! to the store's `on_identity_changed`. Auth code that prefers direct
//! calls can skip this and call `on_identity_changed` itself.

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

use copper_kettle_core::Identity;

use crate::store::BeverageStore;

/// Background task wiring an identity feed to a store.
///
/// Applies the feed's current value immediately, then every change. Exits
/// when the sender side of the feed is dropped; dropping the binding aborts
/// the task.
pub struct IdentityBinding {
    task: JoinHandle<()>,
}

impl IdentityBinding {
    /// Spawn the forwarding task.
    pub fn spawn(store: BeverageStore, mut identities: watch::Receiver<Option<Identity>>) -> Self {
        let task = tokio::spawn(async move {
            loop {
                let identity = identities.borrow_and_update().clone();
                store.on_identity_changed(identity).await;
                if identities.changed().await.is_err() {
                    break;
                }
            }
            debug!("identity feed closed");
        });
        Self { task }
    }

    /// Whether the forwarding task is still running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }
}

impl Drop for IdentityBinding {
    fn drop(&mut self) {
        self.task.abort();
    }
}
