//! Copper Kettle Store - client-side catalog and order synchronization.
//!
//! Tracks the beverage catalogs (bases, syrups, creamers), the in-progress
//! selection, and the signed-in user's saved orders, keeping them
//! synchronized with a remote document store and its live subscription
//! feed.
//!
//! # Architecture
//!
//! - [`store::BeverageStore`] is the single stateful component; the remote
//!   store and the identity feed are injected collaborators
//! - The remote store is a port trait ([`remote::DocumentStore`]);
//!   [`remote::MemoryStore`] is the bundled in-memory backend
//! - Catalogs seed themselves: an empty remote collection is populated
//!   from the bundled defaults on first load
//! - Order snapshots are authoritative: every delivery replaces the local
//!   order collection wholesale, and the current-order pointer is
//!   re-resolved by id
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use copper_kettle_core::{Identity, Temperature};
//! use copper_kettle_store::remote::MemoryStore;
//! use copper_kettle_store::store::BeverageStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = BeverageStore::new(Arc::new(MemoryStore::new()));
//! store.init().await;
//! store.on_identity_changed(Some(Identity::new("user-1"))).await;
//!
//! store.set_name("Mocha");
//! store.set_temperature(Temperature::Hot);
//! let message = store.submit().await?;
//! assert!(message.contains("Mocha"));
//! # Ok(())
//! # }
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod catalog;
pub mod config;
pub mod error;
pub mod identity;
pub mod remote;
pub mod store;

pub use config::{ConfigError, StoreConfig};
pub use error::SubmitError;
pub use identity::IdentityBinding;
pub use store::{BeverageStore, Selection};
