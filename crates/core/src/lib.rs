//! Copper Kettle Core - Shared types library.
//!
//! This crate provides the common domain types used across Copper Kettle
//! components:
//! - `store` - Client-side synchronization core for catalogs and orders
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no remote-store access,
//! no async runtime. This keeps it lightweight and allows it to be used
//! anywhere, including in tests that never touch a remote store.
//!
//! # Modules
//!
//! - [`types`] - Newtype string IDs, catalog options, temperatures, orders,
//!   and identities

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
