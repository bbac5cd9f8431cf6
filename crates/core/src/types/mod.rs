//! Core types for Copper Kettle.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod catalog;
pub mod id;
pub mod identity;
pub mod order;
pub mod temperature;

pub use catalog::{CatalogKind, CatalogOption};
pub use id::*;
pub use identity::Identity;
pub use order::Order;
pub use temperature::Temperature;
