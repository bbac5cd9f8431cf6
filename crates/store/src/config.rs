//! Store configuration.
//!
//! Collection names and the owner filter field are deploy-time decisions:
//! a fresh deployment takes the defaults, while a store pointed at a legacy
//! dataset can keep its old collection and field names. Configuration is
//! constructor-injected; there is no environment loading in this library.

use copper_kettle_core::CatalogKind;
use thiserror::Error;

/// Configuration errors detected at store construction.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("empty collection name for {0}")]
    EmptyCollection(&'static str),
    #[error("empty owner filter field")]
    EmptyOwnerField,
}

/// Remote collection layout for one store instance.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Collection holding base options.
    pub bases_collection: String,
    /// Collection holding syrup options.
    pub syrups_collection: String,
    /// Collection holding creamer options.
    pub creamers_collection: String,
    /// Collection holding saved orders.
    pub orders_collection: String,
    /// Document field the order subscription filters on.
    pub owner_field: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            bases_collection: "bases".to_owned(),
            syrups_collection: "syrups".to_owned(),
            creamers_collection: "creamers".to_owned(),
            orders_collection: "beverages".to_owned(),
            owner_field: "ownerId".to_owned(),
        }
    }
}

impl StoreConfig {
    /// Check that every collection name and the owner field are non-empty.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bases_collection.is_empty() {
            return Err(ConfigError::EmptyCollection("bases"));
        }
        if self.syrups_collection.is_empty() {
            return Err(ConfigError::EmptyCollection("syrups"));
        }
        if self.creamers_collection.is_empty() {
            return Err(ConfigError::EmptyCollection("creamers"));
        }
        if self.orders_collection.is_empty() {
            return Err(ConfigError::EmptyCollection("orders"));
        }
        if self.owner_field.is_empty() {
            return Err(ConfigError::EmptyOwnerField);
        }
        Ok(())
    }

    /// The catalog collection for a kind.
    #[must_use]
    pub fn collection(&self, kind: CatalogKind) -> &str {
        match kind {
            CatalogKind::Base => &self.bases_collection,
            CatalogKind::Syrup => &self.syrups_collection,
            CatalogKind::Creamer => &self.creamers_collection,
        }
    }
}
