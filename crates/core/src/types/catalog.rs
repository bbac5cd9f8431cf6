//! Catalog options and the three fixed option kinds.

use serde::{Deserialize, Serialize};

use super::id::OptionId;

/// The three disjoint catalog kinds a beverage is composed from.
///
/// Each kind has its own remote collection; options never move between
/// kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogKind {
    Base,
    Syrup,
    Creamer,
}

impl CatalogKind {
    /// All catalog kinds, in the order the UI presents them.
    pub const ALL: [Self; 3] = [Self::Base, Self::Syrup, Self::Creamer];
}

impl std::fmt::Display for CatalogKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Base => "base",
            Self::Syrup => "syrup",
            Self::Creamer => "creamer",
        };
        write!(f, "{name}")
    }
}

/// A single selectable catalog entry (a base, a syrup, or a creamer).
///
/// Immutable once created; identity is the `id`. Selections and orders copy
/// options by value, so a persisted order never aliases the catalog entry
/// it was built from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogOption {
    /// Stable identifier, doubling as the remote document key.
    pub id: OptionId,
    /// Human-readable label.
    pub name: String,
    /// Display color (CSS color string).
    pub color: String,
}

impl CatalogOption {
    /// Create a new catalog option.
    #[must_use]
    pub fn new(id: impl Into<OptionId>, name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            color: color.into(),
        }
    }
}
