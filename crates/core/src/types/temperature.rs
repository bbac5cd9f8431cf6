//! Serving temperatures.

use serde::{Deserialize, Serialize};

/// Serving temperature for a beverage.
///
/// A small fixed list; not persisted as its own entity, only referenced
/// from selections and orders. Serialized as capitalized strings ("Hot")
/// to match the stored document format.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
pub enum Temperature {
    #[default]
    Hot,
    Warm,
    Cold,
    Iced,
}

impl Temperature {
    /// All temperatures, hottest first - the order the UI renders.
    pub const ALL: [Self; 4] = [Self::Hot, Self::Warm, Self::Cold, Self::Iced];

    /// The label shown to users and stored in order documents.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Hot => "Hot",
            Self::Warm => "Warm",
            Self::Cold => "Cold",
            Self::Iced => "Iced",
        }
    }
}

impl std::fmt::Display for Temperature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_first_in_list() {
        assert_eq!(Temperature::default(), Temperature::ALL[0]);
    }

    #[test]
    fn test_serialized_as_capitalized_string() {
        let json = serde_json::to_string(&Temperature::Hot).unwrap();
        assert_eq!(json, "\"Hot\"");

        let back: Temperature = serde_json::from_str("\"Iced\"").unwrap();
        assert_eq!(back, Temperature::Iced);
    }

    #[test]
    fn test_ordered_hottest_first() {
        assert!(Temperature::Hot < Temperature::Iced);
    }
}
