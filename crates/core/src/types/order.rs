//! Persisted beverage orders.

use serde::{Deserialize, Serialize};

use super::catalog::CatalogOption;
use super::id::{OrderId, UserId};
use super::temperature::Temperature;

/// A saved beverage order.
///
/// Created only through the store's submit path and immutable after
/// creation - there is no update operation. Owned by exactly one identity;
/// `owner_id` always equals the identity that created the order.
///
/// On the wire the `id` is the remote document key (system-generated) and
/// the owner is carried under the store's configured filter field, so both
/// are `serde(skip)` here; the remaining fields form the document body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(skip)]
    pub id: OrderId,
    pub name: String,
    pub temperature: Temperature,
    pub base: CatalogOption,
    pub syrup: CatalogOption,
    pub creamer: CatalogOption,
    #[serde(skip)]
    pub owner_id: UserId,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sample() -> Order {
        Order {
            id: OrderId::new("abc"),
            name: "Mocha".to_owned(),
            temperature: Temperature::Hot,
            base: CatalogOption::new("cf", "Coffee", "#4a2c17"),
            syrup: CatalogOption::new("ch", "Chocolate", "#3b1f0e"),
            creamer: CatalogOption::new("mk", "Whole Milk", "#f5f1e6"),
            owner_id: UserId::new("user-1"),
        }
    }

    #[test]
    fn test_body_excludes_key_and_owner() {
        let json = serde_json::to_value(sample()).unwrap();
        assert!(json.get("id").is_none());
        assert!(json.get("ownerId").is_none());
        assert_eq!(json["temperature"], "Hot");
        assert_eq!(json["base"]["name"], "Coffee");
    }

    #[test]
    fn test_body_round_trip_defaults_skipped_fields() {
        let json = serde_json::to_value(sample()).unwrap();
        let back: Order = serde_json::from_value(json).unwrap();
        // Key and owner travel outside the body; deserialization leaves
        // them empty for the caller to fill in.
        assert_eq!(back.id, OrderId::new(""));
        assert_eq!(back.owner_id, UserId::new(""));
        assert_eq!(back.name, "Mocha");
    }
}
