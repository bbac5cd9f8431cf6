//! Bundled default catalogs and catalog document mapping.
//!
//! Each catalog kind ships a default option set, used only to seed an
//! empty remote collection on first use. The bundled JSON carries full
//! `{id, name, color}` entries; on the wire the id is the document key and
//! the body holds `{name, color}`.

use std::sync::LazyLock;

use serde::{Deserialize, Serialize};
use serde_json::json;

use copper_kettle_core::{CatalogKind, CatalogOption, OptionId};

use crate::remote::Document;

static BASES: LazyLock<Vec<CatalogOption>> =
    LazyLock::new(|| parse_bundled(include_str!("../data/bases.json"), "bases.json"));
static SYRUPS: LazyLock<Vec<CatalogOption>> =
    LazyLock::new(|| parse_bundled(include_str!("../data/syrups.json"), "syrups.json"));
static CREAMERS: LazyLock<Vec<CatalogOption>> =
    LazyLock::new(|| parse_bundled(include_str!("../data/creamers.json"), "creamers.json"));

#[allow(clippy::expect_used)]
fn parse_bundled(raw: &str, file: &str) -> Vec<CatalogOption> {
    serde_json::from_str(raw).expect(file)
}

/// The bundled default option set for a kind.
#[must_use]
pub fn bundled_defaults(kind: CatalogKind) -> &'static [CatalogOption] {
    match kind {
        CatalogKind::Base => &BASES,
        CatalogKind::Syrup => &SYRUPS,
        CatalogKind::Creamer => &CREAMERS,
    }
}

/// Body shape of a catalog document; the option id is the document key.
#[derive(Debug, Serialize, Deserialize)]
struct OptionBody {
    name: String,
    color: String,
}

/// The document body written when seeding an option.
#[must_use]
pub(crate) fn option_body(option: &CatalogOption) -> serde_json::Value {
    json!({ "name": option.name, "color": option.color })
}

/// Map a remote catalog document to an option: id from the key, name and
/// color from the body.
pub(crate) fn parse_option(doc: &Document) -> Result<CatalogOption, serde_json::Error> {
    let body: OptionBody = serde_json::from_value(doc.data.clone())?;
    Ok(CatalogOption {
        id: OptionId::new(doc.id.clone()),
        name: body.name,
        color: body.color,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_sets_are_non_empty() {
        for kind in CatalogKind::ALL {
            assert!(!bundled_defaults(kind).is_empty(), "{kind} set is empty");
        }
    }

    #[test]
    fn test_bundled_ids_are_unique_per_kind() {
        for kind in CatalogKind::ALL {
            let options = bundled_defaults(kind);
            for (i, option) in options.iter().enumerate() {
                assert!(
                    options[i + 1..].iter().all(|o| o.id != option.id),
                    "duplicate id {} in {kind}",
                    option.id
                );
            }
        }
    }

    #[test]
    fn test_option_document_round_trip() {
        let option = CatalogOption::new("coffee", "Coffee", "#4a2c17");
        let doc = Document::new("coffee", option_body(&option));
        let back = parse_option(&doc).unwrap();
        assert_eq!(back, option);
    }

    #[test]
    fn test_malformed_document_is_an_error() {
        let doc = Document::new("coffee", json!({ "name": "Coffee" }));
        assert!(parse_option(&doc).is_err());
    }
}
