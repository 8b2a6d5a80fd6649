//! Listing data structures and the persisted snapshot document.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Stands in for an absent area or price inside an identity key.
pub const ABSENT_KEY_PART: &str = "[]";

/// One housing unit scraped from the portal.
///
/// Every field is optional: a field whose selector matched nothing is `None`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Listing {
    #[serde(rename = "Price", default, deserialize_with = "lenient_text")]
    pub price: Option<String>,

    #[serde(rename = "Address", default, deserialize_with = "lenient_text")]
    pub address: Option<String>,

    #[serde(rename = "Area", default, deserialize_with = "lenient_text")]
    pub area: Option<String>,

    #[serde(rename = "Date", default, deserialize_with = "lenient_text")]
    pub date: Option<String>,

    #[serde(rename = "Type", default, deserialize_with = "lenient_text")]
    pub kind: Option<String>,
}

impl Listing {
    /// Identity key used to match listings across runs: area followed by price.
    ///
    /// A price change therefore shows up as one removal and one addition, and
    /// two listings sharing area and price collapse into one entry. An absent
    /// part is written as [`ABSENT_KEY_PART`], which keeps keys compatible with
    /// snapshots written by earlier versions.
    pub fn key(&self) -> String {
        format!(
            "{}{}",
            self.area.as_deref().unwrap_or(ABSENT_KEY_PART),
            self.price.as_deref().unwrap_or(ABSENT_KEY_PART)
        )
    }
}

/// Accepts `null`, strings, numbers and (possibly empty) lists of strings.
///
/// Older snapshots stored raw query results, so an empty list means absent
/// and a non-empty list carries the value in its first element.
fn lenient_text<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(text_of))
}

fn text_of(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Array(items) => items.into_iter().next().and_then(text_of),
        _ => None,
    }
}

/// The full set of listings seen on one fetch, as persisted between runs.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ListingSet {
    /// Number of listing cards on the page. May exceed `choices.len()` when
    /// several cards share an identity key.
    #[serde(rename = "Available", default)]
    pub available: usize,

    /// Listings by identity key.
    #[serde(rename = "Choices", default)]
    pub choices: BTreeMap<String, Listing>,
}

impl ListingSet {
    /// An empty set, used when no snapshot exists yet.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a set from scraped listings. Later listings win on key collisions.
    pub fn from_listings(listings: impl IntoIterator<Item = Listing>) -> Self {
        let mut set = Self::empty();
        for listing in listings {
            set.insert(listing);
        }
        set
    }

    /// Count one card and store it under its identity key.
    pub fn insert(&mut self, listing: Listing) {
        self.available += 1;
        self.choices.insert(listing.key(), listing);
    }

    pub fn get(&self, key: &str) -> Option<&Listing> {
        self.choices.get(key)
    }

    pub fn len(&self) -> usize {
        self.choices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.choices.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(area: &str, price: &str) -> Listing {
        Listing {
            price: Some(price.to_string()),
            address: Some(format!("{area} street 1")),
            area: Some(area.to_string()),
            date: Some("01.09.2025".to_string()),
            kind: Some("Room".to_string()),
        }
    }

    #[test]
    fn key_concatenates_area_and_price() {
        assert_eq!(listing("Aarhus C", "4.500 kr").key(), "Aarhus C4.500 kr");
    }

    #[test]
    fn key_with_absent_parts() {
        let mut l = listing("Aarhus N", "3.900 kr");
        l.price = None;
        assert_eq!(l.key(), "Aarhus N[]");
        l.area = None;
        assert_eq!(l.key(), "[][]");
    }

    #[test]
    fn swapped_absent_parts_give_distinct_keys() {
        let price_only = Listing {
            price: Some("X".to_string()),
            ..Listing::default()
        };
        let area_only = Listing {
            area: Some("X".to_string()),
            ..Listing::default()
        };
        assert_eq!(price_only.key(), "[]X");
        assert_eq!(area_only.key(), "X[]");

        let set = ListingSet::from_listings(vec![price_only, area_only]);
        assert_eq!(set.available, 2);
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn legacy_key_matches_reparsed_listing() {
        let json = r#"{
            "Available": 1,
            "Choices": {
                "[]4.500 kr.": {"Price": "4.500 kr.", "Address": "Nørregade 1", "Area": [], "Date": null, "Type": null}
            }
        }"#;
        let stored: ListingSet = serde_json::from_str(json).unwrap();
        let (key, listing) = stored.choices.iter().next().unwrap();
        assert_eq!(listing.key(), *key);
    }

    #[test]
    fn colliding_keys_collapse_but_are_counted() {
        let set = ListingSet::from_listings(vec![
            listing("Aarhus C", "4.500 kr"),
            listing("Aarhus C", "4.500 kr"),
            listing("Risskov", "3.100 kr"),
        ]);
        assert_eq!(set.available, 3);
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn serializes_with_portal_field_names() {
        let set = ListingSet::from_listings(vec![Listing {
            price: Some("4.500 kr".into()),
            area: Some("Aarhus C".into()),
            ..Listing::default()
        }]);
        let json: Value = serde_json::to_value(&set).unwrap();
        assert_eq!(json["Available"], 1);
        let choice = &json["Choices"]["Aarhus C4.500 kr"];
        assert_eq!(choice["Price"], "4.500 kr");
        assert_eq!(choice["Area"], "Aarhus C");
        assert!(choice["Address"].is_null());
        assert!(choice["Type"].is_null());
    }

    #[test]
    fn json_round_trip_preserves_set() {
        let mut partial = listing("Viby J", "2.800 kr");
        partial.date = None;
        let set = ListingSet::from_listings(vec![listing("Aarhus C", "4.500 kr"), partial]);

        let json = serde_json::to_string(&set).unwrap();
        let back: ListingSet = serde_json::from_str(&json).unwrap();
        assert_eq!(back, set);
    }

    #[test]
    fn loads_legacy_field_shapes() {
        let json = r#"{
            "Available": 2,
            "Choices": {
                "Aarhus C4500": {"Price": 4500, "Address": [], "Area": "Aarhus C", "Date": ["01.09.2025"]},
                "[]": {"Price": [], "Area": [], "Type": null}
            }
        }"#;
        let set: ListingSet = serde_json::from_str(json).unwrap();
        let first = set.get("Aarhus C4500").unwrap();
        assert_eq!(first.price.as_deref(), Some("4500"));
        assert_eq!(first.address, None);
        assert_eq!(first.date.as_deref(), Some("01.09.2025"));
        assert_eq!(first.kind, None);
        assert_eq!(set.get("[]").unwrap(), &Listing::default());
    }

    #[test]
    fn empty_document_loads_as_empty_set() {
        let set: ListingSet = serde_json::from_str("{}").unwrap();
        assert!(set.is_empty());
        assert_eq!(set.available, 0);
    }
}
