// src/models/selectors.rs

//! CSS selectors for scraping the listings page.

use serde::{Deserialize, Serialize};

/// CSS selectors for scraping listing cards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ListingSelectors {
    /// Selector for each listing card on the page
    pub card: String,

    /// Selector for the rent element within a card
    pub price: String,

    /// Selector for the area (neighbourhood) element within a card
    pub area: String,

    /// Selector for the street address element within a card
    pub address: String,

    /// Selector for the move-in date element within a card
    pub date: String,

    /// Selector for the housing type element within a card
    pub kind: String,
}

impl Default for ListingSelectors {
    fn default() -> Self {
        Self {
            card: "div.avail_apt_small_card".to_string(),
            price: "div.avail-apt-card-rent".to_string(),
            area: "div.avail-apt-card-area".to_string(),
            address: "div.avail-apt-card-address".to_string(),
            date: "div.avail-apt-card-date".to_string(),
            kind: "div.avail-apt-card-type".to_string(),
        }
    }
}

impl ListingSelectors {
    /// All selectors paired with their field names, for validation and logging.
    pub fn named(&self) -> [(&'static str, &str); 6] {
        [
            ("card", self.card.as_str()),
            ("price", self.price.as_str()),
            ("area", self.area.as_str()),
            ("address", self.address.as_str()),
            ("date", self.date.as_str()),
            ("kind", self.kind.as_str()),
        ]
    }
}
