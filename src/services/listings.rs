// src/services/listings.rs

//! Listing source service.
//!
//! Fetches the housing portal and turns its listing cards into a [`ListingSet`].

use async_trait::async_trait;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};

use crate::error::{AppError, Result};
use crate::models::{Listing, ListingSelectors, ListingSet, SourceConfig};
use crate::utils::{http, normalize_whitespace};

/// Anything that can produce the current set of listings.
#[async_trait]
pub trait ListingSource: Send + Sync {
    async fn fetch(&self) -> Result<ListingSet>;
}

/// Selectors compiled once per source.
#[derive(Debug, Clone)]
struct CardSelectors {
    card: Selector,
    price: Selector,
    area: Selector,
    address: Selector,
    date: Selector,
    kind: Selector,
}

impl CardSelectors {
    fn compile(selectors: &ListingSelectors) -> Result<Self> {
        Ok(Self {
            card: parse_selector(&selectors.card)?,
            price: parse_selector(&selectors.price)?,
            area: parse_selector(&selectors.area)?,
            address: parse_selector(&selectors.address)?,
            date: parse_selector(&selectors.date)?,
            kind: parse_selector(&selectors.kind)?,
        })
    }

    fn listing(&self, card: ElementRef<'_>) -> Listing {
        Listing {
            price: first_text(card, &self.price),
            address: first_text(card, &self.address),
            area: first_text(card, &self.area),
            date: first_text(card, &self.date),
            kind: first_text(card, &self.kind),
        }
    }

    fn parse(&self, html: &str) -> ListingSet {
        let document = Html::parse_document(html);
        ListingSet::from_listings(document.select(&self.card).map(|card| self.listing(card)))
    }
}

/// The Student Housing Aarhus "all available housing" page.
pub struct HousingPortal {
    url: String,
    client: Client,
    selectors: CardSelectors,
}

impl HousingPortal {
    /// Create a portal source from configuration.
    pub fn new(config: &SourceConfig) -> Result<Self> {
        Ok(Self {
            url: config.url.clone(),
            client: http::create_async_client(config)?,
            selectors: CardSelectors::compile(&config.selectors)?,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl ListingSource for HousingPortal {
    async fn fetch(&self) -> Result<ListingSet> {
        log::debug!("Fetching listings from {}", self.url);
        let html = http::fetch_text(&self.client, &self.url).await?;
        let listings = self.selectors.parse(&html);
        log::info!(
            "Found {} listing cards ({} distinct keys)",
            listings.available,
            listings.len()
        );
        Ok(listings)
    }
}

/// Parse a listings page with the given selectors.
pub fn parse_listings(html: &str, selectors: &ListingSelectors) -> Result<ListingSet> {
    Ok(CardSelectors::compile(selectors)?.parse(html))
}

/// Text of the first node under `scope` matching `selector`, or `None` when
/// nothing matches or the match holds no text.
pub fn first_text(scope: ElementRef<'_>, selector: &Selector) -> Option<String> {
    let element = scope.select(selector).next()?;
    let text = normalize_whitespace(&element.text().collect::<String>());
    (!text.is_empty()).then_some(text)
}

fn parse_selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(price: &str, area: &str, extra: &str) -> String {
        format!(
            r#"<div class="avail_apt_small_card">
                <div class="avail-apt-card-rent">{price}</div>
                <div class="avail-apt-card-area">{area}</div>
                {extra}
            </div>"#
        )
    }

    fn page(cards: &[String]) -> String {
        format!(
            "<html><body><div id=\"list\">{}</div></body></html>",
            cards.join("\n")
        )
    }

    #[test]
    fn test_parse_selector_valid() {
        assert!(parse_selector("div.avail-apt-card-rent").is_ok());
        assert!(parse_selector("div:has(span)").is_ok());
    }

    #[test]
    fn test_parse_selector_invalid() {
        assert!(matches!(
            parse_selector("[[invalid"),
            Err(AppError::Selector { .. })
        ));
    }

    #[test]
    fn parses_all_fields() {
        let html = page(&[card(
            "4.500 kr.",
            "Aarhus C",
            r#"<div class="avail-apt-card-address">Nørregade 1</div>
               <div class="avail-apt-card-date">01.09.2025</div>
               <div class="avail-apt-card-type">Room</div>"#,
        )]);
        let set = parse_listings(&html, &ListingSelectors::default()).unwrap();

        assert_eq!(set.available, 1);
        let listing = set.get("Aarhus C4.500 kr.").unwrap();
        assert_eq!(listing.address.as_deref(), Some("Nørregade 1"));
        assert_eq!(listing.date.as_deref(), Some("01.09.2025"));
        assert_eq!(listing.kind.as_deref(), Some("Room"));
    }

    #[test]
    fn missing_fields_are_absent() {
        let html = page(&[card("3.200 kr.", "Viby J", "")]);
        let set = parse_listings(&html, &ListingSelectors::default()).unwrap();

        let listing = set.get("Viby J3.200 kr.").unwrap();
        assert_eq!(listing.address, None);
        assert_eq!(listing.date, None);
        assert_eq!(listing.kind, None);
    }

    #[test]
    fn empty_field_text_is_absent() {
        let html = page(&[card(
            "3.200 kr.",
            "Viby J",
            r#"<div class="avail-apt-card-date">  </div>"#,
        )]);
        let set = parse_listings(&html, &ListingSelectors::default()).unwrap();
        assert_eq!(set.get("Viby J3.200 kr.").unwrap().date, None);
    }

    #[test]
    fn whitespace_is_normalized() {
        let html = page(&[card("\n   4.500\n  kr. ", "  Aarhus   N ", "")]);
        let set = parse_listings(&html, &ListingSelectors::default()).unwrap();
        assert!(set.get("Aarhus N4.500 kr.").is_some());
    }

    #[test]
    fn fields_are_scoped_to_their_card() {
        let html = page(&[
            card("1.000 kr.", "Risskov", ""),
            card(
                "2.000 kr.",
                "Højbjerg",
                r#"<div class="avail-apt-card-type">Studio</div>"#,
            ),
        ]);
        let set = parse_listings(&html, &ListingSelectors::default()).unwrap();
        assert_eq!(set.get("Risskov1.000 kr.").unwrap().kind, None);
        assert_eq!(
            set.get("Højbjerg2.000 kr.").unwrap().kind.as_deref(),
            Some("Studio")
        );
    }

    #[test]
    fn duplicate_keys_collapse_but_count_as_available() {
        let html = page(&[
            card("4.500 kr.", "Aarhus C", ""),
            card("4.500 kr.", "Aarhus C", ""),
        ]);
        let set = parse_listings(&html, &ListingSelectors::default()).unwrap();
        assert_eq!(set.available, 2);
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn price_only_and_area_only_cards_stay_apart() {
        let html = page(&[
            r#"<div class="avail_apt_small_card"><div class="avail-apt-card-rent">X</div></div>"#
                .to_string(),
            r#"<div class="avail_apt_small_card"><div class="avail-apt-card-area">X</div></div>"#
                .to_string(),
        ]);
        let set = parse_listings(&html, &ListingSelectors::default()).unwrap();

        assert_eq!(set.available, 2);
        let keys: Vec<_> = set.choices.keys().cloned().collect();
        assert_eq!(keys, vec!["X[]".to_string(), "[]X".to_string()]);
    }

    #[test]
    fn page_without_cards_is_empty() {
        let set = parse_listings(&page(&[]), &ListingSelectors::default()).unwrap();
        assert!(set.is_empty());
        assert_eq!(set.available, 0);
    }

    #[test]
    fn invalid_configured_selector_is_an_error() {
        let selectors = ListingSelectors {
            price: "div[[".to_string(),
            ..ListingSelectors::default()
        };
        assert!(parse_listings("<html></html>", &selectors).is_err());
    }
}
