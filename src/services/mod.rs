//! Service layer for the housing watcher.
//!
//! - Listing fetching (`HousingPortal`, behind the `ListingSource` trait)

mod listings;

pub use listings::{HousingPortal, ListingSource, first_text, parse_listings};
