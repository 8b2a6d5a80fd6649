// src/models/mod.rs

//! Domain models for the housing watcher.

mod config;
mod listing;
mod selectors;

// Re-export all public types
pub use config::{Config, MailConfig, SourceConfig, StorageConfig};
pub use listing::{Listing, ListingSet};
pub use selectors::ListingSelectors;
