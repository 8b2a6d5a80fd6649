//! Storage abstractions for the listing snapshot.
//!
//! The snapshot is a single document holding the last delivered
//! [`ListingSet`]. There is no history: every successful run overwrites it.
//!
//! ## Layout
//!
//! ```text
//! {artifacts}/
//! └── student_housing_aarhus_prev_results.json
//! ```
//!
//! `{artifacts}` is a local directory ([`LocalStorage`]) or, with the `s3`
//! feature, a folder in the artifacts bucket (`S3Storage`).

pub mod local;
#[cfg(feature = "s3")]
pub mod provision;
#[cfg(feature = "s3")]
pub mod s3;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::ListingSet;

// Re-export for convenience
pub use local::LocalStorage;
#[cfg(feature = "s3")]
pub use s3::S3Storage;

/// Single-slot storage for the last delivered listing set.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Load the stored set, or an empty set when nothing has been saved yet.
    async fn load(&self) -> Result<ListingSet>;

    /// Replace the stored set with `listings`.
    async fn save(&self, listings: &ListingSet) -> Result<()>;

    /// Human-readable location, for logs.
    fn location(&self) -> String;
}
