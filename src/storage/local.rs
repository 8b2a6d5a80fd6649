//! Local filesystem storage implementation.
//!
//! Keeps the snapshot as pretty-printed JSON under the artifacts directory.
//! Writes go to a temporary file first and are renamed into place, so a
//! crash mid-write leaves the previous snapshot intact.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::models::{ListingSet, StorageConfig};
use crate::storage::SnapshotStore;

/// Local filesystem storage backend.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    path: PathBuf,
}

impl LocalStorage {
    /// Create a LocalStorage for the snapshot file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Create a LocalStorage at the configured artifacts location.
    pub fn from_config(config: &StorageConfig) -> Self {
        Self::new(config.local_path())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Ensure parent directory exists.
    async fn ensure_dir(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        Ok(())
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn write_bytes(&self, bytes: &[u8]) -> Result<()> {
        self.ensure_dir().await?;

        let tmp = self.path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }

    /// Read bytes, returning None if file doesn't exist.
    async fn read_bytes(&self) -> Result<Option<Vec<u8>>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Io(e)),
        }
    }
}

#[async_trait]
impl SnapshotStore for LocalStorage {
    async fn load(&self) -> Result<ListingSet> {
        match self.read_bytes().await? {
            Some(bytes) => {
                let listings: ListingSet = serde_json::from_slice(&bytes)?;
                log::debug!(
                    "Loaded snapshot with {} listings from {}",
                    listings.len(),
                    self.path.display()
                );
                Ok(listings)
            }
            None => {
                log::info!("No snapshot at {}, starting empty", self.path.display());
                Ok(ListingSet::empty())
            }
        }
    }

    async fn save(&self, listings: &ListingSet) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(listings)?;
        self.write_bytes(&bytes).await?;
        log::info!(
            "Saved snapshot with {} listings to {}",
            listings.len(),
            self.path.display()
        );
        Ok(())
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Listing;
    use tempfile::TempDir;

    fn sample_set() -> ListingSet {
        ListingSet::from_listings(vec![
            Listing {
                price: Some("4.500 kr.".into()),
                address: Some("Nørregade 1 & 2".into()),
                area: Some("Aarhus C".into()),
                date: Some("01.09.2025".into()),
                kind: Some("Room".into()),
            },
            Listing {
                price: Some("3.100 kr.".into()),
                area: Some("Risskov".into()),
                ..Listing::default()
            },
        ])
    }

    #[tokio::test]
    async fn load_missing_snapshot_is_empty() {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path().join("artifacts/snapshot.json"));

        let loaded = storage.load().await.unwrap();
        assert_eq!(loaded, ListingSet::empty());
    }

    #[tokio::test]
    async fn save_then_load_round_trips() {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path().join("artifacts/snapshot.json"));
        let set = sample_set();

        storage.save(&set).await.unwrap();
        let loaded = storage.load().await.unwrap();

        assert_eq!(loaded, set);
        assert!(!dir.path().join("artifacts/snapshot.tmp").exists());
    }

    #[tokio::test]
    async fn save_overwrites_wholesale() {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path().join("snapshot.json"));

        storage.save(&sample_set()).await.unwrap();
        storage.save(&ListingSet::empty()).await.unwrap();

        assert!(storage.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn corrupt_snapshot_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("snapshot.json");
        std::fs::write(&path, "{ not json").unwrap();

        let storage = LocalStorage::new(&path);
        assert!(matches!(storage.load().await, Err(AppError::Json(_))));
    }

    #[tokio::test]
    async fn writes_documented_format() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("snapshot.json");
        let storage = LocalStorage::new(&path);

        storage.save(&sample_set()).await.unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["Available"], 2);
        assert_eq!(raw["Choices"]["Risskov3.100 kr."]["Price"], "3.100 kr.");
        assert!(raw["Choices"]["Risskov3.100 kr."]["Date"].is_null());
    }

    #[test]
    fn from_config_uses_artifacts_dir() {
        let storage = LocalStorage::from_config(&StorageConfig::default());
        assert_eq!(
            storage.path(),
            Path::new("artifacts/student_housing_aarhus_prev_results.json")
        );
    }
}
