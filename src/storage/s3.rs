//! AWS S3 storage implementation.
//!
//! Stores the snapshot as a single object at
//! `s3://{bucket}/{artifacts_folder}/{file_name}`.

use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::primitives::ByteStream;

use crate::error::{AppError, Result};
use crate::models::{ListingSet, StorageConfig};
use crate::storage::SnapshotStore;

/// Build an S3 client from the default AWS environment.
pub async fn client_from_env() -> Client {
    let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    Client::new(&config)
}

/// S3-based snapshot storage.
#[derive(Clone)]
pub struct S3Storage {
    client: Client,
    bucket: String,
    key: String,
}

impl S3Storage {
    /// Create a new S3 storage instance.
    pub fn new(client: Client, bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
            key: key.into(),
        }
    }

    /// Create S3 storage for the configured bucket and artifacts folder.
    pub async fn from_config(config: &StorageConfig) -> Self {
        Self::new(client_from_env().await, &config.bucket, config.object_key())
    }

    /// Read the snapshot object, returning None if it does not exist.
    async fn read_bytes(&self) -> Result<Option<Vec<u8>>> {
        let result = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(&self.key)
            .send()
            .await;

        match result {
            Ok(output) => {
                let bytes = output.body.collect().await.map_err(AppError::s3)?;
                Ok(Some(bytes.into_bytes().to_vec()))
            }
            Err(err) => {
                let service_err = err.into_service_error();
                if service_err.is_no_such_key() {
                    Ok(None)
                } else {
                    Err(AppError::s3(service_err))
                }
            }
        }
    }
}

#[async_trait]
impl SnapshotStore for S3Storage {
    async fn load(&self) -> Result<ListingSet> {
        match self.read_bytes().await? {
            Some(bytes) => Ok(serde_json::from_slice(&bytes)?),
            None => {
                log::info!("No snapshot at {}, starting empty", self.location());
                Ok(ListingSet::empty())
            }
        }
    }

    async fn save(&self, listings: &ListingSet) -> Result<()> {
        let json = serde_json::to_vec_pretty(listings)?;

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&self.key)
            .body(ByteStream::from(json))
            .content_type("application/json")
            .send()
            .await
            .map_err(AppError::s3)?;

        log::info!(
            "Saved snapshot with {} listings to {}",
            listings.len(),
            self.location()
        );
        Ok(())
    }

    fn location(&self) -> String {
        format!("s3://{}/{}", self.bucket, self.key)
    }
}
