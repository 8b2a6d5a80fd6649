//! One-shot setup of the artifacts bucket.
//!
//! - [`Provisioner::create_bucket`]: private bucket, public access blocked,
//!   TLS-only policy, default AES256 encryption.
//! - [`Provisioner::prepare_folders`]: folder markers for the artifact
//!   folders and an expiry rule for temporary artifacts.

use aws_sdk_s3::Client;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{
    BucketCannedAcl, BucketLifecycleConfiguration, BucketLocationConstraint,
    CreateBucketConfiguration, ExpirationStatus, LifecycleExpiration, LifecycleRule,
    PublicAccessBlockConfiguration, ServerSideEncryption, ServerSideEncryptionByDefault,
    ServerSideEncryptionConfiguration, ServerSideEncryptionRule,
};

use crate::error::{AppError, Result};
use crate::models::StorageConfig;

/// Lifecycle rule id for temporary artifacts.
pub const TEMP_EXPIRY_RULE_ID: &str = "DeleteUploadTasksAfter10Days";

/// Bucket policy denying every request not made over TLS.
pub fn deny_insecure_transport_policy(bucket: &str) -> serde_json::Value {
    serde_json::json!({
        "Version": "2012-10-17",
        "Statement": [
            {
                "Sid": "DenyAllPublicAccess",
                "Effect": "Deny",
                "Principal": "*",
                "Action": "s3:*",
                "Resource": [
                    format!("arn:aws:s3:::{bucket}"),
                    format!("arn:aws:s3:::{bucket}/*"),
                ],
                "Condition": {
                    "Bool": { "aws:SecureTransport": "false" }
                }
            }
        ]
    })
}

/// Folder prefix with exactly one trailing slash.
pub fn folder_prefix(folder: &str) -> String {
    format!("{}/", folder.trim_end_matches('/'))
}

/// Sets up the artifacts bucket.
pub struct Provisioner {
    client: Client,
    config: StorageConfig,
}

impl Provisioner {
    pub fn new(client: Client, config: StorageConfig) -> Self {
        Self { client, config }
    }

    /// Create a provisioner using the default AWS environment.
    pub async fn from_env(config: StorageConfig) -> Self {
        Self::new(super::s3::client_from_env().await, config)
    }

    /// Create the bucket and lock it down.
    pub async fn create_bucket(&self) -> Result<()> {
        let bucket = &self.config.bucket;

        let location = CreateBucketConfiguration::builder()
            .location_constraint(BucketLocationConstraint::from(self.config.region.as_str()))
            .build();
        self.client
            .create_bucket()
            .acl(BucketCannedAcl::Private)
            .bucket(bucket)
            .create_bucket_configuration(location)
            .object_lock_enabled_for_bucket(false)
            .send()
            .await
            .map_err(AppError::s3)?;
        log::info!("Created bucket {} in {}", bucket, self.config.region);

        let block = PublicAccessBlockConfiguration::builder()
            .block_public_acls(true)
            .ignore_public_acls(true)
            .block_public_policy(true)
            .restrict_public_buckets(true)
            .build();
        self.client
            .put_public_access_block()
            .bucket(bucket)
            .public_access_block_configuration(block)
            .send()
            .await
            .map_err(AppError::s3)?;
        log::info!("Blocked public access on {}", bucket);

        let policy = deny_insecure_transport_policy(bucket);
        self.client
            .put_bucket_policy()
            .bucket(bucket)
            .policy(policy.to_string())
            .send()
            .await
            .map_err(AppError::s3)?;
        log::info!("Attached TLS-only policy to {}", bucket);

        let default_encryption = ServerSideEncryptionByDefault::builder()
            .sse_algorithm(ServerSideEncryption::Aes256)
            .build()
            .map_err(AppError::s3)?;
        let rule = ServerSideEncryptionRule::builder()
            .apply_server_side_encryption_by_default(default_encryption)
            .bucket_key_enabled(true)
            .build();
        let encryption = ServerSideEncryptionConfiguration::builder()
            .rules(rule)
            .build()
            .map_err(AppError::s3)?;
        self.client
            .put_bucket_encryption()
            .bucket(bucket)
            .server_side_encryption_configuration(encryption)
            .send()
            .await
            .map_err(AppError::s3)?;
        log::info!("Enabled default AES256 encryption on {}", bucket);

        Ok(())
    }

    /// Create folder markers and the temporary-artifact expiry rule.
    pub async fn prepare_folders(&self) -> Result<()> {
        let bucket = &self.config.bucket;

        for folder in [&self.config.artifacts_folder, &self.config.temp_artifacts_folder] {
            let key = folder_prefix(folder);
            self.client
                .put_object()
                .bucket(bucket)
                .key(&key)
                .body(ByteStream::from_static(b""))
                .send()
                .await
                .map_err(AppError::s3)?;
            log::info!("Created folder s3://{}/{}", bucket, key);
        }

        let temp_prefix = folder_prefix(&self.config.temp_artifacts_folder);
        #[allow(deprecated)]
        let rule = LifecycleRule::builder()
            .id(TEMP_EXPIRY_RULE_ID)
            .prefix(&temp_prefix)
            .status(ExpirationStatus::Enabled)
            .expiration(
                LifecycleExpiration::builder()
                    .days(self.config.temp_expiration_days)
                    .build(),
            )
            .build()
            .map_err(AppError::s3)?;
        let lifecycle = BucketLifecycleConfiguration::builder()
            .rules(rule)
            .build()
            .map_err(AppError::s3)?;
        self.client
            .put_bucket_lifecycle_configuration()
            .bucket(bucket)
            .lifecycle_configuration(lifecycle)
            .send()
            .await
            .map_err(AppError::s3)?;
        log::info!(
            "Objects under s3://{}/{} now expire after {} days",
            bucket,
            temp_prefix,
            self.config.temp_expiration_days
        );

        Ok(())
    }
}
