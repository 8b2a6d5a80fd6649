//! Application configuration structures.

use std::fs;
use std::path::{Path, PathBuf};

use scraper::Selector;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::ListingSelectors;

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Listings page and HTTP behavior
    #[serde(default)]
    pub source: SourceConfig,

    /// Snapshot location (local artifacts directory or S3 bucket)
    #[serde(default)]
    pub storage: StorageConfig,

    /// Mail relay settings
    #[serde(default)]
    pub mail: MailConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        url::Url::parse(&self.source.url)?;
        if self.source.user_agent.trim().is_empty() {
            return Err(AppError::validation("source.user_agent is empty"));
        }
        if self.source.timeout_secs == 0 {
            return Err(AppError::validation("source.timeout_secs must be > 0"));
        }
        for (name, selector) in self.source.selectors.named() {
            Selector::parse(selector).map_err(|e| {
                AppError::selector(selector, format!("source.selectors.{name}: {e:?}"))
            })?;
        }
        if self.storage.file_name.trim().is_empty() {
            return Err(AppError::validation("storage.file_name is empty"));
        }
        if self.storage.bucket.trim().is_empty() {
            return Err(AppError::validation("storage.bucket is empty"));
        }
        if self.storage.artifacts_folder == self.storage.temp_artifacts_folder {
            return Err(AppError::validation(
                "storage.artifacts_folder and storage.temp_artifacts_folder must differ",
            ));
        }
        if self.mail.smtp_host.trim().is_empty() {
            return Err(AppError::validation("mail.smtp_host is empty"));
        }
        Ok(())
    }
}

/// Listings page and HTTP client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Page listing all available housing
    #[serde(default = "defaults::portal_url")]
    pub url: String,

    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Card and field selectors
    #[serde(default)]
    pub selectors: ListingSelectors,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url: defaults::portal_url(),
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            selectors: ListingSelectors::default(),
        }
    }
}

/// Where the snapshot lives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Local artifacts directory, relative to the working directory
    #[serde(default = "defaults::artifacts_dir")]
    pub artifacts_dir: PathBuf,

    /// Snapshot document name
    #[serde(default = "defaults::file_name")]
    pub file_name: String,

    /// Artifacts bucket
    #[serde(default = "defaults::bucket")]
    pub bucket: String,

    /// Region the bucket is created in
    #[serde(default = "defaults::region")]
    pub region: String,

    /// Folder holding long-lived artifacts such as the snapshot
    #[serde(default = "defaults::artifacts_folder")]
    pub artifacts_folder: String,

    /// Folder whose objects expire after `temp_expiration_days`
    #[serde(default = "defaults::temp_artifacts_folder")]
    pub temp_artifacts_folder: String,

    #[serde(default = "defaults::temp_expiration_days")]
    pub temp_expiration_days: i32,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            artifacts_dir: defaults::artifacts_dir(),
            file_name: defaults::file_name(),
            bucket: defaults::bucket(),
            region: defaults::region(),
            artifacts_folder: defaults::artifacts_folder(),
            temp_artifacts_folder: defaults::temp_artifacts_folder(),
            temp_expiration_days: defaults::temp_expiration_days(),
        }
    }
}

impl StorageConfig {
    /// Snapshot path on the local filesystem.
    pub fn local_path(&self) -> PathBuf {
        self.artifacts_dir.join(&self.file_name)
    }

    /// Snapshot object key in the bucket.
    pub fn object_key(&self) -> String {
        format!(
            "{}/{}",
            self.artifacts_folder.trim_end_matches('/'),
            self.file_name
        )
    }
}

/// Mail relay settings. Credentials are read from the environment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailConfig {
    /// SMTP relay host, reached over implicit TLS
    #[serde(default = "defaults::smtp_host")]
    pub smtp_host: String,

    #[serde(default = "defaults::smtp_port")]
    pub smtp_port: u16,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            smtp_host: defaults::smtp_host(),
            smtp_port: defaults::smtp_port(),
        }
    }
}

mod defaults {
    use std::path::PathBuf;

    // Source defaults
    pub fn portal_url() -> String {
        "https://studenthousingaarhus.com/all-available-housing".into()
    }
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; housing-watch/0.1)".into()
    }
    pub fn timeout() -> u64 {
        30
    }

    // Storage defaults
    pub fn artifacts_dir() -> PathBuf {
        PathBuf::from("artifacts")
    }
    pub fn file_name() -> String {
        "student_housing_aarhus_prev_results.json".into()
    }
    pub fn bucket() -> String {
        "workflow-automation-artifacts".into()
    }
    pub fn region() -> String {
        "eu-north-1".into()
    }
    pub fn artifacts_folder() -> String {
        "artifacts".into()
    }
    pub fn temp_artifacts_folder() -> String {
        "temp-artifacts".into()
    }
    pub fn temp_expiration_days() -> i32 {
        10
    }

    // Mail defaults
    pub fn smtp_host() -> String {
        "smtp.gmail.com".into()
    }
    pub fn smtp_port() -> u16 {
        465
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_default_config_ok() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn validate_rejects_empty_user_agent() {
        let mut config = Config::default();
        config.source.user_agent = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_bad_url() {
        let mut config = Config::default();
        config.source.url = "not a url".to_string();
        assert!(matches!(config.validate(), Err(AppError::Url(_))));
    }

    #[test]
    fn validate_rejects_bad_selector() {
        let mut config = Config::default();
        config.source.selectors.date = "div[[".to_string();
        assert!(matches!(
            config.validate(),
            Err(AppError::Selector { .. })
        ));
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config: Config = toml::from_str(
            r#"
            [storage]
            artifacts_dir = "state"

            [source.selectors]
            card = "div.card"
            "#,
        )
        .unwrap();
        assert_eq!(config.storage.artifacts_dir, PathBuf::from("state"));
        assert_eq!(config.storage.file_name, defaults::file_name());
        assert_eq!(config.source.selectors.card, "div.card");
        assert_eq!(
            config.source.selectors.price,
            ListingSelectors::default().price
        );
        assert_eq!(config.mail.smtp_port, 465);
    }

    #[test]
    fn snapshot_locations() {
        let storage = StorageConfig::default();
        assert_eq!(
            storage.local_path(),
            PathBuf::from("artifacts/student_housing_aarhus_prev_results.json")
        );
        assert_eq!(
            storage.object_key(),
            "artifacts/student_housing_aarhus_prev_results.json"
        );
    }

    #[test]
    fn load_or_default_falls_back_on_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_default(dir.path().join("missing.toml"));
        assert_eq!(config.source.url, defaults::portal_url());
    }

    #[test]
    fn load_reports_malformed_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[source\nurl = ").unwrap();

        assert!(matches!(Config::load(&path), Err(AppError::Toml(_))));
        assert_eq!(Config::load_or_default(&path).source.url, defaults::portal_url());
    }
}
