//! Image asset migration.
//!
//! [`AssetMigrator::migrate`] copies a source image into the catalog bucket and
//! returns the bucket's view URL. It never fails: any problem yields
//! [`AssetMigration::Fallback`] carrying the original URL. Callers report the
//! outcome against the entity the image belongs to.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use reqwest::header::CONTENT_TYPE;
use tracing::debug;
use url::Url;

use menuseed_client::{BlobStore, CatalogStore};
use menuseed_proto::{BucketRef, FileId, FileUpload, DEFAULT_CONTENT_TYPE};

use crate::error::AssetMigrationError;

/// Binary content fetched from a source URL.
#[derive(Debug, Clone)]
pub struct FetchedAsset {
    pub data: Bytes,
    /// Content type reported by the source, if any.
    pub content_type: Option<String>,
}

/// Fetches source images.
#[async_trait]
pub trait AssetFetcher: Send + Sync {
    /// Fetch the content at `url`.
    async fn fetch(&self, url: &str) -> Result<FetchedAsset, AssetMigrationError>;
}

/// Fetches images over HTTP.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    http: reqwest::Client,
}

impl HttpFetcher {
    /// Create a fetcher with the given request timeout.
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { http })
    }
}

#[async_trait]
impl AssetFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedAsset, AssetMigrationError> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| AssetMigrationError::Fetch(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AssetMigrationError::Status(status.as_u16()));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let data = response
            .bytes()
            .await
            .map_err(|e| AssetMigrationError::Fetch(e.to_string()))?;

        Ok(FetchedAsset { data, content_type })
    }
}

/// Outcome of migrating one image.
#[derive(Debug)]
pub enum AssetMigration {
    /// The image now lives in the bucket.
    Migrated { file_id: String, url: String },
    /// The image keeps its source URL.
    Fallback {
        url: String,
        reason: AssetMigrationError,
    },
}

impl AssetMigration {
    /// URL to store on the menu row.
    pub fn url(&self) -> &str {
        match self {
            AssetMigration::Migrated { url, .. } | AssetMigration::Fallback { url, .. } => url,
        }
    }

    /// Whether the image was copied into the bucket.
    pub fn is_migrated(&self) -> bool {
        matches!(self, AssetMigration::Migrated { .. })
    }

    /// Why the image kept its source URL.
    pub fn diagnostic(&self) -> Option<&AssetMigrationError> {
        match self {
            AssetMigration::Migrated { .. } => None,
            AssetMigration::Fallback { reason, .. } => Some(reason),
        }
    }
}

/// Copies images into the catalog bucket.
pub struct AssetMigrator {
    store: Arc<dyn CatalogStore>,
    /// `None` disables migration.
    fetcher: Option<Arc<dyn AssetFetcher>>,
    bucket: BucketRef,
}

impl AssetMigrator {
    /// Create a migrator that uploads into `bucket`.
    pub fn new(
        store: Arc<dyn CatalogStore>,
        fetcher: Arc<dyn AssetFetcher>,
        bucket: BucketRef,
    ) -> Self {
        Self {
            store,
            fetcher: Some(fetcher),
            bucket,
        }
    }

    /// Create a migrator that keeps every source URL.
    pub fn disabled(store: Arc<dyn CatalogStore>, bucket: BucketRef) -> Self {
        Self {
            store,
            fetcher: None,
            bucket,
        }
    }

    /// Migrate the image at `source_url`.
    pub async fn migrate(&self, source_url: &str) -> AssetMigration {
        let Some(fetcher) = &self.fetcher else {
            return fallback(source_url, AssetMigrationError::Disabled);
        };

        debug!(url = source_url, "fetching image");
        let asset = match fetcher.fetch(source_url).await {
            Ok(asset) => asset,
            Err(reason) => {
                debug!(url = source_url, reason = %reason, "image fetch failed");
                return fallback(source_url, reason);
            }
        };

        let content_type = asset
            .content_type
            .filter(|content_type| !content_type.is_empty())
            .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string());
        let upload = FileUpload::new(derive_file_name(source_url), content_type, asset.data);
        debug!(
            name = %upload.name,
            size = upload.len(),
            content_type = %upload.content_type,
            "uploading image"
        );

        match self.store.create_file(&self.bucket, FileId::Unique, upload).await {
            Ok(file) => {
                let url = self.store.file_view_url(&self.bucket, &file.id);
                debug!(file_id = %file.id, "image uploaded");
                AssetMigration::Migrated {
                    file_id: file.id,
                    url,
                }
            }
            Err(e) => {
                debug!(url = source_url, error = %e, "image upload failed");
                fallback(source_url, AssetMigrationError::Upload(e))
            }
        }
    }
}

fn fallback(source_url: &str, reason: AssetMigrationError) -> AssetMigration {
    AssetMigration::Fallback {
        url: source_url.to_string(),
        reason,
    }
}

/// File name for an uploaded image: the URL's last path segment, or a
/// timestamped name when the URL has none.
pub fn derive_file_name(source_url: &str) -> String {
    let segment = match Url::parse(source_url) {
        Ok(url) => url
            .path_segments()
            .and_then(|segments| segments.last())
            .map(str::to_string),
        Err(_) => source_url
            .split(['?', '#'])
            .next()
            .and_then(|path| path.rsplit('/').next())
            .map(str::to_string),
    };

    segment
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| format!("file-{}.png", Utc::now().timestamp_millis()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use menuseed_client::MemoryCatalog;
    use std::collections::HashMap;

    /// Serves canned responses keyed by URL.
    struct StaticFetcher {
        assets: HashMap<String, FetchedAsset>,
    }

    #[async_trait]
    impl AssetFetcher for StaticFetcher {
        async fn fetch(&self, url: &str) -> Result<FetchedAsset, AssetMigrationError> {
            self.assets
                .get(url)
                .cloned()
                .ok_or(AssetMigrationError::Status(404))
        }
    }

    fn fetcher(url: &str, content_type: Option<&str>) -> Arc<dyn AssetFetcher> {
        let mut assets = HashMap::new();
        assets.insert(
            url.to_string(),
            FetchedAsset {
                data: Bytes::from_static(b"\x89PNG\r\n"),
                content_type: content_type.map(str::to_string),
            },
        );
        Arc::new(StaticFetcher { assets })
    }

    #[test]
    fn test_derive_file_name() {
        assert_eq!(
            derive_file_name("https://cdn.test/images/burger.png?w=200#top"),
            "burger.png"
        );
        assert_eq!(derive_file_name("images/pizza.jpg"), "pizza.jpg");

        let synthesized = derive_file_name("https://cdn.test/");
        assert!(synthesized.starts_with("file-"));
        assert!(synthesized.ends_with(".png"));
    }

    #[tokio::test]
    async fn test_migrate_uploads_and_returns_view_url() {
        let store = Arc::new(MemoryCatalog::new());
        let bucket = BucketRef::new("assets");
        let source = "https://cdn.test/burger.webp";
        let migrator = AssetMigrator::new(store.clone(), fetcher(source, Some("image/webp")), bucket.clone());

        let outcome = migrator.migrate(source).await;
        assert!(outcome.is_migrated());
        assert!(outcome.diagnostic().is_none());

        let files = store.files(&bucket);
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].name, "burger.webp");
        assert_eq!(files[0].mime_type, "image/webp");
        assert_eq!(outcome.url(), store.file_view_url(&bucket, &files[0].id));
    }

    #[tokio::test]
    async fn test_missing_content_type_defaults() {
        let store = Arc::new(MemoryCatalog::new());
        let bucket = BucketRef::new("assets");
        let source = "https://cdn.test/fries.png";
        let migrator = AssetMigrator::new(store.clone(), fetcher(source, None), bucket.clone());

        assert!(migrator.migrate(source).await.is_migrated());
        assert_eq!(store.files(&bucket)[0].mime_type, DEFAULT_CONTENT_TYPE);
    }

    #[tokio::test]
    async fn test_fetch_failure_falls_back() {
        let store = Arc::new(MemoryCatalog::new());
        let bucket = BucketRef::new("assets");
        let migrator = AssetMigrator::new(
            store.clone(),
            fetcher("https://cdn.test/other.png", None),
            bucket.clone(),
        );

        let outcome = migrator.migrate("https://cdn.test/missing.png").await;
        assert_eq!(outcome.url(), "https://cdn.test/missing.png");
        assert!(matches!(
            outcome.diagnostic(),
            Some(AssetMigrationError::Status(404))
        ));
        assert!(store.files(&bucket).is_empty());
    }

    #[tokio::test]
    async fn test_upload_failure_falls_back() {
        let store = Arc::new(MemoryCatalog::new());
        store.fail_file_uploads(1);
        let bucket = BucketRef::new("assets");
        let source = "https://cdn.test/burger.png";
        let migrator = AssetMigrator::new(store.clone(), fetcher(source, None), bucket.clone());

        let outcome = migrator.migrate(source).await;
        assert_eq!(outcome.url(), source);
        assert!(matches!(
            outcome.diagnostic(),
            Some(AssetMigrationError::Upload(_))
        ));
        assert!(store.files(&bucket).is_empty());
    }

    #[tokio::test]
    async fn test_disabled_keeps_source() {
        let store = Arc::new(MemoryCatalog::new());
        let migrator = AssetMigrator::disabled(store.clone(), BucketRef::new("assets"));

        let outcome = migrator.migrate("https://cdn.test/burger.png").await;
        assert_eq!(outcome.url(), "https://cdn.test/burger.png");
        assert!(matches!(
            outcome.diagnostic(),
            Some(AssetMigrationError::Disabled)
        ));
    }
}
