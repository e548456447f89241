//! Publishing a staged release: object uploads then catalog registration.

use crate::catalog::{Catalog, ProductPayload};
use crate::error::{Error, Result};
use crate::retry::RetryPolicy;
use crate::storage::ObjectStore;
use crate::upload::Uploader;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use wpstage_builder::{RemoteKeys, ARCHIVE_NAME, BANNER_NAME, SOURCE_DIR, TREE_NAME};
use wpstage_config::StorageSettings;
use wpstage_core::PackageKind;

/// A staged release and the product facts registered with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishRequest {
    pub kind: PackageKind,
    pub slug: String,
    pub version: String,
    pub name: String,
    pub author: Option<String>,
    pub author_url: Option<String>,
    /// `<staging>/<type>/<slug>/<version>`
    pub version_dir: PathBuf,
}

/// What a publish stored and registered.
#[derive(Debug, Clone)]
pub struct PublishReceipt {
    pub archive_key: String,
    pub tree_key: Option<String>,
    pub banner_url: Option<String>,
    pub source_files: usize,
    pub product: ProductPayload,
}

/// Uploads release artifacts and registers the product.
#[derive(Clone)]
pub struct Publisher {
    uploader: Uploader,
    catalog: Arc<dyn Catalog>,
    private_bucket: String,
    public_bucket: String,
    public_base_url: Option<String>,
}

impl Publisher {
    pub fn new(store: Arc<dyn ObjectStore>, catalog: Arc<dyn Catalog>) -> Self {
        let defaults = StorageSettings::default();
        Self {
            uploader: Uploader::new(store),
            catalog,
            private_bucket: defaults.private_bucket,
            public_bucket: defaults.public_bucket,
            public_base_url: None,
        }
    }

    /// Buckets, public URL base, concurrency and retry from `[storage]`.
    pub fn from_settings(
        store: Arc<dyn ObjectStore>,
        catalog: Arc<dyn Catalog>,
        settings: &StorageSettings,
    ) -> Self {
        Self {
            uploader: Uploader::new(store)
                .with_concurrency(settings.upload_concurrency)
                .with_retry(RetryPolicy::from_settings(settings)),
            catalog,
            private_bucket: settings.private_bucket.clone(),
            public_bucket: settings.public_bucket.clone(),
            public_base_url: settings.public_base_url.clone(),
        }
    }

    pub fn with_buckets(mut self, private: impl Into<String>, public: impl Into<String>) -> Self {
        self.private_bucket = private.into();
        self.public_bucket = public.into();
        self
    }

    pub fn with_public_base_url(mut self, base: impl Into<String>) -> Self {
        self.public_base_url = Some(base.into());
        self
    }

    /// URL a public object is served from.
    pub fn public_url(&self, key: &str) -> String {
        match &self.public_base_url {
            Some(base) => format!("{}/{}", base.trim_end_matches('/'), key),
            None => self.uploader.store().locate(&self.public_bucket, key),
        }
    }

    /// Upload `download.zip`, `tree.json`, `banner.png` and `source/` (the
    /// last three when present), then register the product.
    ///
    /// Nothing is registered unless every upload succeeded.
    pub async fn publish(&self, request: &PublishRequest) -> Result<PublishReceipt> {
        let keys = RemoteKeys::new(request.kind, &request.slug, &request.version)?;
        let dir = &request.version_dir;

        let archive_path = dir.join(ARCHIVE_NAME);
        if !archive_path.is_file() {
            return Err(Error::FileMissing(archive_path));
        }

        info!(slug = %request.slug, version = %request.version, "publishing release");

        let archive_key = keys.archive();
        self.uploader
            .upload_file(&self.private_bucket, &archive_key, &archive_path, "application/zip")
            .await?;

        let tree_path = dir.join(TREE_NAME);
        let tree_key = if tree_path.is_file() {
            let key = keys.tree();
            self.uploader
                .upload_file(&self.private_bucket, &key, &tree_path, "application/json")
                .await?;
            Some(key)
        } else {
            None
        };

        let banner_path = dir.join(BANNER_NAME);
        let banner_url = if banner_path.is_file() {
            let key = keys.banner();
            self.uploader
                .upload_file(&self.public_bucket, &key, &banner_path, "image/png")
                .await?;
            Some(self.public_url(&key))
        } else {
            None
        };

        let source_path = dir.join(SOURCE_DIR);
        let source_files = if source_path.is_dir() {
            let prefix = format!("{}/{}", keys.prefix(), SOURCE_DIR);
            let report = self
                .uploader
                .upload_dir(&self.private_bucket, &prefix, &source_path)
                .await?;
            for (key, err) in &report.failed {
                warn!(key = %key, error = %err, "source file not published");
            }
            report.into_result()?.len()
        } else {
            0
        };

        let mut product =
            ProductPayload::new(request.kind, &request.slug, &request.name, &request.version);
        product.author = request.author.clone();
        product.author_url = request.author_url.clone();
        product.download_url = archive_key.clone();
        product.image = banner_url.clone();

        self.catalog.publish_product(&product).await?;
        info!(
            slug = %request.slug,
            version = %request.version,
            source_files,
            "release published"
        );

        Ok(PublishReceipt {
            archive_key,
            tree_key,
            banner_url,
            source_files,
            product,
        })
    }
}
