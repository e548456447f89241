//! The product catalog: remote version lookups and product registration.

use crate::client::{join_segments, HttpClient};
use crate::error::{Error, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::fs;
use tracing::{debug, info};
use url::Url;
use wpstage_config::{validate_path_segment, CatalogSettings, TargetEnv};
use wpstage_core::PackageKind;

/// Header carrying the catalog admin secret.
pub const ADMIN_SECRET_HEADER: &str = "x-admin-secret";

/// Body of a product registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPayload {
    pub slug: String,
    pub name: String,
    /// `PLUGIN` or `THEME`
    #[serde(rename = "type")]
    pub kind: String,
    pub author: Option<String>,
    pub author_url: Option<String>,
    pub version: String,
    /// Object key of the release archive
    pub download_url: String,
    /// Public banner URL
    pub image: Option<String>,
}

impl ProductPayload {
    pub fn new(kind: PackageKind, slug: &str, name: &str, version: &str) -> Self {
        Self {
            slug: slug.to_string(),
            name: name.to_string(),
            kind: kind.catalog_label().to_string(),
            author: None,
            author_url: None,
            version: version.to_string(),
            download_url: String::new(),
            image: None,
        }
    }
}

/// Where products are registered and known versions looked up.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Latest published version for `slug`, `None` when the product is
    /// unknown.
    async fn latest_version(&self, slug: &str) -> Result<Option<String>>;

    async fn publish_product(&self, product: &ProductPayload) -> Result<()>;
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RemoteProduct {
    #[serde(alias = "version")]
    latest_version: Option<String>,
}

/// The catalog HTTP API: `GET <base>/<slug>`, `POST <base>`.
#[derive(Debug, Clone)]
pub struct CatalogClient {
    client: HttpClient,
    base_url: Url,
    admin_secret: Option<String>,
    secret_env: String,
}

impl CatalogClient {
    pub fn new(base_url: &str, admin_secret: Option<String>) -> Result<Self> {
        Ok(Self {
            client: HttpClient::with_rate_limit(5, Duration::from_secs(30))?,
            base_url: Url::parse(base_url)?,
            admin_secret,
            secret_env: "WPSTAGE_ADMIN_SECRET".to_string(),
        })
    }

    pub fn from_settings(settings: &CatalogSettings) -> Result<Self> {
        let base_url = settings
            .base_url
            .as_deref()
            .ok_or(Error::MissingSetting("catalog.base_url"))?;

        Ok(Self {
            client: HttpClient::with_rate_limit(
                settings.requests_per_second,
                Duration::from_secs(settings.timeout_secs),
            )?,
            base_url: Url::parse(base_url)?,
            admin_secret: settings.admin_secret(),
            secret_env: settings.admin_secret_env.clone(),
        })
    }
}

#[async_trait]
impl Catalog for CatalogClient {
    async fn latest_version(&self, slug: &str) -> Result<Option<String>> {
        let url = join_segments(&self.base_url, [slug])?;
        let product: Option<RemoteProduct> = self.client.get_json_opt(&url).await?;
        Ok(product.and_then(|p| p.latest_version))
    }

    async fn publish_product(&self, product: &ProductPayload) -> Result<()> {
        let secret = self
            .admin_secret
            .as_deref()
            .ok_or_else(|| Error::MissingSecret(self.secret_env.clone()))?;

        let mut headers = HeaderMap::new();
        let value = HeaderValue::from_str(secret)
            .map_err(|_| Error::other("admin secret is not a valid header value"))?;
        headers.insert(HeaderName::from_static(ADMIN_SECRET_HEADER), value);

        self.client.post_json(&self.base_url, product, headers).await?;
        info!(slug = %product.slug, version = %product.version, "product registered");
        Ok(())
    }
}

/// A published version, as kept by [`LocalCatalog`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogVersion {
    pub version: String,
    pub download_url: String,
    pub updated_on: DateTime<Utc>,
}

/// A product, as kept by [`LocalCatalog`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    pub slug: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub author: String,
    pub author_url: Option<String>,
    pub latest_version: String,
    pub image: Option<String>,
    pub last_updated_at: DateTime<Utc>,
    pub versions: Vec<CatalogVersion>,
}

/// One JSON file per product under a directory, for the staging target.
#[derive(Debug, Clone)]
pub struct LocalCatalog {
    dir: PathBuf,
}

impl LocalCatalog {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn entry_path(&self, slug: &str) -> Result<PathBuf> {
        validate_path_segment("slug", slug)?;
        Ok(self.dir.join(format!("{slug}.json")))
    }

    pub async fn entry(&self, slug: &str) -> Result<Option<CatalogEntry>> {
        let path = self.entry_path(slug)?;
        if !fs::try_exists(&path).await? {
            return Ok(None);
        }
        let text = fs::read_to_string(&path).await?;
        Ok(Some(serde_json::from_str(&text)?))
    }
}

#[async_trait]
impl Catalog for LocalCatalog {
    async fn latest_version(&self, slug: &str) -> Result<Option<String>> {
        Ok(self.entry(slug).await?.map(|e| e.latest_version))
    }

    /// Upsert the product and append the version.
    async fn publish_product(&self, product: &ProductPayload) -> Result<()> {
        let now = Utc::now();
        let path = self.entry_path(&product.slug)?;

        let previous = self.entry(&product.slug).await?;
        // An unparsable stored latest is replaced rather than kept forever.
        let latest_version = match &previous {
            Some(entry)
                if wpstage_version::parse(&entry.latest_version).is_ok()
                    && !wpstage_version::is_newer(&product.version, Some(&entry.latest_version)) =>
            {
                entry.latest_version.clone()
            }
            _ => product.version.clone(),
        };

        let mut versions = previous.map(|e| e.versions).unwrap_or_default();
        versions.retain(|v| v.version != product.version);
        versions.push(CatalogVersion {
            version: product.version.clone(),
            download_url: product.download_url.clone(),
            updated_on: now,
        });

        let entry = CatalogEntry {
            slug: product.slug.clone(),
            name: product.name.clone(),
            kind: product.kind.clone(),
            author: product.author.clone().unwrap_or_else(|| "Unknown".to_string()),
            author_url: product.author_url.clone(),
            latest_version,
            image: product.image.clone(),
            last_updated_at: now,
            versions,
        };

        fs::create_dir_all(&self.dir).await?;
        let temp_path = path.with_extension("json.tmp");
        fs::write(&temp_path, serde_json::to_vec_pretty(&entry)?).await?;
        fs::rename(&temp_path, &path).await?;

        debug!(path = %path.display(), "local catalog entry written");
        Ok(())
    }
}

/// The catalog selected by `[catalog]` settings: the HTTP API for
/// production, the local directory for staging.
pub fn catalog_from_settings(settings: &CatalogSettings) -> Result<Arc<dyn Catalog>> {
    match settings.target_env {
        TargetEnv::Production => Ok(Arc::new(CatalogClient::from_settings(settings)?)),
        TargetEnv::Staging => Ok(Arc::new(LocalCatalog::new(&settings.local_dir))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn payload(version: &str) -> ProductPayload {
        let mut product = ProductPayload::new(PackageKind::Plugin, "akismet", "Akismet", version);
        product.download_url = format!("plugins/akismet/{version}/download.zip");
        product
    }

    #[test]
    fn test_payload_wire_format() {
        let mut product = payload("5.3");
        product.author_url = Some("https://automattic.com".to_string());

        let json = serde_json::to_value(&product).unwrap();
        assert_eq!(json["type"], "PLUGIN");
        assert_eq!(json["authorUrl"], "https://automattic.com");
        assert_eq!(json["downloadUrl"], "plugins/akismet/5.3/download.zip");
        assert!(json.get("kind").is_none());
    }

    #[test]
    fn test_remote_product_accepts_either_key() {
        let a: RemoteProduct = serde_json::from_str(r#"{"latestVersion":"1.2"}"#).unwrap();
        let b: RemoteProduct = serde_json::from_str(r#"{"version":"1.3","slug":"x"}"#).unwrap();
        assert_eq!(a.latest_version.as_deref(), Some("1.2"));
        assert_eq!(b.latest_version.as_deref(), Some("1.3"));
    }

    #[tokio::test]
    async fn test_local_catalog_upserts() {
        let temp = TempDir::new().unwrap();
        let catalog = LocalCatalog::new(temp.path());

        assert_eq!(catalog.latest_version("akismet").await.unwrap(), None);

        catalog.publish_product(&payload("5.3")).await.unwrap();
        catalog.publish_product(&payload("5.4")).await.unwrap();
        catalog.publish_product(&payload("5.1")).await.unwrap();
        catalog.publish_product(&payload("5.4")).await.unwrap();

        let entry = catalog.entry("akismet").await.unwrap().unwrap();
        assert_eq!(entry.latest_version, "5.4");
        assert_eq!(entry.author, "Unknown");
        let versions: Vec<&str> = entry.versions.iter().map(|v| v.version.as_str()).collect();
        assert_eq!(versions, vec!["5.3", "5.1", "5.4"]);
        assert_eq!(
            catalog.latest_version("akismet").await.unwrap().as_deref(),
            Some("5.4")
        );
    }

    #[tokio::test]
    async fn test_unparsable_latest_is_replaced() {
        let temp = TempDir::new().unwrap();
        let catalog = LocalCatalog::new(temp.path());

        catalog.publish_product(&payload("trunk")).await.unwrap();
        assert_eq!(
            catalog.latest_version("akismet").await.unwrap().as_deref(),
            Some("trunk")
        );

        catalog.publish_product(&payload("5.3")).await.unwrap();
        catalog.publish_product(&payload("5.2")).await.unwrap();
        let entry = catalog.entry("akismet").await.unwrap().unwrap();
        assert_eq!(entry.latest_version, "5.3");
        assert_eq!(entry.versions.len(), 3);
    }

    #[tokio::test]
    async fn test_publish_requires_secret() {
        let client = CatalogClient::new("https://catalog.example.com/api/products", None).unwrap();
        let err = client.publish_product(&payload("5.3")).await.unwrap_err();
        assert!(matches!(err, Error::MissingSecret(name) if name == "WPSTAGE_ADMIN_SECRET"));
    }

    #[test]
    fn test_production_requires_base_url() {
        let settings = CatalogSettings {
            target_env: TargetEnv::Production,
            ..CatalogSettings::default()
        };
        assert!(matches!(
            catalog_from_settings(&settings),
            Err(Error::MissingSetting("catalog.base_url"))
        ));
    }
}
