//! Object storage backends.

use crate::client::{join_segments, HttpClient};
use crate::error::{Error, Result};
use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::fs;
use tracing::debug;
use url::Url;
use wpstage_config::{StorageBackend, StorageSettings};

/// A bucketed key/value blob store.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put(&self, bucket: &str, key: &str, body: Vec<u8>, content_type: &str) -> Result<()>;

    /// Human-readable location of a stored object (for logs).
    fn locate(&self, bucket: &str, key: &str) -> String;
}

/// Stores each bucket as a directory under `root`.
#[derive(Debug, Clone)]
pub struct LocalObjectStore {
    root: PathBuf,
}

impl LocalObjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Filesystem path for an object; keys that would leave the bucket are
    /// rejected.
    pub fn object_path(&self, bucket: &str, key: &str) -> Result<PathBuf> {
        let relative = Path::new(key);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)));
        if bucket.is_empty() || bucket.contains(['/', '\\']) || key.is_empty() || escapes {
            return Err(Error::other(format!("invalid object key {bucket}/{key}")));
        }
        Ok(self.root.join(bucket).join(relative))
    }
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    async fn put(&self, bucket: &str, key: &str, body: Vec<u8>, _content_type: &str) -> Result<()> {
        let path = self.object_path(bucket, key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&path, body).await?;
        debug!(path = %path.display(), "object stored");
        Ok(())
    }

    fn locate(&self, bucket: &str, key: &str) -> String {
        self.root.join(bucket).join(key).display().to_string()
    }
}

/// Plain HTTP PUT to `<endpoint>/<bucket>/<key>`.
#[derive(Debug, Clone)]
pub struct HttpObjectStore {
    client: HttpClient,
    endpoint: Url,
    token: Option<String>,
}

impl HttpObjectStore {
    pub fn new(endpoint: &str, token: Option<String>, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: HttpClient::new(timeout)?,
            endpoint: Url::parse(endpoint)?,
            token,
        })
    }

    fn object_url(&self, bucket: &str, key: &str) -> Result<Url> {
        join_segments(&self.endpoint, std::iter::once(bucket).chain(key.split('/')))
    }
}

#[async_trait]
impl ObjectStore for HttpObjectStore {
    async fn put(&self, bucket: &str, key: &str, body: Vec<u8>, content_type: &str) -> Result<()> {
        let url = self.object_url(bucket, key)?;
        self.client
            .put_bytes(&url, body, content_type, self.token.as_deref())
            .await
    }

    fn locate(&self, bucket: &str, key: &str) -> String {
        self.object_url(bucket, key)
            .map(|u| u.to_string())
            .unwrap_or_else(|_| format!("{bucket}/{key}"))
    }
}

/// The store selected by `[storage]` settings.
pub fn store_from_settings(settings: &StorageSettings) -> Result<Arc<dyn ObjectStore>> {
    match settings.backend {
        StorageBackend::Local => Ok(Arc::new(LocalObjectStore::new(&settings.local_root))),
        StorageBackend::Http => {
            let endpoint = settings
                .endpoint
                .as_deref()
                .ok_or(Error::MissingSetting("storage.endpoint"))?;
            Ok(Arc::new(HttpObjectStore::new(
                endpoint,
                settings.token(),
                Duration::from_secs(120),
            )?))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_local_put() {
        let temp = TempDir::new().unwrap();
        let store = LocalObjectStore::new(temp.path());

        store
            .put("private", "plugins/akismet/5.3/download.zip", b"PK".to_vec(), "application/zip")
            .await
            .unwrap();

        let stored = temp.path().join("private/plugins/akismet/5.3/download.zip");
        assert_eq!(std::fs::read(stored).unwrap(), b"PK");
    }

    #[test]
    fn test_local_rejects_escaping_keys() {
        let store = LocalObjectStore::new("/srv/buckets");
        assert!(store.object_path("private", "../secrets").is_err());
        assert!(store.object_path("private", "/etc/passwd").is_err());
        assert!(store.object_path("../x", "a").is_err());
        assert!(store.object_path("private", "").is_err());
        assert!(store.object_path("private", "themes/a/1.0/tree.json").is_ok());
    }

    #[test]
    fn test_http_object_url() {
        let store = HttpObjectStore::new(
            "https://objects.example.com/",
            None,
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(
            store.locate("public", "themes/astra/4.1.0/banner.png"),
            "https://objects.example.com/public/themes/astra/4.1.0/banner.png"
        );
    }

    #[test]
    fn test_http_backend_requires_endpoint() {
        let settings = StorageSettings {
            backend: StorageBackend::Http,
            ..StorageSettings::default()
        };
        assert!(matches!(
            store_from_settings(&settings),
            Err(Error::MissingSetting("storage.endpoint"))
        ));
    }
}
