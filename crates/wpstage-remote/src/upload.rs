//! Bounded-concurrency uploads with retry.

use crate::content_type::{content_type_for, is_uploadable};
use crate::error::{Error, Result};
use crate::retry::RetryPolicy;
use crate::storage::ObjectStore;
use futures::stream::{self, StreamExt};
use std::path::Path;
use std::sync::Arc;
use tokio::fs;
use tracing::{debug, info, warn};
use wpstage_fs::{IgnoreRules, TreeWalker};

/// Outcome of a directory upload.
#[derive(Debug, Default)]
pub struct UploadReport {
    /// Keys stored successfully
    pub uploaded: Vec<String>,
    /// Keys that still failed after retries, with the last error
    pub failed: Vec<(String, Error)>,
}

impl UploadReport {
    pub fn total(&self) -> usize {
        self.uploaded.len() + self.failed.len()
    }

    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    /// `Err(PartialUpload)` when anything failed.
    pub fn into_result(self) -> Result<Vec<String>> {
        if self.failed.is_empty() {
            Ok(self.uploaded)
        } else {
            Err(Error::PartialUpload {
                failed: self.failed.len(),
                total: self.total(),
            })
        }
    }
}

/// Puts local files into an [`ObjectStore`].
#[derive(Clone)]
pub struct Uploader {
    store: Arc<dyn ObjectStore>,
    concurrency: usize,
    retry: RetryPolicy,
}

impl Uploader {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self {
            store,
            concurrency: 20,
            retry: RetryPolicy::default(),
        }
    }

    /// Maximum uploads in flight (minimum 1).
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn store(&self) -> &Arc<dyn ObjectStore> {
        &self.store
    }

    /// Upload one file under `key`, retrying transient failures.
    pub async fn upload_file(
        &self,
        bucket: &str,
        key: &str,
        path: &Path,
        content_type: &str,
    ) -> Result<()> {
        if !fs::try_exists(path).await? {
            return Err(Error::FileMissing(path.to_path_buf()));
        }
        let body = fs::read(path).await?;
        let store = &self.store;

        self.retry
            .run(key, || {
                let body = body.clone();
                async move { store.put(bucket, key, body, content_type).await }
            })
            .await?;

        debug!(location = %self.store.locate(bucket, key), "uploaded");
        Ok(())
    }

    /// Upload the publishable files of `dir` under `<prefix>/<relative>`.
    ///
    /// Hidden files, junk folders and extensions outside the allow-list are
    /// skipped. A failing file never aborts the others.
    pub async fn upload_dir(&self, bucket: &str, prefix: &str, dir: &Path) -> Result<UploadReport> {
        if !fs::try_exists(dir).await? {
            return Err(Error::FileMissing(dir.to_path_buf()));
        }

        let files: Vec<_> = TreeWalker::new(dir, IgnoreRules::upload())
            .files()
            .into_iter()
            .filter(|entry| is_uploadable(&entry.path))
            .collect();

        info!(
            dir = %dir.display(),
            files = files.len(),
            concurrency = self.concurrency,
            "uploading directory"
        );

        let results: Vec<(String, Result<()>)> = stream::iter(files)
            .map(|entry| async move {
                let key = format!("{}/{}", prefix.trim_end_matches('/'), entry.relative_slash());
                let result = self
                    .upload_file(bucket, &key, &entry.path, content_type_for(&entry.path))
                    .await;
                (key, result)
            })
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        let mut report = UploadReport::default();
        for (key, result) in results {
            match result {
                Ok(()) => report.uploaded.push(key),
                Err(err) => {
                    warn!(key = %key, error = %err, "upload failed");
                    report.failed.push((key, err));
                }
            }
        }
        report.uploaded.sort();

        Ok(report)
    }
}
