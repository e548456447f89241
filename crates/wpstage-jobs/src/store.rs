//! Persistence for item records.

use crate::error::{Error, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use tokio::fs;
use tokio::sync::RwLock;
use tracing::debug;
use wpstage_core::ItemRecord;

/// Where item records live.
#[async_trait]
pub trait ItemStore: Send + Sync {
    /// Insert a new record; fails with [`Error::ItemExists`] on id reuse.
    async fn create(&self, record: &ItemRecord) -> Result<()>;

    async fn get(&self, id: &str) -> Result<Option<ItemRecord>>;

    /// Replace an existing record.
    async fn update(&self, record: &ItemRecord) -> Result<()>;

    /// All records, oldest first.
    async fn list(&self) -> Result<Vec<ItemRecord>>;

    /// [`ItemStore::get`], failing with [`Error::ItemNotFound`].
    async fn require(&self, id: &str) -> Result<ItemRecord> {
        self.get(id)
            .await?
            .ok_or_else(|| Error::ItemNotFound(id.to_string()))
    }
}

fn sort_oldest_first(records: &mut [ItemRecord]) {
    records.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
}

/// One `<id>.json` file per record.
#[derive(Debug, Clone)]
pub struct JsonItemStore {
    dir: PathBuf,
}

impl JsonItemStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn record_path(&self, id: &str) -> Result<PathBuf> {
        wpstage_config::validate_path_segment("id", id)
            .map_err(|_| Error::ItemNotFound(id.to_string()))?;
        Ok(self.dir.join(format!("{id}.json")))
    }

    async fn write(&self, record: &ItemRecord) -> Result<()> {
        let path = self.record_path(&record.id)?;
        fs::create_dir_all(&self.dir).await?;

        let temp_path = path.with_extension("json.tmp");
        fs::write(&temp_path, serde_json::to_vec_pretty(record)?).await?;
        fs::rename(&temp_path, &path).await?;

        debug!(id = %record.id, status = %record.status, "item saved");
        Ok(())
    }
}

#[async_trait]
impl ItemStore for JsonItemStore {
    async fn create(&self, record: &ItemRecord) -> Result<()> {
        if fs::try_exists(self.record_path(&record.id)?).await? {
            return Err(Error::ItemExists(record.id.clone()));
        }
        self.write(record).await
    }

    async fn get(&self, id: &str) -> Result<Option<ItemRecord>> {
        let path = self.record_path(id)?;
        if !fs::try_exists(&path).await? {
            return Ok(None);
        }
        let text = fs::read_to_string(&path).await?;
        Ok(Some(serde_json::from_str(&text)?))
    }

    async fn update(&self, record: &ItemRecord) -> Result<()> {
        if !fs::try_exists(self.record_path(&record.id)?).await? {
            return Err(Error::ItemNotFound(record.id.clone()));
        }
        self.write(record).await
    }

    async fn list(&self) -> Result<Vec<ItemRecord>> {
        if !fs::try_exists(&self.dir).await? {
            return Ok(Vec::new());
        }

        let mut records = Vec::new();
        let mut entries = fs::read_dir(&self.dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let text = fs::read_to_string(&path).await?;
            match serde_json::from_str(&text) {
                Ok(record) => records.push(record),
                Err(err) => debug!(path = %path.display(), error = %err, "skipping unreadable record"),
            }
        }

        sort_oldest_first(&mut records);
        Ok(records)
    }
}

/// In-process store, for tests and one-shot runs.
#[derive(Debug, Default)]
pub struct MemoryItemStore {
    records: RwLock<HashMap<String, ItemRecord>>,
}

impl MemoryItemStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ItemStore for MemoryItemStore {
    async fn create(&self, record: &ItemRecord) -> Result<()> {
        let mut records = self.records.write().await;
        if records.contains_key(&record.id) {
            return Err(Error::ItemExists(record.id.clone()));
        }
        records.insert(record.id.clone(), record.clone());
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<ItemRecord>> {
        Ok(self.records.read().await.get(id).cloned())
    }

    async fn update(&self, record: &ItemRecord) -> Result<()> {
        let mut records = self.records.write().await;
        match records.get_mut(&record.id) {
            Some(existing) => {
                *existing = record.clone();
                Ok(())
            }
            None => Err(Error::ItemNotFound(record.id.clone())),
        }
    }

    async fn list(&self) -> Result<Vec<ItemRecord>> {
        let mut records: Vec<_> = self.records.read().await.values().cloned().collect();
        sort_oldest_first(&mut records);
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use wpstage_core::ItemStatus;

    fn record(id: &str) -> ItemRecord {
        ItemRecord::new(
            id,
            format!("{id}.zip"),
            PathBuf::from(format!("/uploads/{id}.zip")),
            PathBuf::from(format!("/work/extract/{id}")),
        )
    }

    async fn exercise(store: &dyn ItemStore) {
        assert!(store.get("a").await.unwrap().is_none());

        store.create(&record("a")).await.unwrap();
        store.create(&record("b")).await.unwrap();
        assert!(matches!(
            store.create(&record("a")).await,
            Err(Error::ItemExists(_))
        ));

        let mut a = store.require("a").await.unwrap();
        a.set_status(ItemStatus::NeedsReview);
        store.update(&a).await.unwrap();
        assert_eq!(
            store.get("a").await.unwrap().unwrap().status,
            ItemStatus::NeedsReview
        );

        assert!(matches!(
            store.update(&record("missing")).await,
            Err(Error::ItemNotFound(_))
        ));
        assert!(matches!(
            store.require("missing").await,
            Err(Error::ItemNotFound(_))
        ));

        let ids: Vec<String> = store.list().await.unwrap().into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_memory_store() {
        exercise(&MemoryItemStore::new()).await;
    }

    #[tokio::test]
    async fn test_json_store() {
        let temp = TempDir::new().unwrap();
        let store = JsonItemStore::new(temp.path().join("items"));
        exercise(&store).await;

        assert!(temp.path().join("items/a.json").is_file());
        assert!(!temp.path().join("items/a.json.tmp").exists());

        let reopened = JsonItemStore::new(temp.path().join("items"));
        assert_eq!(reopened.list().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_json_store_rejects_path_ids() {
        let temp = TempDir::new().unwrap();
        let store = JsonItemStore::new(temp.path());
        assert!(store.get("../escape").await.is_err());
    }
}
