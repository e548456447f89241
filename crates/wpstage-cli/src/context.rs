//! Shared setup for commands: configuration, item store, pipeline.

use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;
use tracing::warn;
use wpstage_config::{ConfigManager, WpstageConfig};
use wpstage_jobs::{ItemStore, JsonItemStore, Pipeline};
use wpstage_remote::{catalog_from_settings, store_from_settings, Catalog, Publisher};

pub struct AppContext {
    manager: ConfigManager,
}

impl AppContext {
    /// Load the config (defaults when absent) and validate it.
    pub async fn load(config_path: Option<&Path>) -> Result<Self> {
        let manager = ConfigManager::load_or_default(config_path)
            .await
            .context("Failed to load configuration")?;
        manager
            .config()
            .validate()
            .with_context(|| format!("Invalid configuration in {}", manager.path().display()))?;
        Ok(Self { manager })
    }

    pub fn config(&self) -> &WpstageConfig {
        self.manager.config()
    }

    pub fn store(&self) -> Arc<dyn ItemStore> {
        Arc::new(JsonItemStore::new(self.config().items_dir()))
    }

    pub fn catalog(&self) -> Result<Arc<dyn Catalog>> {
        catalog_from_settings(&self.config().catalog).context("Failed to set up the catalog")
    }

    /// Pipeline over the persistent item store. Builds consult the catalog
    /// when one can be set up; otherwise only local items count.
    pub fn pipeline(&self) -> Pipeline {
        let pipeline = Pipeline::from_config(self.store(), self.config());
        match self.catalog() {
            Ok(catalog) => pipeline.with_catalog(catalog),
            Err(err) => {
                warn!(error = %err, "catalog unavailable; version checks use local items only");
                pipeline
            }
        }
    }

    pub fn publisher(&self) -> Result<Publisher> {
        let settings = &self.config().storage;
        let store = store_from_settings(settings).context("Failed to set up object storage")?;
        Ok(Publisher::from_settings(store, self.catalog()?, settings))
    }
}
