//! wpstage Config - the `~/.wpstage/config.toml` file and its overrides.
//!
//! Secrets (catalog admin secret, storage token) are never written to the
//! file; the config only names the environment variables that hold them.

pub mod manager;
pub mod security;
pub mod types;

pub use manager::{ConfigError, ConfigManager};
pub use security::{
    validate_path_segment, validate_source_dir, SecurityError, MAX_SEGMENT_LEN,
};
pub use types::{
    wpstage_home, AnalysisSettings, CatalogSettings, JobSettings, PathSettings, StorageBackend,
    StorageSettings, TargetEnv, WpstageConfig, ENV_CATALOG_URL, ENV_STAGING_DIR, ENV_TARGET_ENV,
};
