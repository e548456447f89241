use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use wpstage_core::ScanMode;

/// Environment variable overriding [`PathSettings::staging_dir`].
pub const ENV_STAGING_DIR: &str = "WPSTAGE_STAGING_DIR";
/// Environment variable overriding [`CatalogSettings::base_url`].
pub const ENV_CATALOG_URL: &str = "WPSTAGE_CATALOG_URL";
/// Environment variable overriding [`CatalogSettings::target_env`].
pub const ENV_TARGET_ENV: &str = "WPSTAGE_TARGET_ENV";

/// Main configuration structure for wpstage
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WpstageConfig {
    /// Schema version for migrations
    pub version: String,

    #[serde(default)]
    pub paths: PathSettings,

    #[serde(default)]
    pub analysis: AnalysisSettings,

    #[serde(default)]
    pub jobs: JobSettings,

    #[serde(default)]
    pub storage: StorageSettings,

    #[serde(default)]
    pub catalog: CatalogSettings,
}

impl Default for WpstageConfig {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            paths: PathSettings::default(),
            analysis: AnalysisSettings::default(),
            jobs: JobSettings::default(),
            storage: StorageSettings::default(),
            catalog: CatalogSettings::default(),
        }
    }
}

impl WpstageConfig {
    /// Apply overrides from the process environment.
    pub fn apply_env(&mut self) -> Result<(), crate::ConfigError> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from any key lookup (the environment in production).
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), crate::ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup(ENV_STAGING_DIR).filter(|v| !v.trim().is_empty()) {
            self.paths.staging_dir = PathBuf::from(dir);
        }
        if let Some(url) = lookup(ENV_CATALOG_URL).filter(|v| !v.trim().is_empty()) {
            self.catalog.base_url = Some(url);
        }
        if let Some(env) = lookup(ENV_TARGET_ENV).filter(|v| !v.trim().is_empty()) {
            self.catalog.target_env = env.parse()?;
        }
        Ok(())
    }

    /// Check settings that parse fine but cannot work together.
    pub fn validate(&self) -> Result<(), crate::ConfigError> {
        let mut problems = Vec::new();

        if self.jobs.max_concurrent == 0 {
            problems.push("jobs.max_concurrent must be at least 1".to_string());
        }
        if self.analysis.read_limit == 0 {
            problems.push("analysis.read_limit must be at least 1".to_string());
        }
        if self.storage.upload_concurrency == 0 {
            problems.push("storage.upload_concurrency must be at least 1".to_string());
        }
        if self.storage.backend == StorageBackend::Http && self.storage.endpoint.is_none() {
            problems.push("storage.endpoint is required for the http backend".to_string());
        }
        if self.catalog.requests_per_second == 0 {
            problems.push("catalog.requests_per_second must be at least 1".to_string());
        }
        if self.catalog.target_env == TargetEnv::Production && self.catalog.base_url.is_none() {
            problems.push("catalog.base_url is required for production".to_string());
        }

        let urls = [
            ("storage.endpoint", &self.storage.endpoint),
            ("storage.public_base_url", &self.storage.public_base_url),
            ("catalog.base_url", &self.catalog.base_url),
        ];
        for (field, value) in urls {
            if let Some(url) = value {
                if !url.starts_with("http://") && !url.starts_with("https://") {
                    problems.push(format!("{field} must be an http(s) URL, got '{url}'"));
                }
            }
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(crate::ConfigError::Invalid(problems.join("; ")))
        }
    }

    /// Directory holding one JSON record per uploaded item.
    pub fn items_dir(&self) -> PathBuf {
        self.paths.work_dir.join("items")
    }

    /// Directory uploads are extracted into, one subdirectory per item.
    pub fn extract_root(&self) -> PathBuf {
        self.paths.work_dir.join("extract")
    }
}

/// Filesystem locations
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PathSettings {
    /// Root of `<type>/<slug>/<version>` build outputs
    #[serde(default = "default_staging_dir")]
    pub staging_dir: PathBuf,

    /// Item records and extracted uploads
    #[serde(default = "default_work_dir")]
    pub work_dir: PathBuf,

    /// PNG copied as the banner for each built release
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub banner_template: Option<PathBuf>,
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            staging_dir: default_staging_dir(),
            work_dir: default_work_dir(),
            banner_template: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AnalysisSettings {
    #[serde(default)]
    pub mode: ScanMode,

    /// Bytes read from each header candidate
    #[serde(default = "default_read_limit")]
    pub read_limit: usize,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            mode: ScanMode::Strict,
            read_limit: default_read_limit(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct JobSettings {
    /// Jobs allowed to run at once
    #[serde(default = "default_max_concurrent_jobs")]
    pub max_concurrent: usize,
}

impl Default for JobSettings {
    fn default() -> Self {
        Self {
            max_concurrent: default_max_concurrent_jobs(),
        }
    }
}

/// Where published objects go.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// One directory per bucket under `local_root`
    #[default]
    Local,
    /// Plain HTTP PUT against `endpoint`
    Http,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StorageSettings {
    #[serde(default)]
    pub backend: StorageBackend,

    #[serde(default = "default_storage_root")]
    pub local_root: PathBuf,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    /// Name of the environment variable holding the bearer token
    #[serde(default = "default_token_env")]
    pub token_env: String,

    #[serde(default = "default_public_bucket")]
    pub public_bucket: String,

    #[serde(default = "default_private_bucket")]
    pub private_bucket: String,

    /// Base URL public objects are served from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_base_url: Option<String>,

    #[serde(default = "default_upload_concurrency")]
    pub upload_concurrency: usize,

    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,

    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Local,
            local_root: default_storage_root(),
            endpoint: None,
            token_env: default_token_env(),
            public_bucket: default_public_bucket(),
            private_bucket: default_private_bucket(),
            public_base_url: None,
            upload_concurrency: default_upload_concurrency(),
            max_retries: default_max_retries(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
        }
    }
}

impl StorageSettings {
    /// Bearer token from the configured environment variable.
    pub fn token(&self) -> Option<String> {
        std::env::var(&self.token_env).ok().filter(|t| !t.is_empty())
    }
}

/// Which catalog a publish registers the product with.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TargetEnv {
    /// Products recorded in a local catalog directory
    #[default]
    Staging,
    /// Products registered through the catalog HTTP API
    Production,
}

impl fmt::Display for TargetEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetEnv::Staging => f.write_str("staging"),
            TargetEnv::Production => f.write_str("production"),
        }
    }
}

impl FromStr for TargetEnv {
    type Err = crate::ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "staging" => Ok(TargetEnv::Staging),
            "production" | "prod" => Ok(TargetEnv::Production),
            other => Err(crate::ConfigError::Invalid(format!(
                "unknown target environment '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    #[serde(default)]
    pub target_env: TargetEnv,

    /// Name of the environment variable holding the admin secret
    #[serde(default = "default_admin_secret_env")]
    pub admin_secret_env: String,

    #[serde(default = "default_requests_per_second")]
    pub requests_per_second: u32,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Local catalog used when `target_env` is staging
    #[serde(default = "default_local_catalog")]
    pub local_dir: PathBuf,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            base_url: None,
            target_env: TargetEnv::Staging,
            admin_secret_env: default_admin_secret_env(),
            requests_per_second: default_requests_per_second(),
            timeout_secs: default_timeout_secs(),
            local_dir: default_local_catalog(),
        }
    }
}

impl CatalogSettings {
    /// Admin secret from the configured environment variable. Never stored
    /// in the config file.
    pub fn admin_secret(&self) -> Option<String> {
        std::env::var(&self.admin_secret_env)
            .ok()
            .filter(|s| !s.is_empty())
    }
}

/// `~/.wpstage`, or `./.wpstage` when no home directory is known.
pub fn wpstage_home() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".wpstage")
}

fn default_staging_dir() -> PathBuf {
    wpstage_home().join("staging")
}

fn default_work_dir() -> PathBuf {
    wpstage_home().join("work")
}

fn default_storage_root() -> PathBuf {
    wpstage_home().join("buckets")
}

fn default_local_catalog() -> PathBuf {
    wpstage_home().join("catalog")
}

fn default_read_limit() -> usize {
    8 * 1024
}

fn default_max_concurrent_jobs() -> usize {
    2
}

fn default_token_env() -> String {
    "WPSTAGE_STORAGE_TOKEN".to_string()
}

fn default_public_bucket() -> String {
    "wpstage-public".to_string()
}

fn default_private_bucket() -> String {
    "wpstage-private".to_string()
}

fn default_upload_concurrency() -> usize {
    20
}

fn default_max_retries() -> u32 {
    3
}

fn default_initial_backoff_ms() -> u64 {
    500
}

fn default_max_backoff_ms() -> u64 {
    8_000
}

fn default_admin_secret_env() -> String {
    "WPSTAGE_ADMIN_SECRET".to_string()
}

fn default_requests_per_second() -> u32 {
    5
}

fn default_timeout_secs() -> u64 {
    30
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_config_serialization() {
        let mut config = WpstageConfig::default();
        config.paths.banner_template = Some(PathBuf::from("/srv/banner.png"));
        config.storage.backend = StorageBackend::Http;
        config.storage.endpoint = Some("https://objects.example.com".to_string());

        let toml_str = toml::to_string(&config).unwrap();
        let deserialized: WpstageConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_default_config() {
        let config = WpstageConfig::default();
        assert_eq!(config.version, "1.0");
        assert_eq!(config.jobs.max_concurrent, 2);
        assert_eq!(config.analysis.mode, ScanMode::Strict);
        assert_eq!(config.analysis.read_limit, 8192);
        assert_eq!(config.storage.upload_concurrency, 20);
        assert_eq!(config.storage.max_retries, 3);
        assert_eq!(config.catalog.target_env, TargetEnv::Staging);
        assert_eq!(config.catalog.admin_secret_env, "WPSTAGE_ADMIN_SECRET");
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let config: WpstageConfig = toml::from_str(
            r#"
            version = "1.0"

            [analysis]
            mode = "full"

            [jobs]
            max_concurrent = 4
            "#,
        )
        .unwrap();

        assert_eq!(config.analysis.mode, ScanMode::Full);
        assert_eq!(config.analysis.read_limit, 8192);
        assert_eq!(config.jobs.max_concurrent, 4);
        assert_eq!(config.storage.public_bucket, "wpstage-public");
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = HashMap::from([
            (ENV_STAGING_DIR, "/data/staging"),
            (ENV_CATALOG_URL, "https://catalog.example.com"),
            (ENV_TARGET_ENV, "Production"),
        ]);

        let mut config = WpstageConfig::default();
        config
            .apply_overrides(|key| vars.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.paths.staging_dir, PathBuf::from("/data/staging"));
        assert_eq!(
            config.catalog.base_url.as_deref(),
            Some("https://catalog.example.com")
        );
        assert_eq!(config.catalog.target_env, TargetEnv::Production);
    }

    #[test]
    fn test_validate() {
        assert!(WpstageConfig::default().validate().is_ok());

        let mut config = WpstageConfig::default();
        config.jobs.max_concurrent = 0;
        config.storage.backend = StorageBackend::Http;
        config.catalog.base_url = Some("ftp://catalog".to_string());

        let message = config.validate().unwrap_err().to_string();
        assert!(message.contains("jobs.max_concurrent"));
        assert!(message.contains("storage.endpoint is required"));
        assert!(message.contains("catalog.base_url must be an http(s) URL"));
    }

    #[test]
    fn test_bad_target_env_override() {
        let mut config = WpstageConfig::default();
        let result = config.apply_overrides(|key| (key == ENV_TARGET_ENV).then(|| "qa".to_string()));
        assert!(result.is_err());
    }
}
