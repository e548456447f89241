use crate::security::{set_config_permissions, SecurityError};
use crate::types::{wpstage_home, WpstageConfig};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;
use tracing::debug;

/// Errors that can occur during config management
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("TOML deserialization error: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[error("Security error: {0}")]
    Security(#[from] SecurityError),

    #[error("Config file not found at {0}")]
    ConfigNotFound(PathBuf),

    #[error("Config file already exists at {0}")]
    ConfigExists(PathBuf),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Manager for wpstage configuration
///
/// The default location is `~/.wpstage/config.toml`; every entry point also
/// accepts an explicit path.
#[derive(Debug)]
pub struct ConfigManager {
    config_path: PathBuf,
    config: WpstageConfig,
}

impl ConfigManager {
    /// Get the default config path (~/.wpstage/config.toml)
    pub fn config_path() -> PathBuf {
        wpstage_home().join("config.toml")
    }

    /// Load config from default location
    pub async fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path()).await
    }

    /// Load config from specific path
    pub async fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !fs::try_exists(path).await? {
            return Err(ConfigError::ConfigNotFound(path.to_path_buf()));
        }

        let contents = fs::read_to_string(path).await?;
        let config: WpstageConfig = toml::from_str(&contents)?;
        debug!(path = %path.display(), "loaded config");

        Ok(Self {
            config_path: path.to_path_buf(),
            config,
        })
    }

    /// Load `path` (or the default location), falling back to defaults when
    /// the file does not exist. Environment overrides are applied either way.
    pub async fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config_path = path.map(Path::to_path_buf).unwrap_or_else(Self::config_path);

        let mut manager = match Self::load_from(&config_path).await {
            Ok(manager) => manager,
            Err(ConfigError::ConfigNotFound(_)) => {
                debug!(path = %config_path.display(), "no config file; using defaults");
                Self {
                    config_path,
                    config: WpstageConfig::default(),
                }
            }
            Err(err) => return Err(err),
        };

        manager.config.apply_env()?;
        Ok(manager)
    }

    /// Initialize a new config file at the default location
    pub async fn init() -> Result<Self, ConfigError> {
        Self::init_at(&Self::config_path()).await
    }

    /// Initialize config at specific path. An existing file is left alone.
    pub async fn init_at(path: &Path) -> Result<Self, ConfigError> {
        if fs::try_exists(path).await? {
            return Err(ConfigError::ConfigExists(path.to_path_buf()));
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let config = WpstageConfig::default();
        let toml_str = toml::to_string_pretty(&config)?;
        fs::write(path, &toml_str).await?;
        set_config_permissions(path)?;

        Ok(Self {
            config_path: path.to_path_buf(),
            config,
        })
    }

    /// Save config to disk atomically
    ///
    /// Uses a temporary file and atomic rename to prevent corruption
    pub async fn save(&self) -> Result<(), ConfigError> {
        let toml_str = toml::to_string_pretty(&self.config)?;

        let temp_path = self.config_path.with_extension("toml.tmp");
        fs::write(&temp_path, &toml_str).await?;
        set_config_permissions(&temp_path)?;
        fs::rename(&temp_path, &self.config_path).await?;

        Ok(())
    }

    /// Where this config lives (or would be saved)
    pub fn path(&self) -> &Path {
        &self.config_path
    }

    /// Get reference to config
    pub fn config(&self) -> &WpstageConfig {
        &self.config
    }

    /// Get mutable reference to config (caller must call save())
    pub fn config_mut(&mut self) -> &mut WpstageConfig {
        &mut self.config
    }

    pub fn into_config(self) -> WpstageConfig {
        self.config
    }
}
