use crate::formatters::{print_json, OutputFormat};
use anyhow::{Context, Result};
use clap::Subcommand;
use colored::*;
use serde_json::json;
use std::path::{Path, PathBuf};
use wpstage_config::{ConfigError, ConfigManager};

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Initialize config file at ~/.wpstage/config.toml
    Init,

    /// Show config file path
    Path,

    /// Print the effective configuration (file plus environment overrides)
    Show,

    /// Validate config file
    Validate,
}

fn resolve(config: Option<&Path>) -> PathBuf {
    config
        .map(Path::to_path_buf)
        .unwrap_or_else(ConfigManager::config_path)
}

pub async fn run(command: ConfigCommand, config: Option<&Path>, format: OutputFormat) -> Result<()> {
    match command {
        ConfigCommand::Init => init_config(&resolve(config)).await,
        ConfigCommand::Path => {
            println!("{}", resolve(config).display());
            Ok(())
        }
        ConfigCommand::Show => show_config(config, format).await,
        ConfigCommand::Validate => validate_config(&resolve(config), format).await,
    }
}

async fn init_config(path: &Path) -> Result<()> {
    match ConfigManager::init_at(path).await {
        Ok(_) => {
            println!("{} Initialized config at: {}", "✓".green(), path.display());
            Ok(())
        }
        Err(ConfigError::ConfigExists(_)) => {
            println!("Config already exists at: {}", path.display());
            println!("To reinitialize, please delete the existing config first.");
            Ok(())
        }
        Err(err) => Err(err).context("Failed to initialize config"),
    }
}

async fn show_config(config: Option<&Path>, format: OutputFormat) -> Result<()> {
    let manager = ConfigManager::load_or_default(config)
        .await
        .context("Failed to load configuration")?;

    match format {
        OutputFormat::Json => print_json(manager.config())?,
        OutputFormat::Human => {
            println!("# {}", manager.path().display());
            let text = toml::to_string_pretty(manager.config()).context("Failed to render config")?;
            print!("{text}");
        }
    }
    Ok(())
}

async fn validate_config(path: &Path, format: OutputFormat) -> Result<()> {
    let manager = ConfigManager::load_from(path)
        .await
        .context("Config not found or invalid. Run 'wpstage config init' first.")?;
    let config = manager.config();
    config.validate()?;

    let secret_env = &config.catalog.admin_secret_env;
    let secret_set = config.catalog.admin_secret().is_some();

    match format {
        OutputFormat::Json => print_json(&json!({
            "path": path,
            "valid": true,
            "target_env": config.catalog.target_env.to_string(),
            "admin_secret_set": secret_set,
        }))?,
        OutputFormat::Human => {
            println!("{} Config is valid", "✓".green());
            println!("  Version:      {}", config.version);
            println!("  Staging dir:  {}", config.paths.staging_dir.display());
            println!("  Target env:   {}", config.catalog.target_env);
            println!("  Max jobs:     {}", config.jobs.max_concurrent);
            if !config.paths.staging_dir.exists() {
                println!("\nWarning: staging directory does not exist yet");
            }
            if !secret_set {
                println!("\nWarning: {secret_env} is not set; production publishes will fail");
            }
        }
    }
    Ok(())
}
