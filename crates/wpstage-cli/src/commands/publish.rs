use crate::context::AppContext;
use crate::formatters::{human, print_json, OutputFormat};
use anyhow::{Context, Result};
use serde_json::json;
use std::path::Path;

pub async fn run(id: &str, config: Option<&Path>, format: OutputFormat) -> Result<()> {
    let ctx = AppContext::load(config).await?;
    let publisher = ctx.publisher()?;

    let receipt = ctx
        .pipeline()
        .publish(id, &publisher)
        .await
        .with_context(|| format!("Failed to publish item {id}"))?;

    match format {
        OutputFormat::Json => print_json(&json!({
            "archive_key": receipt.archive_key,
            "tree_key": receipt.tree_key,
            "banner_url": receipt.banner_url,
            "source_files": receipt.source_files,
            "product": receipt.product,
        }))?,
        OutputFormat::Human => human::print_publish(&receipt),
    }
    Ok(())
}
