use crate::context::AppContext;
use crate::formatters::{human, print_json, OutputFormat};
use anyhow::{Context, Result};
use clap::Subcommand;
use colored::*;
use serde_json::json;
use std::path::Path;
use std::sync::Arc;
use wpstage_core::{ItemStatus, PackageKind, ReviewOverrides};
use wpstage_jobs::{null_sink, ItemStore, LogSink};

#[derive(Subcommand, Debug)]
pub enum ItemsCommand {
    /// List registered items
    List {
        /// Only items in this status (e.g. needs_review)
        #[arg(long)]
        status: Option<ItemStatus>,
    },

    /// Show one item, including its stored analysis
    Show { id: String },

    /// Correct an item's identity and mark it ready to build
    Review {
        id: String,

        #[arg(long)]
        slug: Option<String>,

        #[arg(long)]
        version: Option<String>,

        #[arg(long)]
        name: Option<String>,

        #[arg(long = "type")]
        kind: Option<PackageKind>,
    },

    /// Build an item into the staging area
    Build {
        id: String,

        /// Build even if not ready, and extract source even if not latest
        #[arg(long)]
        force: bool,
    },
}

pub async fn run(command: ItemsCommand, config: Option<&Path>, format: OutputFormat) -> Result<()> {
    let ctx = AppContext::load(config).await?;

    match command {
        ItemsCommand::List { status } => {
            let mut records = ctx.store().list().await.context("Failed to list items")?;
            if let Some(status) = status {
                records.retain(|r| r.status == status);
            }
            match format {
                OutputFormat::Json => print_json(&records)?,
                OutputFormat::Human => human::print_items(&records),
            }
        }
        ItemsCommand::Show { id } => {
            let record = ctx.store().require(&id).await?;
            match format {
                OutputFormat::Json => print_json(&record)?,
                OutputFormat::Human => {
                    human::print_item(&record);
                    if let Some(analysis) = record.analysis()? {
                        human::print_analysis(&analysis);
                    }
                }
            }
        }
        ItemsCommand::Review {
            id,
            slug,
            version,
            name,
            kind,
        } => {
            let overrides = ReviewOverrides {
                slug,
                version,
                name,
                kind,
            };
            let record = ctx
                .pipeline()
                .review(&id, &overrides)
                .await
                .with_context(|| format!("Failed to review item {id}"))?;
            match format {
                OutputFormat::Json => print_json(&record)?,
                OutputFormat::Human => {
                    println!("{} Item {} is {}", "✓".green(), id, human::status_label(record.status));
                }
            }
        }
        ItemsCommand::Build { id, force } => {
            let log: LogSink = if format.is_json() {
                null_sink()
            } else {
                Arc::new(|line: &str| eprintln!("  {}", line.dimmed()))
            };
            let pipeline = ctx.pipeline();
            let result = pipeline.build(&id, force, log).await;
            let report = match result {
                Ok(report) => report,
                Err(err) => {
                    if !matches!(err, wpstage_jobs::Error::InvalidStatus { .. }) {
                        pipeline.mark_failed(&id, &err).await.ok();
                    }
                    return Err(err).with_context(|| format!("Failed to build item {id}"));
                }
            };
            match format {
                OutputFormat::Json => print_json(&json!({
                    "output": report.output,
                    "is_latest": report.is_latest,
                    "forced": report.forced,
                    "banner_path": report.banner_path,
                }))?,
                OutputFormat::Human => human::print_build(&report.output),
            }
        }
    }
    Ok(())
}
