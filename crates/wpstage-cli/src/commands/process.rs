use crate::context::AppContext;
use crate::formatters::{human, print_json, OutputFormat};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use wpstage_jobs::{ItemStore, Job, JobEvent, JobQueue};

pub async fn run(
    archives: Vec<PathBuf>,
    auto_build: bool,
    jobs: Option<usize>,
    config: Option<&Path>,
    format: OutputFormat,
) -> Result<()> {
    let ctx = AppContext::load(config).await?;
    let pipeline = ctx.pipeline();

    let mut item_ids = Vec::with_capacity(archives.len());
    for archive in &archives {
        let record = pipeline
            .register(archive, None)
            .await
            .with_context(|| format!("Failed to register {}", archive.display()))?;
        item_ids.push(record.id);
    }

    let concurrency = jobs.unwrap_or(ctx.config().jobs.max_concurrent);
    let (queue, mut receiver) = JobQueue::new(pipeline, concurrency);
    let queue = queue.with_auto_build(auto_build);

    let printer = tokio::spawn(async move {
        let mut events = Vec::new();
        while let Some(event) = receiver.recv().await {
            if !format.is_json() {
                human::print_event(&event);
            }
            events.push(event);
        }
        events
    });

    for item_id in &item_ids {
        queue.submit(Job::Analyze {
            item_id: item_id.clone(),
        });
    }
    queue.wait_idle().await;

    let store = queue.pipeline().store().clone();
    drop(queue);
    let events = printer.await.context("Event printer stopped unexpectedly")?;

    let mut records = Vec::with_capacity(item_ids.len());
    for item_id in &item_ids {
        records.push(store.require(item_id).await?);
    }
    let failures = events
        .iter()
        .filter(|e| matches!(e, JobEvent::Error { .. }))
        .count();

    match format {
        OutputFormat::Json => print_json(&records)?,
        OutputFormat::Human => {
            println!();
            human::print_items(&records);
        }
    }

    if failures > 0 {
        anyhow::bail!("{failures} job(s) failed");
    }
    Ok(())
}
