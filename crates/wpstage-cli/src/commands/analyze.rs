use crate::context::AppContext;
use crate::formatters::{human, print_json, OutputFormat};
use anyhow::{Context, Result};
use colored::*;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use wpstage_analyzer::{analyze, AnalyzeOptions};
use wpstage_builder::extract_archive;
use wpstage_core::{AnalysisResult, ScanMode};

pub struct AnalyzeArgs {
    pub path: PathBuf,
    pub name: Option<String>,
    pub mode: Option<ScanMode>,
    pub check_remote: bool,
}

/// Directory to analyze; zips are extracted into `scratch`.
fn analysis_root(path: &Path, scratch: &TempDir) -> Result<PathBuf> {
    if path.is_dir() {
        return Ok(path.to_path_buf());
    }
    extract_archive(path, scratch.path())
        .with_context(|| format!("Failed to extract {}", path.display()))?;
    Ok(scratch.path().to_path_buf())
}

pub async fn run(args: AnalyzeArgs, config: Option<&Path>, format: OutputFormat) -> Result<()> {
    let ctx = AppContext::load(config).await?;
    if !args.path.exists() {
        anyhow::bail!("Path does not exist: {}", args.path.display());
    }

    let scratch = TempDir::new().context("Failed to create scratch directory")?;
    let root = analysis_root(&args.path, &scratch)?;

    let original_filename = args.name.clone().or_else(|| {
        args.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
    });
    let options = AnalyzeOptions {
        mode: args.mode.unwrap_or(ctx.config().analysis.mode),
        original_filename,
        read_limit: ctx.config().analysis.read_limit,
    };

    let verbose_log = !format.is_json();
    let mut result = analyze(&root, &options, &mut |line: &str| {
        if verbose_log {
            eprintln!("{}", line.dimmed());
        }
    });

    if args.check_remote {
        result = attach_remote(&ctx, result).await?;
    }

    // Paths inside the scratch directory are meaningless once it is gone.
    if !args.path.is_dir() {
        result.resolved_path = None;
    }

    match format {
        OutputFormat::Json => print_json(&result)?,
        OutputFormat::Human => human::print_analysis(&result),
    }
    Ok(())
}

async fn attach_remote(ctx: &AppContext, result: AnalysisResult) -> Result<AnalysisResult> {
    let (Some(slug), Some(version)) = (result.slug.clone(), result.version.clone()) else {
        return Ok(result);
    };

    let catalog = ctx.catalog()?;
    let remote = catalog
        .latest_version(&slug)
        .await
        .with_context(|| format!("Remote version lookup failed for {slug}"))?;
    let newer = wpstage_version::is_newer(&version, remote.as_deref());
    Ok(result.with_newer(newer))
}
