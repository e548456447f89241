use crate::context::AppContext;
use crate::formatters::{human, print_json, OutputFormat};
use anyhow::{Context, Result};
use colored::*;
use serde_json::json;
use std::path::{Path, PathBuf};
use wpstage_builder::{Builder, TemplateBannerRenderer};
use wpstage_config::validate_source_dir;
use wpstage_core::{BuildSpec, PackageKind};

pub struct BuildArgs {
    pub dir: PathBuf,
    pub slug: String,
    pub version: String,
    pub kind: PackageKind,
    pub name: Option<String>,
    pub extract_source: bool,
}

pub async fn run(args: BuildArgs, config: Option<&Path>, format: OutputFormat) -> Result<()> {
    let ctx = AppContext::load(config).await?;
    let source_dir = validate_source_dir(&args.dir)
        .with_context(|| format!("Cannot build from {}", args.dir.display()))?;

    let spec = BuildSpec {
        kind: args.kind,
        slug: args.slug,
        version: args.version,
        name: args.name,
        source_dir,
    };

    let builder = Builder::new(&ctx.config().paths.staging_dir);
    let output = builder
        .build(&spec, args.extract_source)
        .with_context(|| format!("Failed to build {} {}", spec.slug, spec.version))?;

    let mut banner = None;
    if args.extract_source {
        if let Some(template) = &ctx.config().paths.banner_template {
            let renderer = TemplateBannerRenderer::new(template);
            match builder.render_banner(&renderer, &spec, &output) {
                Ok(path) => banner = Some(path),
                Err(err) => eprintln!("{} Image Gen Warning: {err}", "!".yellow()),
            }
        }
    }

    match format {
        OutputFormat::Json => print_json(&json!({ "output": output, "banner_path": banner }))?,
        OutputFormat::Human => {
            human::print_build(&output);
            if let Some(path) = banner {
                println!("  Banner:   {}", path.display());
            }
        }
    }
    Ok(())
}
