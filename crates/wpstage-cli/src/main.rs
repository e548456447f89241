//! wpstage CLI - WordPress plugin/theme archive analyzer and release builder.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tokio::runtime::Runtime;
use wpstage_cli::commands::{self, Command};
use wpstage_cli::logging;
use wpstage_cli::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "wpstage")]
#[command(version)]
#[command(about = "Analyze, build and publish WordPress plugin and theme archives", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Configuration file path (default: ~/.wpstage/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output JSON instead of human-readable text
    #[arg(long, global = true)]
    json: bool,

    /// Verbose logging (-v info, -vv debug)
    #[arg(short = 'v', action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_tracing(cli.verbose);

    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Human
    };

    let runtime = Runtime::new().context("Failed to create tokio runtime")?;
    runtime.block_on(commands::run(cli.command, cli.config.as_deref(), format))
}
