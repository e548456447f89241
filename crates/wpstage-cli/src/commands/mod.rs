pub mod analyze;
pub mod build;
pub mod compare;
pub mod config;
pub mod items;
pub mod process;
pub mod publish;
pub mod tree;

use crate::formatters::OutputFormat;
use anyhow::Result;
use clap::Subcommand;
use std::path::{Path, PathBuf};
use wpstage_core::{PackageKind, ScanMode};

pub use config::ConfigCommand;
pub use items::ItemsCommand;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Identify and score a plugin/theme archive or extracted directory
    Analyze {
        /// A .zip archive or an extracted directory
        path: PathBuf,

        /// Name the archive was uploaded under (slug fallback)
        #[arg(long)]
        name: Option<String>,

        /// strict: headers at most one folder deep; full: any depth
        #[arg(long)]
        mode: Option<ScanMode>,

        /// Compare the version against the catalog's latest
        #[arg(long)]
        check_remote: bool,
    },

    /// Package a source directory into the staging area
    Build {
        /// Source directory (its contents become <slug>/ in the archive)
        dir: PathBuf,

        #[arg(long)]
        slug: String,

        #[arg(long)]
        version: String,

        /// plugin or theme
        #[arg(long = "type")]
        kind: PackageKind,

        /// Display name, used for the banner
        #[arg(long)]
        name: Option<String>,

        /// Also extract the archive into source/ (and render a banner)
        #[arg(long)]
        extract_source: bool,
    },

    /// Print the tree description of a directory
    Tree {
        dir: PathBuf,
    },

    /// Check whether a local version is newer than a remote one
    Compare {
        local: String,

        /// Omitted means nothing is published yet
        remote: Option<String>,
    },

    /// Register archives and run analyze (and auto-chained build) jobs
    Process {
        #[arg(required = true)]
        archives: Vec<PathBuf>,

        /// Do not build 10/10 archives automatically
        #[arg(long)]
        no_auto_build: bool,

        /// Concurrent jobs (default from config)
        #[arg(long)]
        jobs: Option<usize>,
    },

    /// Inspect, review and build registered items
    Items {
        #[command(subcommand)]
        command: ItemsCommand,
    },

    /// Upload a built item and register it with the catalog
    Publish {
        id: String,
    },

    /// Manage wpstage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

pub async fn run(command: Command, config: Option<&Path>, format: OutputFormat) -> Result<()> {
    match command {
        Command::Analyze {
            path,
            name,
            mode,
            check_remote,
        } => {
            let options = analyze::AnalyzeArgs {
                path,
                name,
                mode,
                check_remote,
            };
            analyze::run(options, config, format).await
        }
        Command::Build {
            dir,
            slug,
            version,
            kind,
            name,
            extract_source,
        } => {
            let args = build::BuildArgs {
                dir,
                slug,
                version,
                kind,
                name,
                extract_source,
            };
            build::run(args, config, format).await
        }
        Command::Tree { dir } => tree::run(&dir, format),
        Command::Compare { local, remote } => compare::run(&local, remote.as_deref(), format),
        Command::Process {
            archives,
            no_auto_build,
            jobs,
        } => process::run(archives, !no_auto_build, jobs, config, format).await,
        Command::Items { command } => items::run(command, config, format).await,
        Command::Publish { id } => publish::run(&id, config, format).await,
        Command::Config { command } => config::run(command, config, format).await,
    }
}
