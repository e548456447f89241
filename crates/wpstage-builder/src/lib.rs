//! wpstage Builder - turns an analyzed source folder into a staged release.
//!
//! A build writes into `<staging>/<type>/<slug>/<version>/`:
//!
//! ```text
//! download.zip   every file under a single <slug>/ folder
//! tree.json      sorted description of the source (regenerated each build)
//! source/        the archive re-extracted, only for the latest version
//! banner.png     written separately by a BannerRenderer
//! ```
//!
//! The source extraction comes from the finished archive rather than the
//! input folder, so what is browsed and what is downloaded never differ.

pub mod banner;
pub mod error;
pub mod extract;
pub mod flatten;
pub mod layout;
pub mod package;
pub mod tree;

pub use banner::{BannerRenderer, BannerRequest, TemplateBannerRenderer};
pub use error::{Error, Result};
pub use extract::{extract_archive, extract_clean};
pub use flatten::effective_source;
pub use layout::{RemoteKeys, StagingLayout, ARCHIVE_NAME, BANNER_NAME, SOURCE_DIR, TREE_NAME};
pub use package::{sha256_of, write_archive, ArchiveSummary};
pub use tree::{describe, write_tree};

use std::fs;
use std::path::PathBuf;
use tracing::info;
use wpstage_core::{BuildOutput, BuildSpec};

/// Builds releases into one staging root.
#[derive(Debug, Clone)]
pub struct Builder {
    layout: StagingLayout,
}

impl Builder {
    pub fn new(staging_root: impl Into<PathBuf>) -> Self {
        Self {
            layout: StagingLayout::new(staging_root),
        }
    }

    pub fn layout(&self) -> &StagingLayout {
        &self.layout
    }

    /// Package `spec.source_dir` and write `tree.json`. With
    /// `extract_source`, `source/` is replaced by a fresh extraction of the
    /// new archive; without it, `source/` is left untouched.
    pub fn build(&self, spec: &BuildSpec, extract_source: bool) -> Result<BuildOutput> {
        let version_dir = self
            .layout
            .version_dir(spec.kind, &spec.slug, &spec.version)?;

        if !spec.source_dir.is_dir() {
            return Err(Error::SourceMissing(spec.source_dir.clone()));
        }
        let source = effective_source(&spec.source_dir, &spec.slug)?;

        fs::create_dir_all(&version_dir)?;

        let archive = write_archive(&source, &spec.slug, &version_dir.join(ARCHIVE_NAME))?;

        let tree_path = version_dir.join(TREE_NAME);
        write_tree(&describe(&source), &tree_path)?;

        let source_path = if extract_source {
            let dest = version_dir.join(SOURCE_DIR);
            extract_clean(&archive.path, &dest)?;
            Some(dest)
        } else {
            None
        };

        info!(
            kind = %spec.kind,
            slug = %spec.slug,
            version = %spec.version,
            files = archive.file_count,
            extracted = extract_source,
            "build complete"
        );

        Ok(BuildOutput {
            version_dir,
            archive_path: archive.path,
            source_path,
            tree_path: Some(tree_path),
            archive_sha256: archive.sha256,
            file_count: archive.file_count,
        })
    }

    /// Render the banner for a finished build into its version directory.
    pub fn render_banner(
        &self,
        renderer: &dyn BannerRenderer,
        spec: &BuildSpec,
        output: &BuildOutput,
    ) -> Result<PathBuf> {
        let dest = output.version_dir.join(BANNER_NAME);
        let request = BannerRequest {
            kind: spec.kind,
            slug: &spec.slug,
            name: spec.name.as_deref().unwrap_or(&spec.slug),
            version: &spec.version,
        };
        renderer.render(&request, &dest)?;
        Ok(dest)
    }
}
