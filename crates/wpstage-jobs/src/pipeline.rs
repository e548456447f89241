//! The per-item steps: register, analyze, review, build, publish.

use crate::error::{Error, Result};
use crate::events::LogSink;
use crate::store::ItemStore;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};
use wpstage_analyzer::{analyze, AnalyzeOptions};
use wpstage_builder::{extract_clean, BannerRenderer, Builder, TemplateBannerRenderer};
use wpstage_config::WpstageConfig;
use wpstage_core::{AnalysisResult, BuildOutput, ItemRecord, ItemStatus, ReviewOverrides};
use wpstage_remote::{Catalog, PublishReceipt, PublishRequest, Publisher};

/// Result of a build step.
#[derive(Debug, Clone)]
pub struct BuildReport {
    pub output: BuildOutput,
    /// Whether source was extracted: the version is newer, or the build was forced
    pub is_latest: bool,
    pub forced: bool,
    pub banner_path: Option<PathBuf>,
}

/// Everything a job needs, shared by all jobs of a queue.
#[derive(Clone)]
pub struct Pipeline {
    store: Arc<dyn ItemStore>,
    builder: Builder,
    extract_root: PathBuf,
    analyze_options: AnalyzeOptions,
    catalog: Option<Arc<dyn Catalog>>,
    banner: Option<Arc<dyn BannerRenderer>>,
}

impl Pipeline {
    pub fn new(
        store: Arc<dyn ItemStore>,
        staging_root: impl Into<PathBuf>,
        extract_root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            store,
            builder: Builder::new(staging_root),
            extract_root: extract_root.into(),
            analyze_options: AnalyzeOptions::default(),
            catalog: None,
            banner: None,
        }
    }

    /// Paths, scan mode and banner template from a loaded configuration.
    pub fn from_config(store: Arc<dyn ItemStore>, config: &WpstageConfig) -> Self {
        let mut pipeline = Self::new(store, &config.paths.staging_dir, config.extract_root());
        pipeline.analyze_options.mode = config.analysis.mode;
        pipeline.analyze_options.read_limit = config.analysis.read_limit;
        if let Some(template) = &config.paths.banner_template {
            pipeline.banner = Some(Arc::new(TemplateBannerRenderer::new(template)));
        }
        pipeline
    }

    pub fn with_analyze_options(mut self, options: AnalyzeOptions) -> Self {
        self.analyze_options = options;
        self
    }

    /// Consult `catalog` for the published version during builds.
    pub fn with_catalog(mut self, catalog: Arc<dyn Catalog>) -> Self {
        self.catalog = Some(catalog);
        self
    }

    pub fn with_banner(mut self, renderer: Arc<dyn BannerRenderer>) -> Self {
        self.banner = Some(renderer);
        self
    }

    pub fn store(&self) -> &Arc<dyn ItemStore> {
        &self.store
    }

    pub fn builder(&self) -> &Builder {
        &self.builder
    }

    /// Create an `Uploaded` record for an archive (or an already-extracted
    /// directory) at `upload_path`.
    pub async fn register(&self, upload_path: &Path, original_filename: Option<&str>) -> Result<ItemRecord> {
        if !tokio::fs::try_exists(upload_path).await? {
            return Err(Error::UploadMissing(upload_path.to_path_buf()));
        }

        let id = uuid::Uuid::new_v4().simple().to_string();
        let filename = original_filename
            .map(str::to_string)
            .or_else(|| {
                upload_path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
            })
            .unwrap_or_else(|| id.clone());

        let record = ItemRecord::new(
            id.clone(),
            filename,
            upload_path.to_path_buf(),
            self.extract_root.join(&id),
        );
        self.store.create(&record).await?;
        info!(id = %record.id, file = %record.original_filename, "item registered");
        Ok(record)
    }

    /// Directory the analysis runs on: the upload itself when it is a
    /// directory, otherwise the item's extraction directory.
    fn analysis_root(record: &ItemRecord) -> PathBuf {
        if record.upload_path.is_dir() {
            record.upload_path.clone()
        } else {
            record.extract_dir.clone()
        }
    }

    /// Extract, scan and score one item, persisting the verdict.
    pub async fn analyze(&self, item_id: &str, log: LogSink) -> Result<AnalysisResult> {
        let mut record = self.store.require(item_id).await?;
        record.set_status(ItemStatus::Analyzing);
        self.store.update(&record).await?;

        let root = Self::analysis_root(&record);
        if !record.upload_path.is_dir() {
            log("Extracting archive...");
            let archive = record.upload_path.clone();
            let dest = record.extract_dir.clone();
            let files = tokio::task::spawn_blocking(move || extract_clean(&archive, &dest)).await??;
            log(&format!("Extracted {files} files"));
        }

        let mut options = self.analyze_options.clone();
        options.original_filename = Some(record.original_filename.clone());
        let sink = log.clone();
        let result = tokio::task::spawn_blocking(move || {
            analyze(&root, &options, &mut |line: &str| sink(line))
        })
        .await?;

        record.apply_analysis(&result)?;
        self.store.update(&record).await?;
        log(&format!("Status: {}", record.status));

        Ok(result)
    }

    /// Apply reviewer corrections, making the item buildable.
    pub async fn review(&self, item_id: &str, overrides: &ReviewOverrides) -> Result<ItemRecord> {
        let mut record = self.store.require(item_id).await?;
        overrides.apply(&mut record)?;
        self.store.update(&record).await?;
        info!(id = %item_id, slug = ?record.slug, version = ?record.version, "item reviewed");
        Ok(record)
    }

    /// Whether `version` of `slug` should be treated as the new release.
    ///
    /// Other releasable items for the slug must not be ahead of it, and the
    /// catalog's latest must be strictly older. A failed catalog lookup
    /// counts as not newer.
    async fn check_version(&self, item_id: &str, slug: &str, version: &str, log: &LogSink) -> Result<bool> {
        let siblings: Vec<String> = self
            .store
            .list()
            .await?
            .into_iter()
            .filter(|r| r.id != item_id && r.status.counts_as_release())
            .filter(|r| r.slug.as_deref() == Some(slug))
            .filter_map(|r| r.version)
            .collect();
        if !wpstage_version::is_latest_among(version, &siblings) {
            return Ok(false);
        }

        let Some(catalog) = &self.catalog else {
            return Ok(true);
        };
        match catalog.latest_version(slug).await {
            Ok(remote) => Ok(wpstage_version::is_newer(version, remote.as_deref())),
            Err(err) => {
                warn!(slug = %slug, error = %err, "remote version lookup failed");
                log(&format!("Version Check Warning: {err}"));
                Ok(false)
            }
        }
    }

    /// Package an analyzed item into the staging directory.
    ///
    /// Source is extracted (and a banner rendered) only when the version is
    /// newer than every known release of its slug, or when `force` is set.
    /// The stored `is_newer` is the comparison result regardless of `force`.
    /// Without `force` the item must be `ReadyToUpload`, `Built` or
    /// `Published`.
    pub async fn build(&self, item_id: &str, force: bool, log: LogSink) -> Result<BuildReport> {
        let mut record = self.store.require(item_id).await?;
        if !force && !record.status.counts_as_release() {
            return Err(Error::InvalidStatus {
                id: record.id,
                status: record.status,
                expected: "ready_to_upload, built or published",
            });
        }

        let mut analysis = record
            .analysis()?
            .unwrap_or_else(|| AnalysisResult::verdict(0, "not analyzed"));
        if analysis.resolved_path.is_none() {
            analysis.resolved_path = Some(Self::analysis_root(&record));
        }
        let spec = analysis.build_spec()?;

        record.set_status(ItemStatus::Building);
        self.store.update(&record).await?;

        let newer = self
            .check_version(item_id, &spec.slug, &spec.version, &log)
            .await?;
        let is_latest = force || newer;
        log(if force {
            "Version Check: Forced"
        } else if newer {
            "Version Check: Is Latest"
        } else {
            "Version Check: Older Version"
        });

        log(&format!("Building {} {}...", spec.slug, spec.version));
        let builder = self.builder.clone();
        let build_spec = spec.clone();
        let output = tokio::task::spawn_blocking(move || builder.build(&build_spec, is_latest)).await??;
        log(&format!("Packaged {} files", output.file_count));

        let mut banner_path = None;
        if output.source_path.is_some() {
            if let Some(renderer) = &self.banner {
                let renderer = Arc::clone(renderer);
                let builder = self.builder.clone();
                let (banner_spec, banner_output) = (spec.clone(), output.clone());
                let rendered = tokio::task::spawn_blocking(move || {
                    builder.render_banner(renderer.as_ref(), &banner_spec, &banner_output)
                })
                .await?;
                match rendered {
                    Ok(path) => banner_path = Some(path),
                    Err(err) => {
                        warn!(slug = %spec.slug, error = %err, "banner not rendered");
                        log(&format!("Image Gen Warning: {err}"));
                    }
                }
            }
        }

        let analysis = analysis.with_newer(newer);
        record.metadata = Some(analysis.to_metadata()?);
        record.set_status(ItemStatus::Built);
        self.store.update(&record).await?;
        log(&format!("Build complete: {}", output.archive_path.display()));

        Ok(BuildReport {
            output,
            is_latest,
            forced: force,
            banner_path,
        })
    }

    /// Upload a built item and register it with the catalog.
    pub async fn publish(&self, item_id: &str, publisher: &Publisher) -> Result<PublishReceipt> {
        let mut record = self.store.require(item_id).await?;
        if !matches!(record.status, ItemStatus::Built | ItemStatus::Published) {
            return Err(Error::InvalidStatus {
                id: record.id,
                status: record.status,
                expected: "built or published",
            });
        }

        let analysis = record
            .analysis()?
            .unwrap_or_else(|| AnalysisResult::verdict(0, "not analyzed"));
        let kind = analysis
            .kind
            .ok_or(wpstage_core::Error::MissingField { field: "type" })?;
        let slug = analysis
            .slug
            .clone()
            .ok_or(wpstage_core::Error::MissingField { field: "slug" })?;
        let version = analysis
            .version
            .clone()
            .ok_or(wpstage_core::Error::MissingField { field: "version" })?;

        let version_dir = self.builder.layout().version_dir(kind, &slug, &version)?;
        let request = PublishRequest {
            kind,
            name: analysis.name.clone().unwrap_or_else(|| slug.clone()),
            slug,
            version,
            author: analysis.author.clone(),
            author_url: analysis.author_url.clone(),
            version_dir,
        };

        let receipt = publisher.publish(&request).await?;

        record.set_status(ItemStatus::Published);
        self.store.update(&record).await?;
        Ok(receipt)
    }

    /// Record a job failure on the item.
    pub async fn mark_failed(&self, item_id: &str, error: &Error) -> Result<()> {
        let mut record = self.store.require(item_id).await?;
        record.analysis_log = Some(error.to_string());
        record.set_status(ItemStatus::Failed);
        self.store.update(&record).await
    }
}
