//! Core data types for wpstage analysis and builds.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Highest score the scoring engine hands out.
pub const MAX_SCORE: u8 = 10;

/// Minimum score at which a detected slug is trusted without review.
pub const VALID_THRESHOLD: u8 = 7;

/// Version of the serialized [`AnalysisResult`] layout.
pub const ANALYSIS_SCHEMA_VERSION: u32 = 1;

/// Kind of WordPress package an archive holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageKind {
    /// A plugin, identified by a `Plugin Name:` header in a `.php` file
    Plugin,
    /// A theme, identified by a `Theme Name:` header in `style.css`
    Theme,
}

impl PackageKind {
    /// Lowercase name, used in staging paths and serialized records.
    pub fn as_str(&self) -> &'static str {
        match self {
            PackageKind::Plugin => "plugin",
            PackageKind::Theme => "theme",
        }
    }

    /// Header key that declares the package name.
    pub fn name_key(&self) -> &'static str {
        match self {
            PackageKind::Plugin => "Plugin Name",
            PackageKind::Theme => "Theme Name",
        }
    }

    /// Header key holding the package's own URL.
    pub fn uri_key(&self) -> &'static str {
        match self {
            PackageKind::Plugin => "Plugin URI",
            PackageKind::Theme => "Theme URI",
        }
    }

    /// Prefix used for remote object keys (`plugins/...`, `themes/...`).
    pub fn remote_prefix(&self) -> &'static str {
        match self {
            PackageKind::Plugin => "plugins",
            PackageKind::Theme => "themes",
        }
    }

    /// Uppercase label the catalog API expects.
    pub fn catalog_label(&self) -> &'static str {
        match self {
            PackageKind::Plugin => "PLUGIN",
            PackageKind::Theme => "THEME",
        }
    }
}

impl fmt::Display for PackageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PackageKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "plugin" | "plugins" => Ok(PackageKind::Plugin),
            "theme" | "themes" => Ok(PackageKind::Theme),
            _ => Err(Error::UnknownKind(s.to_string())),
        }
    }
}

/// How deep the scanner looks for header files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanMode {
    /// Headers only at the root or one folder down; the analysis default
    #[default]
    Strict,
    /// Headers at any depth, deep ones penalized by scoring
    Full,
}

impl ScanMode {
    /// Deepest candidate depth this mode accepts.
    pub fn max_depth(&self) -> Option<usize> {
        match self {
            ScanMode::Strict => Some(1),
            ScanMode::Full => None,
        }
    }
}

impl FromStr for ScanMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(ScanMode::Strict),
            "full" => Ok(ScanMode::Full),
            _ => Err(Error::UnknownScanMode(s.to_string())),
        }
    }
}

/// Metadata declared in a package's header comment block.
///
/// Only files with a name header become a `HeaderInfo`; every other field
/// is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderInfo {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_domain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A file with a valid header, found while scanning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Absolute path of the header file
    pub file_path: PathBuf,
    /// Plugin for `*.php`, theme for `style.css`
    pub kind: PackageKind,
    pub header: HeaderInfo,
    /// Directory levels below the scan root (root-level files are 0)
    pub depth: usize,
}

/// Everything a scan found under one root.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanOutcome {
    /// Candidates in scan order
    pub candidates: Vec<Candidate>,
    /// Every `.zip` found outside hidden and metadata folders
    pub nested_archive_paths: Vec<PathBuf>,
}

impl ScanOutcome {
    /// Whether any nested archive was seen.
    pub fn has_nested_archive(&self) -> bool {
        !self.nested_archive_paths.is_empty()
    }
}

/// The scoring engine's verdict for one uploaded archive.
///
/// `is_valid` is `score >= VALID_THRESHOLD`, with one exception: a bundle
/// (no headers, but a nested archive) is valid at score 4 because its inner
/// archives can be processed on their own. Use [`AnalysisResult::set_score`]
/// rather than assigning the two fields separately.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub schema_version: u32,
    pub is_valid: bool,
    pub score: u8,
    #[serde(rename = "type")]
    pub kind: Option<PackageKind>,
    pub slug: Option<String>,
    pub name: Option<String>,
    pub version: Option<String>,
    pub author: Option<String>,
    pub author_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_domain: Option<String>,
    pub reason: String,
    /// Directory holding the winning header file
    pub resolved_path: Option<PathBuf>,
    /// Winning header file, relative to the scan root
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub found_in_file: Option<PathBuf>,
    /// Names of every candidate, in scan order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub candidate_names: Vec<String>,
    /// Nested archives, relative to the scan root
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub nested_archives: Vec<PathBuf>,
    /// Set by the orchestration layer after a version check
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_newer: Option<bool>,
}

impl AnalysisResult {
    /// A verdict with no package identity attached.
    pub fn verdict(score: u8, reason: impl Into<String>) -> Self {
        let score = score.min(MAX_SCORE);
        Self {
            schema_version: ANALYSIS_SCHEMA_VERSION,
            is_valid: score >= VALID_THRESHOLD,
            score,
            kind: None,
            slug: None,
            name: None,
            version: None,
            author: None,
            author_url: None,
            description: None,
            text_domain: None,
            reason: reason.into(),
            resolved_path: None,
            found_in_file: None,
            candidate_names: Vec::new(),
            nested_archives: Vec::new(),
            is_newer: None,
        }
    }

    /// The verdict for an archive that only wraps other archives.
    pub fn bundle(score: u8, reason: impl Into<String>) -> Self {
        let mut result = Self::verdict(score, reason);
        result.is_valid = true;
        result
    }

    /// Replace score and reason, keeping `is_valid` consistent.
    pub fn set_score(&mut self, score: u8, reason: impl Into<String>) {
        self.score = score.min(MAX_SCORE);
        self.is_valid = self.score >= VALID_THRESHOLD;
        self.reason = reason.into();
    }

    /// Copy identity fields from a parsed header.
    pub fn apply_header(&mut self, kind: PackageKind, header: &HeaderInfo) {
        self.kind = Some(kind);
        self.name = Some(header.name.clone());
        self.version = header.version.clone();
        self.author = header.author.clone();
        self.author_url = header.author_url.clone();
        self.description = header.description.clone();
        self.text_domain = header.text_domain.clone();
    }

    /// A perfect score means the archive can be built without review.
    pub fn is_auto_buildable(&self) -> bool {
        self.score == MAX_SCORE
    }

    /// Attach the version comparator's decision.
    pub fn with_newer(mut self, newer: bool) -> Self {
        self.is_newer = Some(newer);
        self
    }

    /// Extract what the build step needs, failing on the first missing field.
    pub fn build_spec(&self) -> Result<BuildSpec> {
        let kind = self.kind.ok_or(Error::MissingField { field: "type" })?;
        let slug = self.slug.clone().ok_or(Error::MissingField { field: "slug" })?;
        let version = self
            .version
            .clone()
            .ok_or(Error::MissingField { field: "version" })?;
        let source_dir = self
            .resolved_path
            .clone()
            .ok_or(Error::MissingField { field: "resolved_path" })?;

        Ok(BuildSpec {
            kind,
            slug,
            version,
            name: self.name.clone(),
            source_dir,
        })
    }

    /// Serialize into the opaque metadata snapshot stored on an item record.
    pub fn to_metadata(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// Restore a snapshot produced by [`AnalysisResult::to_metadata`].
    pub fn from_metadata(value: &serde_json::Value) -> Result<Self> {
        Ok(serde_json::from_value(value.clone())?)
    }
}

/// Identity and input directory for one build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildSpec {
    pub kind: PackageKind,
    pub slug: String,
    pub version: String,
    pub name: Option<String>,
    /// Directory whose contents become `<slug>/` inside the archive
    pub source_dir: PathBuf,
}

/// One entry of a source tree description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TreeNode {
    File {
        name: String,
        /// Forward-slash path relative to the tree root
        path: String,
        size: u64,
    },
    Folder {
        name: String,
        path: String,
        children: Vec<TreeNode>,
    },
}

impl TreeNode {
    pub fn name(&self) -> &str {
        match self {
            TreeNode::File { name, .. } | TreeNode::Folder { name, .. } => name,
        }
    }

    pub fn path(&self) -> &str {
        match self {
            TreeNode::File { path, .. } | TreeNode::Folder { path, .. } => path,
        }
    }

    /// Number of files at or below this node.
    pub fn file_count(&self) -> usize {
        match self {
            TreeNode::File { .. } => 1,
            TreeNode::Folder { children, .. } => children.iter().map(TreeNode::file_count).sum(),
        }
    }
}

/// Artifacts written by one build, all under `version_dir`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildOutput {
    /// `<staging>/<type>/<slug>/<version>`
    pub version_dir: PathBuf,
    pub archive_path: PathBuf,
    /// Present only when source extraction was requested
    pub source_path: Option<PathBuf>,
    pub tree_path: Option<PathBuf>,
    /// Lowercase hex SHA-256 of the archive
    pub archive_sha256: String,
    /// Number of files packed into the archive
    pub file_count: usize,
}
