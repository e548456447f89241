//! Persisted item records and their lifecycle.

use crate::error::{Error, Result};
use crate::types::{AnalysisResult, PackageKind};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Where an uploaded archive is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    Uploaded,
    Analyzing,
    /// Scored 10/10, or confirmed by a reviewer
    ReadyToUpload,
    NeedsReview,
    Building,
    Built,
    Published,
    Failed,
}

impl ItemStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemStatus::Uploaded => "uploaded",
            ItemStatus::Analyzing => "analyzing",
            ItemStatus::ReadyToUpload => "ready_to_upload",
            ItemStatus::NeedsReview => "needs_review",
            ItemStatus::Building => "building",
            ItemStatus::Built => "built",
            ItemStatus::Published => "published",
            ItemStatus::Failed => "failed",
        }
    }

    /// Status after analysis: only a perfect score skips review.
    pub fn after_analysis(result: &AnalysisResult) -> Self {
        if result.is_auto_buildable() {
            ItemStatus::ReadyToUpload
        } else {
            ItemStatus::NeedsReview
        }
    }

    /// Whether a record in this status counts as a known version of its slug.
    pub fn counts_as_release(&self) -> bool {
        matches!(
            self,
            ItemStatus::ReadyToUpload | ItemStatus::Built | ItemStatus::Published
        )
    }
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let status = match s {
            "uploaded" => ItemStatus::Uploaded,
            "analyzing" => ItemStatus::Analyzing,
            "ready_to_upload" | "ready" => ItemStatus::ReadyToUpload,
            "needs_review" => ItemStatus::NeedsReview,
            "building" => ItemStatus::Building,
            "built" => ItemStatus::Built,
            "published" => ItemStatus::Published,
            "failed" => ItemStatus::Failed,
            other => return Err(Error::UnknownStatus(other.to_string())),
        };
        Ok(status)
    }
}

/// One uploaded archive and everything learned about it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemRecord {
    pub id: String,
    pub original_filename: String,
    /// Where the uploaded archive bytes live
    pub upload_path: PathBuf,
    /// Scratch directory the archive is extracted into
    pub extract_dir: PathBuf,
    pub status: ItemStatus,
    #[serde(default)]
    pub score: Option<u8>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<PackageKind>,
    /// Snapshot of the last [`AnalysisResult`]
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
    /// Reason string from the last analysis, or the last error
    #[serde(default)]
    pub analysis_log: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ItemRecord {
    pub fn new(
        id: impl Into<String>,
        original_filename: impl Into<String>,
        upload_path: PathBuf,
        extract_dir: PathBuf,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            original_filename: original_filename.into(),
            upload_path,
            extract_dir,
            status: ItemStatus::Uploaded,
            score: None,
            slug: None,
            version: None,
            kind: None,
            metadata: None,
            analysis_log: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Record an analysis verdict.
    pub fn apply_analysis(&mut self, result: &AnalysisResult) -> Result<()> {
        self.score = Some(result.score);
        self.status = ItemStatus::after_analysis(result);
        self.slug = result.slug.clone();
        self.version = result.version.clone();
        self.kind = result.kind;
        self.metadata = Some(result.to_metadata()?);
        self.analysis_log = Some(result.reason.clone());
        self.touch();
        Ok(())
    }

    /// The stored analysis snapshot, if any.
    pub fn analysis(&self) -> Result<Option<AnalysisResult>> {
        self.metadata
            .as_ref()
            .map(AnalysisResult::from_metadata)
            .transpose()
    }

    pub fn set_status(&mut self, status: ItemStatus) {
        self.status = status;
        self.touch();
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Corrections a reviewer makes before a below-threshold item is built.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewOverrides {
    pub slug: Option<String>,
    pub version: Option<String>,
    pub name: Option<String>,
    pub kind: Option<PackageKind>,
}

impl ReviewOverrides {
    pub fn is_empty(&self) -> bool {
        self.slug.is_none() && self.version.is_none() && self.name.is_none() && self.kind.is_none()
    }

    /// Apply the overrides to a record and its snapshot, marking it ready.
    pub fn apply(&self, record: &mut ItemRecord) -> Result<()> {
        let mut analysis = record
            .analysis()?
            .unwrap_or_else(|| AnalysisResult::verdict(0, "manual review"));

        if let Some(slug) = &self.slug {
            analysis.slug = Some(slug.clone());
        }
        if let Some(version) = &self.version {
            analysis.version = Some(version.clone());
        }
        if let Some(name) = &self.name {
            analysis.name = Some(name.clone());
        }
        if let Some(kind) = self.kind {
            analysis.kind = Some(kind);
        }

        record.slug = analysis.slug.clone();
        record.version = analysis.version.clone();
        record.kind = analysis.kind;
        record.metadata = Some(analysis.to_metadata()?);
        record.set_status(ItemStatus::ReadyToUpload);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> ItemRecord {
        ItemRecord::new(
            "item-1",
            "Akismet.zip",
            PathBuf::from("/uploads/item-1.zip"),
            PathBuf::from("/temp/item-1"),
        )
    }

    #[test]
    fn test_perfect_score_skips_review() {
        let mut item = record();
        let mut result = AnalysisResult::verdict(10, "perfect structure");
        result.slug = Some("akismet".to_string());
        item.apply_analysis(&result).unwrap();
        assert_eq!(item.status, ItemStatus::ReadyToUpload);
        assert_eq!(item.slug.as_deref(), Some("akismet"));

        item.apply_analysis(&AnalysisResult::verdict(9, "good")).unwrap();
        assert_eq!(item.status, ItemStatus::NeedsReview);
    }

    #[test]
    fn test_review_overrides_update_snapshot() {
        let mut item = record();
        item.apply_analysis(&AnalysisResult::verdict(2, "no root folder"))
            .unwrap();

        let overrides = ReviewOverrides {
            slug: Some("akismet".to_string()),
            version: Some("5.3.1".to_string()),
            ..Default::default()
        };
        overrides.apply(&mut item).unwrap();

        assert_eq!(item.status, ItemStatus::ReadyToUpload);
        let snapshot = item.analysis().unwrap().unwrap();
        assert_eq!(snapshot.slug.as_deref(), Some("akismet"));
        assert_eq!(snapshot.version.as_deref(), Some("5.3.1"));
        assert_eq!(snapshot.score, 2);
    }

    #[test]
    fn test_status_round_trips_through_str() {
        for status in [
            ItemStatus::Uploaded,
            ItemStatus::ReadyToUpload,
            ItemStatus::NeedsReview,
            ItemStatus::Published,
        ] {
            assert_eq!(status.as_str().parse::<ItemStatus>().unwrap(), status);
        }
        assert!("bogus".parse::<ItemStatus>().is_err());
    }
}
