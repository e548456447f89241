//! Release banner rendering.

use crate::error::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use wpstage_core::PackageKind;

/// What a banner is drawn for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BannerRequest<'a> {
    pub kind: PackageKind,
    pub slug: &'a str,
    pub name: &'a str,
    pub version: &'a str,
}

/// Produces a PNG banner for a built release.
pub trait BannerRenderer: Send + Sync {
    fn render(&self, request: &BannerRequest<'_>, dest: &Path) -> Result<()>;
}

/// Copies a fixed PNG for every release.
#[derive(Debug, Clone)]
pub struct TemplateBannerRenderer {
    template: PathBuf,
}

impl TemplateBannerRenderer {
    pub fn new(template: impl Into<PathBuf>) -> Self {
        Self {
            template: template.into(),
        }
    }
}

impl BannerRenderer for TemplateBannerRenderer {
    fn render(&self, request: &BannerRequest<'_>, dest: &Path) -> Result<()> {
        if !self.template.is_file() {
            return Err(Error::BannerTemplateMissing(self.template.clone()));
        }
        fs::copy(&self.template, dest)?;
        debug!(slug = request.slug, version = request.version, dest = %dest.display(), "banner rendered");
        Ok(())
    }
}
