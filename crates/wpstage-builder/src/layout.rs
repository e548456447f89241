//! Where build outputs live, locally and in object storage.

use crate::error::Result;
use std::path::{Path, PathBuf};
use wpstage_config::validate_path_segment;
use wpstage_core::PackageKind;

pub const ARCHIVE_NAME: &str = "download.zip";
pub const SOURCE_DIR: &str = "source";
pub const TREE_NAME: &str = "tree.json";
pub const BANNER_NAME: &str = "banner.png";

/// The staging directory: `<root>/<type>/<slug>/<version>/...`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagingLayout {
    root: PathBuf,
}

impl StagingLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory for one release. Slug and version are validated first, so
    /// the result is always inside the staging root.
    pub fn version_dir(&self, kind: PackageKind, slug: &str, version: &str) -> Result<PathBuf> {
        validate_path_segment("slug", slug)?;
        validate_path_segment("version", version)?;
        Ok(self.root.join(kind.as_str()).join(slug).join(version))
    }
}

/// Object keys for one release: `<type>s/<slug>/<version>/...`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteKeys {
    prefix: String,
}

impl RemoteKeys {
    pub fn new(kind: PackageKind, slug: &str, version: &str) -> Result<Self> {
        validate_path_segment("slug", slug)?;
        validate_path_segment("version", version)?;
        Ok(Self {
            prefix: format!("{}/{}/{}", kind.remote_prefix(), slug, version),
        })
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn archive(&self) -> String {
        format!("{}/{}", self.prefix, ARCHIVE_NAME)
    }

    pub fn tree(&self) -> String {
        format!("{}/{}", self.prefix, TREE_NAME)
    }

    pub fn banner(&self) -> String {
        format!("{}/{}", self.prefix, BANNER_NAME)
    }

    /// Key for a file below the extracted source, given its `/`-joined
    /// relative path.
    pub fn source(&self, relative: &str) -> String {
        format!("{}/{}/{}", self.prefix, SOURCE_DIR, relative.trim_start_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn test_version_dir() {
        let layout = StagingLayout::new("/srv/staging");
        let dir = layout
            .version_dir(PackageKind::Plugin, "akismet", "5.3")
            .unwrap();
        assert_eq!(dir, PathBuf::from("/srv/staging/plugin/akismet/5.3"));
    }

    #[test]
    fn test_version_dir_rejects_traversal() {
        let layout = StagingLayout::new("/srv/staging");
        let err = layout
            .version_dir(PackageKind::Theme, "../../etc", "1.0")
            .unwrap_err();
        assert!(matches!(err, Error::Security(_)));
        assert!(layout.version_dir(PackageKind::Theme, "astra", "").is_err());
    }

    #[test]
    fn test_remote_keys() {
        let keys = RemoteKeys::new(PackageKind::Theme, "astra", "4.1.0").unwrap();
        assert_eq!(keys.archive(), "themes/astra/4.1.0/download.zip");
        assert_eq!(keys.tree(), "themes/astra/4.1.0/tree.json");
        assert_eq!(keys.banner(), "themes/astra/4.1.0/banner.png");
        assert_eq!(
            keys.source("astra/inc/core.php"),
            "themes/astra/4.1.0/source/astra/inc/core.php"
        );
    }
}
