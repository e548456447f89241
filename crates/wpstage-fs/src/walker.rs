//! Depth-limited, predicate-filtered directory walks.

use crate::ignore::IgnorePredicate;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// One file or directory reached by a walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkEntry {
    /// Absolute (root-joined) path
    pub path: PathBuf,
    /// Path below the walk root
    pub relative: PathBuf,
    /// Directory levels between the root and this entry's parent.
    /// Entries directly inside the root have depth 0.
    pub depth: usize,
    pub is_dir: bool,
    /// Size in bytes (0 for directories)
    pub size: u64,
}

impl WalkEntry {
    pub fn file_name(&self) -> &str {
        self.path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
    }

    /// [`WalkEntry::relative`] joined with `/` on every platform.
    pub fn relative_slash(&self) -> String {
        to_slash(&self.relative)
    }
}

/// Join a relative path's components with `/`.
pub fn to_slash(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Recursive directory walker.
///
/// Entries come back in depth-first order with siblings sorted by file
/// name, so two walks over an unchanged tree yield the same sequence.
/// Unreadable entries and subtrees are skipped, never fatal.
#[derive(Debug, Clone)]
pub struct TreeWalker<P> {
    root: PathBuf,
    predicate: P,
    max_depth: Option<usize>,
    follow_symlinks: bool,
}

impl<P: IgnorePredicate> TreeWalker<P> {
    pub fn new(root: impl AsRef<Path>, predicate: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            predicate,
            max_depth: None,
            follow_symlinks: false,
        }
    }

    /// Limit the walk to entries with `depth <= limit`; `None` is unbounded.
    pub fn max_depth(mut self, limit: Option<usize>) -> Self {
        self.max_depth = limit;
        self
    }

    /// Follow symbolic links (default: false).
    pub fn follow_symlinks(mut self, follow: bool) -> Self {
        self.follow_symlinks = follow;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Collect every non-ignored entry below the root.
    pub fn walk(&self) -> Vec<WalkEntry> {
        let mut walker = WalkDir::new(&self.root)
            .min_depth(1)
            .follow_links(self.follow_symlinks)
            .sort_by_file_name();
        if let Some(limit) = self.max_depth {
            // walkdir counts the root's children as depth 1
            walker = walker.max_depth(limit + 1);
        }

        let root = self.root.as_path();
        let predicate = &self.predicate;
        let mut entries = Vec::new();

        let iter = walker.into_iter().filter_entry(|entry| {
            let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
            let name = entry.file_name().to_string_lossy();
            !predicate.is_ignored(relative, &name, entry.file_type().is_dir())
        });

        for entry in iter {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    debug!(root = %root.display(), error = %err, "skipping unreadable entry");
                    continue;
                }
            };

            let is_dir = entry.file_type().is_dir();
            let size = if is_dir {
                0
            } else {
                match entry.metadata() {
                    Ok(meta) => meta.len(),
                    Err(err) => {
                        debug!(path = %entry.path().display(), error = %err, "skipping entry without metadata");
                        continue;
                    }
                }
            };

            let relative = entry
                .path()
                .strip_prefix(root)
                .unwrap_or(entry.path())
                .to_path_buf();

            entries.push(WalkEntry {
                path: entry.path().to_path_buf(),
                relative,
                depth: entry.depth().saturating_sub(1),
                is_dir,
                size,
            });
        }

        entries
    }

    /// Only the files of [`TreeWalker::walk`].
    pub fn files(&self) -> Vec<WalkEntry> {
        self.walk().into_iter().filter(|e| !e.is_dir).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::IgnoreRules;
    use std::fs;
    use tempfile::TempDir;

    fn touch(root: &Path, relative: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "x").unwrap();
    }

    #[test]
    fn test_relative_slash() {
        assert_eq!(to_slash(Path::new("plugin/inc/a.php")), "plugin/inc/a.php");
        assert_eq!(to_slash(&Path::new("plugin").join("inc")), "plugin/inc");
    }

    #[test]
    fn test_depth_counts_from_root() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "root.php");
        touch(temp.path(), "plugin/main.php");
        touch(temp.path(), "plugin/inc/deep.php");

        let files = TreeWalker::new(temp.path(), IgnoreRules::none()).files();
        let depth_of = |name: &str| files.iter().find(|e| e.file_name() == name).unwrap().depth;

        assert_eq!(depth_of("root.php"), 0);
        assert_eq!(depth_of("main.php"), 1);
        assert_eq!(depth_of("deep.php"), 2);
    }

    #[test]
    fn test_max_depth_bounds_files() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "root.php");
        touch(temp.path(), "plugin/main.php");
        touch(temp.path(), "plugin/inc/deep.php");

        let files = TreeWalker::new(temp.path(), IgnoreRules::none())
            .max_depth(Some(1))
            .files();
        assert_eq!(files.len(), 2);
        assert!(files.iter().all(|e| e.depth <= 1));
    }

    #[test]
    fn test_ignored_directories_are_pruned() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), ".git/hooks/pre-commit.php");
        touch(temp.path(), "__MACOSX/plugin/._main.php");
        touch(temp.path(), "plugin/main.php");

        let files = TreeWalker::new(temp.path(), IgnoreRules::scanner()).files();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].relative, PathBuf::from("plugin/main.php"));
    }

    #[test]
    fn test_walk_order_is_sorted_and_stable() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "b.php");
        touch(temp.path(), "a.php");
        touch(temp.path(), "c/z.php");

        let walker = TreeWalker::new(temp.path(), IgnoreRules::none());
        let first: Vec<_> = walker.walk().into_iter().map(|e| e.relative).collect();
        let second: Vec<_> = walker.walk().into_iter().map(|e| e.relative).collect();

        assert_eq!(first, second);
        assert_eq!(first[0], PathBuf::from("a.php"));
        assert_eq!(first[1], PathBuf::from("b.php"));
    }

    #[test]
    fn test_missing_root_yields_nothing() {
        let temp = TempDir::new().unwrap();
        let entries = TreeWalker::new(temp.path().join("missing"), IgnoreRules::none()).walk();
        assert!(entries.is_empty());
    }
}
