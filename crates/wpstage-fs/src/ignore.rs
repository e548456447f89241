//! Ignore predicates for tree walks.

use crate::error::{Error, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::Path;

/// Names that are never part of a package, matched case-insensitively.
pub const JUNK_NAMES: &[&str] = &["node_modules", ".git", "__macosx", ".ds_store"];

/// Decides whether a walk should skip an entry.
///
/// Skipping a directory prunes its whole subtree.
pub trait IgnorePredicate {
    /// `relative` is the entry's path below the walk root.
    fn is_ignored(&self, relative: &Path, name: &str, is_dir: bool) -> bool;
}

impl<F> IgnorePredicate for F
where
    F: Fn(&Path, &str, bool) -> bool,
{
    fn is_ignored(&self, relative: &Path, name: &str, is_dir: bool) -> bool {
        self(relative, name, is_dir)
    }
}

/// Names starting with `.` or `__` (`.git`, `.svn`, `__MACOSX`, ...).
///
/// The prefix check is case-sensitive; it needs no case folding.
pub fn is_hidden_or_metadata(name: &str) -> bool {
    name.starts_with('.') || name.starts_with("__")
}

/// Case-insensitive membership in [`JUNK_NAMES`].
pub fn is_junk_name(name: &str) -> bool {
    JUNK_NAMES.iter().any(|junk| name.eq_ignore_ascii_case(junk))
}

/// The stock ignore predicate, configurable per caller.
#[derive(Debug, Clone, Default)]
pub struct IgnoreRules {
    /// Skip directories named with a leading `.` or `__`
    pub hidden_dirs: bool,
    /// Skip hidden files as well
    pub hidden_files: bool,
    /// Skip [`JUNK_NAMES`] (files and directories)
    pub junk: bool,
    /// Extra glob patterns matched against the relative path
    pub globs: Option<GlobSet>,
}

impl IgnoreRules {
    /// Rules for header and nested-archive scanning.
    pub fn scanner() -> Self {
        Self {
            hidden_dirs: true,
            hidden_files: false,
            junk: true,
            globs: None,
        }
    }

    /// Rules for source tree descriptions.
    pub fn tree() -> Self {
        Self {
            hidden_dirs: false,
            hidden_files: false,
            junk: true,
            globs: None,
        }
    }

    /// Rules for enumerating files to upload: junk and anything hidden.
    pub fn upload() -> Self {
        Self {
            hidden_dirs: true,
            hidden_files: true,
            junk: true,
            globs: None,
        }
    }

    /// Rules that skip nothing.
    pub fn none() -> Self {
        Self::default()
    }

    /// Add glob patterns (e.g. `**/*.map`) on top of these rules.
    pub fn with_patterns<S: AsRef<str>>(mut self, patterns: &[S]) -> Result<Self> {
        if patterns.is_empty() {
            return Ok(self);
        }

        let mut builder = GlobSetBuilder::new();
        for pattern in patterns {
            let pattern = pattern.as_ref();
            let glob = Glob::new(pattern).map_err(|source| Error::Pattern {
                pattern: pattern.to_string(),
                source,
            })?;
            builder.add(glob);
        }
        let set = builder.build().map_err(|source| Error::Pattern {
            pattern: patterns
                .iter()
                .map(|p| p.as_ref())
                .collect::<Vec<_>>()
                .join(", "),
            source,
        })?;

        self.globs = Some(set);
        Ok(self)
    }
}

impl IgnorePredicate for IgnoreRules {
    fn is_ignored(&self, relative: &Path, name: &str, is_dir: bool) -> bool {
        if self.junk && is_junk_name(name) {
            return true;
        }
        if is_hidden_or_metadata(name) && ((is_dir && self.hidden_dirs) || (!is_dir && self.hidden_files)) {
            return true;
        }
        match &self.globs {
            Some(globs) => globs.is_match(relative),
            None => false,
        }
    }
}
