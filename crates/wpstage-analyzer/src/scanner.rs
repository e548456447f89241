//! Archive scanner: finds header candidates and nested archives.

use crate::header::parse_header;
use std::path::Path;
use tracing::debug;
use wpstage_core::{Candidate, PackageKind, ScanMode, ScanOutcome};
use wpstage_fs::{read_prefix, IgnoreRules, TreeWalker, WalkEntry};

/// Headers are a top-of-file convention; nothing past this is read.
pub const DEFAULT_READ_LIMIT: usize = 8 * 1024;

/// Options for a single scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanOptions {
    /// Deepest directory level at which header files are considered.
    /// Nested archives are collected at every depth regardless.
    pub max_depth: Option<usize>,
    /// Bytes read from each candidate file
    pub read_limit: usize,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self::for_mode(ScanMode::Strict)
    }
}

impl ScanOptions {
    pub fn for_mode(mode: ScanMode) -> Self {
        Self {
            max_depth: mode.max_depth(),
            read_limit: DEFAULT_READ_LIMIT,
        }
    }
}

/// Header kind a file name can carry, if any.
///
/// `style.css` (exact name) is a theme entry file; any `.php` file may be a
/// plugin entry file.
pub fn classify(file_name: &str) -> Option<PackageKind> {
    if file_name == "style.css" {
        return Some(PackageKind::Theme);
    }
    let is_php = Path::new(file_name)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("php"));
    is_php.then_some(PackageKind::Plugin)
}

fn is_archive(file_name: &str) -> bool {
    file_name.to_ascii_lowercase().ends_with(".zip")
}

/// Scan an extracted tree rooted at `root`.
///
/// Directories named with a leading `.` or `__` (and well-known junk such as
/// `node_modules`) are pruned before anything inside them is looked at.
/// Files that cannot be read are left out; the scan never fails.
pub fn scan(root: &Path, options: &ScanOptions) -> ScanOutcome {
    let mut outcome = ScanOutcome::default();

    for entry in TreeWalker::new(root, IgnoreRules::scanner()).files() {
        let name = entry.file_name();

        if is_archive(name) {
            outcome.nested_archive_paths.push(entry.path.clone());
            continue;
        }

        if options.max_depth.is_some_and(|limit| entry.depth > limit) {
            continue;
        }

        if let Some(candidate) = inspect(&entry, options.read_limit) {
            outcome.candidates.push(candidate);
        }
    }

    outcome
}

fn inspect(entry: &WalkEntry, read_limit: usize) -> Option<Candidate> {
    let kind = classify(entry.file_name())?;

    let text = match read_prefix(&entry.path, read_limit) {
        Ok(text) => text,
        Err(err) => {
            debug!(path = %entry.path.display(), error = %err, "skipping unreadable candidate");
            return None;
        }
    };

    let header = parse_header(&text, kind)?;
    Some(Candidate {
        file_path: entry.path.clone(),
        kind,
        header,
        depth: entry.depth,
    })
}
