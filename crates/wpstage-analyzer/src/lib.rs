//! wpstage Analyzer - identifies and scores WordPress plugin/theme archives.
//!
//! The analyzer works on an already-extracted directory:
//!
//! 1. [`scanner`] walks the tree, collecting header candidates and nested
//!    archives (hidden and metadata folders are never entered).
//! 2. [`header`] parses each candidate's comment header.
//! 3. [`scoring`] applies the zero/one/many decision table and produces a
//!    single [`AnalysisResult`].
//!
//! Nothing here holds state between calls; concurrent analyses of disjoint
//! trees are independent.
//!
//! # Example
//!
//! ```no_run
//! use wpstage_analyzer::{analyze, AnalyzeOptions};
//! use std::path::Path;
//!
//! let options = AnalyzeOptions {
//!     original_filename: Some("akismet.5.3.zip".to_string()),
//!     ..Default::default()
//! };
//! let result = analyze(Path::new("/tmp/extracted"), &options, &mut |line| println!("{line}"));
//! println!("{} -> {}/10", result.reason, result.score);
//! ```

pub mod header;
pub mod scanner;
pub mod scoring;

pub use header::{parse_header, HeaderParser};
pub use scanner::{classify, scan, ScanOptions, DEFAULT_READ_LIMIT};
pub use scoring::{score, score_candidate, SlugContext};

use std::path::Path;
use tracing::{info, warn};
use wpstage_core::{AnalysisResult, ScanMode, MAX_SCORE};

/// Options for one analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyzeOptions {
    pub mode: ScanMode,
    /// Name the archive was uploaded under
    pub original_filename: Option<String>,
    pub read_limit: usize,
}

impl Default for AnalyzeOptions {
    fn default() -> Self {
        Self {
            mode: ScanMode::Strict,
            original_filename: None,
            read_limit: DEFAULT_READ_LIMIT,
        }
    }
}

/// Scan and score an extracted archive.
///
/// Progress lines go to `log` as they happen, in order; the same lines are
/// emitted through `tracing`.
pub fn analyze(root: &Path, options: &AnalyzeOptions, log: &mut dyn FnMut(&str)) -> AnalysisResult {
    log("Starting analysis...");

    let scan_options = ScanOptions {
        max_depth: options.mode.max_depth(),
        read_limit: options.read_limit,
    };
    let outcome = scan(root, &scan_options);

    for candidate in &outcome.candidates {
        let relative = candidate.file_path.strip_prefix(root).unwrap_or(&candidate.file_path);
        let line = format!("Found header in: {}", relative.display());
        info!(path = %relative.display(), kind = %candidate.kind, "header found");
        log(&line);
    }

    for archive in &outcome.nested_archive_paths {
        let relative = archive.strip_prefix(root).unwrap_or(archive);
        warn!(path = %relative.display(), "nested archive found");
        log(&format!("Warning: found inner zip at: {}", relative.display()));
    }

    if outcome.candidates.len() > 1 {
        let names: Vec<&str> = outcome
            .candidates
            .iter()
            .map(|c| c.header.name.as_str())
            .collect();
        log(&format!(
            "Critical: multiple installable items found: {}",
            names.join(", ")
        ));
    }

    let slugs = SlugContext::new(root).with_original_filename(options.original_filename.as_deref());
    let result = score(&outcome, &slugs);

    info!(score = result.score, reason = %result.reason, "analysis complete");
    log(&format!(
        "Analysis complete. Score: {}/{}. Reason: {}",
        result.score, MAX_SCORE, result.reason
    ));

    result
}

/// [`analyze`] without a progress sink.
pub fn analyze_quiet(root: &Path, options: &AnalyzeOptions) -> AnalysisResult {
    analyze(root, options, &mut |_| {})
}
