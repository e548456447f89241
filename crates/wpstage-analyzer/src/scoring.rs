//! Scoring and disambiguation.
//!
//! Turns a [`ScanOutcome`] into exactly one [`AnalysisResult`]. The decision
//! table, evaluated in order:
//!
//! | candidates | nested archive | verdict                                   |
//! |------------|----------------|-------------------------------------------|
//! | 0          | yes            | bundle, score 4, valid                    |
//! | 0          | no             | junk, score 0                             |
//! | 2+         | either         | ambiguous, score 3, shallowest wins       |
//! | 1          | yes            | candidate identity, score forced to 4     |
//! | 1          | no             | candidate score (10, 9, 7, 2, or cap 5)   |
//!
//! Scoring is total: every outcome, including the empty one, maps to a
//! verdict.

use std::path::{Path, PathBuf};
use wpstage_core::{AnalysisResult, Candidate, ScanOutcome};

pub const SCORE_PERFECT: u8 = 10;
pub const SCORE_MISSING_TEXT_DOMAIN: u8 = 9;
pub const SCORE_TEXT_DOMAIN_MISMATCH: u8 = 7;
pub const SCORE_TOO_DEEP_CAP: u8 = 5;
pub const SCORE_NESTED_ARCHIVE: u8 = 4;
pub const SCORE_AMBIGUOUS: u8 = 3;
pub const SCORE_NO_ROOT_FOLDER: u8 = 2;
pub const SCORE_JUNK: u8 = 0;

/// Slug used when nothing else identifies a root-level package.
pub const UNKNOWN_SLUG: &str = "unknown-slug";

pub const REASON_BUNDLE: &str = "bundle: inner archive found, no installable headers at top level";
pub const REASON_JUNK: &str = "junk: no recognized headers found";
pub const REASON_NESTED: &str = "warning: valid header found but archive also contains a nested zip";
pub const REASON_PERFECT: &str = "perfect structure";
pub const REASON_MISSING_TEXT_DOMAIN: &str = "good, text domain missing";
pub const REASON_MISMATCH: &str = "mismatch: text domain differs from folder name";
pub const REASON_NO_ROOT_FOLDER: &str = "no root folder";
pub const REASON_TOO_DEEP: &str = "file found too deep";

/// Where slugs come from for one scan.
#[derive(Debug, Clone, Copy)]
pub struct SlugContext<'a> {
    /// The scan root; candidate folders are named relative to it
    pub root: &'a Path,
    /// Upload file name, the last resort for root-level packages
    pub original_filename: Option<&'a str>,
}

impl<'a> SlugContext<'a> {
    pub fn new(root: &'a Path) -> Self {
        Self {
            root,
            original_filename: None,
        }
    }

    pub fn with_original_filename(mut self, name: Option<&'a str>) -> Self {
        self.original_filename = name;
        self
    }

    /// Name of the folder holding the header file, or `None` when the file
    /// sits directly in the scan root.
    pub fn folder_slug(&self, candidate: &Candidate) -> Option<String> {
        let relative = candidate
            .file_path
            .strip_prefix(self.root)
            .unwrap_or(&candidate.file_path);
        let parent = relative.parent()?;
        parent
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
    }

    /// Lower-cased upload name without its `.zip` suffix.
    pub fn filename_slug(&self) -> Option<String> {
        let name = self.original_filename?;
        let base = Path::new(name).file_name()?.to_string_lossy().to_lowercase();
        let slug = base.strip_suffix(".zip").unwrap_or(&base).trim().to_string();
        (!slug.is_empty()).then_some(slug)
    }
}

/// Score a scan outcome.
pub fn score(outcome: &ScanOutcome, slugs: &SlugContext<'_>) -> AnalysisResult {
    let nested: Vec<PathBuf> = outcome
        .nested_archive_paths
        .iter()
        .map(|p| relative_to(p, slugs.root))
        .collect();

    let mut result = match outcome.candidates.as_slice() {
        [] if outcome.has_nested_archive() => AnalysisResult::bundle(SCORE_NESTED_ARCHIVE, REASON_BUNDLE),
        [] => AnalysisResult::verdict(SCORE_JUNK, REASON_JUNK),
        [single] => {
            let mut result = score_candidate(single, slugs);
            if outcome.has_nested_archive() {
                result.set_score(SCORE_NESTED_ARCHIVE, REASON_NESTED);
            }
            result
        }
        many => {
            let winner = pick_winner(many);
            let names: Vec<String> = many.iter().map(|c| format!("\"{}\"", c.header.name)).collect();
            let mut result = score_candidate(winner, slugs);
            result.set_score(
                SCORE_AMBIGUOUS,
                format!(
                    "ambiguous: {} installable items found ({})",
                    many.len(),
                    names.join(", ")
                ),
            );
            result
        }
    };

    result.candidate_names = outcome
        .candidates
        .iter()
        .map(|c| c.header.name.clone())
        .collect();
    result.nested_archives = nested;
    result
}

/// Shallowest candidate; the first one seen among equals.
pub fn pick_winner(candidates: &[Candidate]) -> &Candidate {
    candidates
        .iter()
        .enumerate()
        .min_by_key(|(index, c)| (c.depth, *index))
        .map(|(_, c)| c)
        .unwrap_or(&candidates[0])
}

/// Single-candidate scoring, before any nested-archive or ambiguity override.
pub fn score_candidate(candidate: &Candidate, slugs: &SlugContext<'_>) -> AnalysisResult {
    let header = &candidate.header;
    let text_domain = header.text_domain.as_deref();

    let mut result = match slugs.folder_slug(candidate) {
        None => {
            let mut result = AnalysisResult::verdict(SCORE_NO_ROOT_FOLDER, REASON_NO_ROOT_FOLDER);
            result.slug = Some(
                text_domain
                    .map(str::to_string)
                    .or_else(|| slugs.filename_slug())
                    .unwrap_or_else(|| UNKNOWN_SLUG.to_string()),
            );
            result
        }
        Some(folder) => {
            let (score, reason) = match text_domain {
                Some(domain) if domain == folder => (SCORE_PERFECT, REASON_PERFECT),
                None => (SCORE_MISSING_TEXT_DOMAIN, REASON_MISSING_TEXT_DOMAIN),
                Some(_) => (SCORE_TEXT_DOMAIN_MISMATCH, REASON_MISMATCH),
            };
            let mut result = AnalysisResult::verdict(score, reason);
            result.slug = Some(folder);
            result
        }
    };

    if candidate.depth > 1 {
        let capped = result.score.min(SCORE_TOO_DEEP_CAP);
        let reason = format!("{}; {}", result.reason, REASON_TOO_DEEP);
        result.set_score(capped, reason);
    }

    result.apply_header(candidate.kind, header);
    result.resolved_path = candidate.file_path.parent().map(Path::to_path_buf);
    result.found_in_file = Some(relative_to(&candidate.file_path, slugs.root));
    result
}

fn relative_to(path: &Path, root: &Path) -> PathBuf {
    path.strip_prefix(root).unwrap_or(path).to_path_buf()
}

#[cfg(test)]
mod tests {
    use super::*;
    use wpstage_core::{HeaderInfo, PackageKind};

    const ROOT: &str = "/scan";

    fn candidate(relative: &str, text_domain: Option<&str>) -> Candidate {
        let depth = relative.matches('/').count();
        Candidate {
            file_path: Path::new(ROOT).join(relative),
            kind: PackageKind::Plugin,
            header: HeaderInfo {
                name: format!("Plugin {relative}"),
                version: Some("1.0.0".to_string()),
                text_domain: text_domain.map(str::to_string),
                ..Default::default()
            },
            depth,
        }
    }

    fn outcome(candidates: Vec<Candidate>, zips: &[&str]) -> ScanOutcome {
        ScanOutcome {
            candidates,
            nested_archive_paths: zips.iter().map(|z| Path::new(ROOT).join(z)).collect(),
        }
    }

    fn run(outcome: &ScanOutcome) -> AnalysisResult {
        score(outcome, &SlugContext::new(Path::new(ROOT)))
    }

    #[test]
    fn test_empty_outcome_is_junk() {
        let result = run(&outcome(vec![], &[]));
        assert_eq!(result.score, 0);
        assert!(!result.is_valid);
        assert_eq!(result.reason, REASON_JUNK);
        assert!(result.resolved_path.is_none());
    }

    #[test]
    fn test_bundle_without_headers() {
        let result = run(&outcome(vec![], &["pack/inner.zip"]));
        assert_eq!(result.score, 4);
        assert!(result.is_valid);
        assert!(result.resolved_path.is_none());
        assert_eq!(result.nested_archives, vec![PathBuf::from("pack/inner.zip")]);
    }

    #[test]
    fn test_perfect_structure() {
        let result = run(&outcome(vec![candidate("akismet/akismet.php", Some("akismet"))], &[]));
        assert_eq!(result.score, 10);
        assert!(result.is_valid);
        assert_eq!(result.slug.as_deref(), Some("akismet"));
        assert_eq!(result.resolved_path, Some(PathBuf::from("/scan/akismet")));
        assert_eq!(result.found_in_file, Some(PathBuf::from("akismet/akismet.php")));
        assert_eq!(result.kind, Some(PackageKind::Plugin));
    }

    #[test]
    fn test_text_domain_comparison_is_case_sensitive() {
        let result = run(&outcome(vec![candidate("akismet/akismet.php", Some("Akismet"))], &[]));
        assert_eq!(result.score, 7);
        assert_eq!(result.reason, REASON_MISMATCH);
        assert!(result.is_valid);
    }

    #[test]
    fn test_missing_text_domain() {
        let result = run(&outcome(vec![candidate("akismet/akismet.php", None)], &[]));
        assert_eq!(result.score, 9);
        assert_eq!(result.reason, REASON_MISSING_TEXT_DOMAIN);
    }

    #[test]
    fn test_root_level_header_falls_back_to_text_domain() {
        let result = run(&outcome(vec![candidate("hello.php", Some("hello-dolly"))], &[]));
        assert_eq!(result.score, 2);
        assert!(!result.is_valid);
        assert_eq!(result.slug.as_deref(), Some("hello-dolly"));
        assert_eq!(result.resolved_path, Some(PathBuf::from(ROOT)));
    }

    #[test]
    fn test_root_level_header_falls_back_to_filename() {
        let scan = outcome(vec![candidate("hello.php", None)], &[]);
        let slugs = SlugContext::new(Path::new(ROOT)).with_original_filename(Some("Hello-Dolly.ZIP"));
        assert_eq!(score(&scan, &slugs).slug.as_deref(), Some("hello-dolly"));

        assert_eq!(run(&scan).slug.as_deref(), Some(UNKNOWN_SLUG));
    }

    #[test]
    fn test_nested_archive_forces_score_four() {
        let result = run(&outcome(
            vec![candidate("akismet/akismet.php", Some("akismet"))],
            &["akismet/vendor/lib.zip"],
        ));
        assert_eq!(result.score, 4);
        assert!(!result.is_valid);
        assert_eq!(result.reason, REASON_NESTED);
        assert_eq!(result.slug.as_deref(), Some("akismet"));
    }

    #[test]
    fn test_ambiguous_picks_shallowest_then_first_seen() {
        let result = run(&outcome(
            vec![
                candidate("a/b/deep.php", Some("b")),
                candidate("one/one.php", Some("one")),
                candidate("two/two.php", Some("two")),
            ],
            &[],
        ));
        assert_eq!(result.score, 3);
        assert!(!result.is_valid);
        assert_eq!(result.slug.as_deref(), Some("one"));
        assert!(result.reason.starts_with("ambiguous: 3 installable items found"));
        assert_eq!(result.candidate_names.len(), 3);
    }

    #[test]
    fn test_deep_candidate_is_capped() {
        let result = run(&outcome(vec![candidate("wrap/inner/inner.php", Some("inner"))], &[]));
        assert_eq!(result.score, 5);
        assert!(!result.is_valid);
        assert_eq!(result.slug.as_deref(), Some("inner"));
        assert_eq!(result.reason, format!("{REASON_PERFECT}; {REASON_TOO_DEEP}"));
    }

    #[test]
    fn test_filename_slug_strips_directories() {
        let slugs = SlugContext::new(Path::new(ROOT)).with_original_filename(Some("uploads/My-Theme.zip"));
        assert_eq!(slugs.filename_slug().as_deref(), Some("my-theme"));

        let empty = SlugContext::new(Path::new(ROOT)).with_original_filename(Some(".zip"));
        assert_eq!(empty.filename_slug(), None);
    }
}
