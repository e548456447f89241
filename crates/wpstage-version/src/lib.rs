//! wpstage Version - decides whether a detected package version is newer.
//!
//! WordPress headers rarely carry full semantic versions: `2.28`, `v3`,
//! `1.0-beta` are all common. Versions are normalized to three numeric
//! segments before comparison:
//!
//! ```
//! use wpstage_version::{is_newer, normalize};
//!
//! assert_eq!(normalize("v2.28"), "2.28.0");
//! assert!(!is_newer("2.28.0", Some("2.28")));
//! assert!(is_newer("2.29", Some("2.28.0")));
//! assert!(is_newer("1.0", None));
//! ```
//!
//! Anything that still fails to parse is treated as *not newer*, so a bad
//! header can never silently overwrite an existing release.

pub mod error;

pub use error::{Error, Result};

use semver::Version;
use std::cmp::Ordering;
use tracing::debug;

/// Normalize a loosely written version into `MAJOR.MINOR.PATCH[-pre][+build]`.
///
/// Leading `v`/`V` and surrounding whitespace are dropped; missing numeric
/// segments are filled with `0`. The result is not guaranteed to be valid
/// semver (`1.2.3.4` stays as it is).
pub fn normalize(raw: &str) -> String {
    let trimmed = raw.trim();
    let trimmed = trimmed
        .strip_prefix('v')
        .or_else(|| trimmed.strip_prefix('V'))
        .unwrap_or(trimmed)
        .trim();

    let split_at = trimmed.find(['-', '+']).unwrap_or(trimmed.len());
    let (core, suffix) = trimmed.split_at(split_at);

    let mut segments: Vec<&str> = core.split('.').collect();
    while segments.len() < 3 {
        segments.push("0");
    }

    format!("{}{}", segments.join("."), suffix)
}

/// Parse a loosely written version.
pub fn parse(raw: &str) -> Result<Version> {
    let normalized = normalize(raw);
    Version::parse(&normalized).map_err(|e| Error::InvalidVersion(raw.to_string(), e.to_string()))
}

/// Compare two versions after normalization.
pub fn compare(a: &str, b: &str) -> Result<Ordering> {
    Ok(parse(a)?.cmp(&parse(b)?))
}

/// Whether `local` is strictly newer than `remote`.
///
/// An absent remote counts as newer; equal versions do not. Unparsable
/// input on either side yields `false`.
pub fn is_newer(local: &str, remote: Option<&str>) -> bool {
    let Some(remote) = remote else {
        return true;
    };

    match compare(local, remote) {
        Ok(ordering) => ordering == Ordering::Greater,
        Err(err) => {
            debug!(local, remote, error = %err, "version comparison failed; treating as not newer");
            false
        }
    }
}

/// Whether `candidate` is at least as new as every version in `known`.
///
/// Re-building the current latest version is allowed, so equal versions
/// pass. Any unparsable version, candidate or known, yields `false`.
pub fn is_latest_among<S: AsRef<str>>(candidate: &str, known: &[S]) -> bool {
    let candidate = match parse(candidate) {
        Ok(version) => version,
        Err(err) => {
            debug!(error = %err, "candidate version unparsable");
            return false;
        }
    };

    for other in known {
        match parse(other.as_ref()) {
            Ok(version) if version > candidate => return false,
            Ok(_) => {}
            Err(err) => {
                debug!(error = %err, "known version unparsable");
                return false;
            }
        }
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_pads_and_strips_prefix() {
        assert_eq!(normalize("2.28"), "2.28.0");
        assert_eq!(normalize("3"), "3.0.0");
        assert_eq!(normalize(" v1.2.3 "), "1.2.3");
        assert_eq!(normalize("V4.1"), "4.1.0");
        assert_eq!(normalize("1.0-beta.2"), "1.0.0-beta.2");
        assert_eq!(normalize("2.1+build5"), "2.1.0+build5");
    }

    #[test]
    fn test_compare_after_normalization() {
        assert_eq!(compare("2.28.0", "2.28").unwrap(), Ordering::Equal);
        assert_eq!(compare("2.3", "2.28").unwrap(), Ordering::Less);
        assert_eq!(compare("1.0.0-beta", "1.0").unwrap(), Ordering::Less);
    }

    #[test]
    fn test_compare_reports_bad_input() {
        let err = compare("banana", "1.0").unwrap_err();
        assert!(matches!(err, Error::InvalidVersion(raw, _) if raw == "banana"));
        assert!(parse("1.2.3.4").is_err());
        assert!(parse("").is_err());
    }

    #[test]
    fn test_is_newer() {
        assert!(!is_newer("2.28.0", Some("2.28")));
        assert!(is_newer("2.29", Some("2.28.0")));
        assert!(is_newer("1.0", None));
        assert!(!is_newer("not-a-version", Some("1.0.0")));
        assert!(!is_newer("1.0.0", Some("garbage")));
        assert!(!is_newer("1.0", Some("1.1")));
    }

    #[test]
    fn test_is_latest_among() {
        assert!(is_latest_among("2.0", &["1.9", "1.10.3"]));
        assert!(is_latest_among("2.0", &["2.0.0"]));
        assert!(!is_latest_among("2.0", &["2.0.1"]));
        assert!(is_latest_among::<&str>("1.0", &[]));
        assert!(!is_latest_among("2.0", &["1.0", "junk"]));
        assert!(!is_latest_among("junk", &["1.0"]));
    }
}

#[cfg(test)]
#[cfg(feature = "property-tests")]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn comparison_is_reflexive(version in r"(0|[1-9][0-9]{0,3})(\.(0|[1-9][0-9]{0,3})){0,2}") {
            prop_assert_eq!(compare(&version, &version).unwrap(), Ordering::Equal);
            prop_assert!(!is_newer(&version, Some(&version)));
        }

        #[test]
        fn comparison_is_antisymmetric(
            a in r"(0|[1-9][0-9]{0,3})(\.(0|[1-9][0-9]{0,3})){0,2}",
            b in r"(0|[1-9][0-9]{0,3})(\.(0|[1-9][0-9]{0,3})){0,2}"
        ) {
            let ab = compare(&a, &b).unwrap();
            let ba = compare(&b, &a).unwrap();
            prop_assert_eq!(ab, ba.reverse());
            prop_assert!(!(is_newer(&a, Some(&b)) && is_newer(&b, Some(&a))));
        }

        #[test]
        fn padding_does_not_change_order(major in 0u64..1000, minor in 0u64..1000) {
            let short = format!("{major}.{minor}");
            let long = format!("{major}.{minor}.0");
            prop_assert_eq!(compare(&short, &long).unwrap(), Ordering::Equal);
        }
    }
}
