use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Longest slug, version or type accepted as a path segment.
pub const MAX_SEGMENT_LEN: usize = 100;

/// Security-related errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SecurityError {
    #[error("Path does not exist: {0}")]
    PathDoesNotExist(PathBuf),

    #[error("Path is not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("Path is not readable: {0}")]
    NotReadable(PathBuf),

    #[error("{field} is empty")]
    EmptySegment { field: &'static str },

    #[error("{field} too long: {len} characters (max 100)")]
    SegmentTooLong { field: &'static str, len: usize },

    #[error("{field} '{value}' cannot be used as a path segment")]
    UnsafeSegment { field: &'static str, value: String },
}

/// Validate and canonicalize a source directory.
///
/// The path must exist, be a directory and be listable.
pub fn validate_source_dir(path: &Path) -> Result<PathBuf, SecurityError> {
    let canonical = path
        .canonicalize()
        .map_err(|_| SecurityError::PathDoesNotExist(path.to_path_buf()))?;

    if !canonical.is_dir() {
        return Err(SecurityError::NotADirectory(canonical));
    }

    if fs::read_dir(&canonical).is_err() {
        return Err(SecurityError::NotReadable(canonical));
    }

    Ok(canonical)
}

/// Validate a value that will be joined into a staging path or remote key.
///
/// Slugs, versions and types come from archive headers and human review,
/// so they must not be able to climb out of the staging root:
/// - 1-100 characters
/// - no `/`, `\`, or control characters
/// - not `.` or `..`
pub fn validate_path_segment(field: &'static str, value: &str) -> Result<(), SecurityError> {
    if value.trim().is_empty() {
        return Err(SecurityError::EmptySegment { field });
    }

    if value.len() > MAX_SEGMENT_LEN {
        return Err(SecurityError::SegmentTooLong {
            field,
            len: value.len(),
        });
    }

    let unsafe_char = value
        .chars()
        .any(|c| c == '/' || c == '\\' || c.is_control());
    if unsafe_char || value == "." || value == ".." {
        return Err(SecurityError::UnsafeSegment {
            field,
            value: value.to_string(),
        });
    }

    Ok(())
}

/// Set restrictive permissions on config file (Unix only)
#[cfg(unix)]
pub fn set_config_permissions(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    let mut perms = fs::metadata(path)?.permissions();
    perms.set_mode(0o600);
    fs::set_permissions(path, perms)?;
    Ok(())
}

#[cfg(not(unix))]
pub fn set_config_permissions(_path: &Path) -> std::io::Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_validate_existing_directory() {
        let temp_dir = TempDir::new().unwrap();
        assert!(validate_source_dir(temp_dir.path()).is_ok());
    }

    #[test]
    fn test_validate_nonexistent_path() {
        let result = validate_source_dir(Path::new("/nonexistent/wpstage/12345"));
        assert!(matches!(result, Err(SecurityError::PathDoesNotExist(_))));
    }

    #[test]
    fn test_validate_file_not_directory() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("plugin.php");
        fs::write(&file_path, "<?php").unwrap();

        let result = validate_source_dir(&file_path);
        assert!(matches!(result, Err(SecurityError::NotADirectory(_))));
    }

    #[test]
    fn test_valid_segments() {
        assert!(validate_path_segment("slug", "woocommerce").is_ok());
        assert!(validate_path_segment("slug", "contact-form-7").is_ok());
        assert!(validate_path_segment("version", "1.0.0-beta+2").is_ok());
        assert!(validate_path_segment("slug", "unknown-slug").is_ok());
    }

    #[test]
    fn test_invalid_segments() {
        assert_eq!(
            validate_path_segment("slug", ""),
            Err(SecurityError::EmptySegment { field: "slug" })
        );
        assert!(matches!(
            validate_path_segment("slug", ".."),
            Err(SecurityError::UnsafeSegment { .. })
        ));
        assert!(matches!(
            validate_path_segment("slug", "../etc"),
            Err(SecurityError::UnsafeSegment { .. })
        ));
        assert!(matches!(
            validate_path_segment("version", "1.0\\..\\x"),
            Err(SecurityError::UnsafeSegment { .. })
        ));
        assert!(matches!(
            validate_path_segment("slug", "bad\nname"),
            Err(SecurityError::UnsafeSegment { .. })
        ));
        assert!(matches!(
            validate_path_segment("slug", &"a".repeat(101)),
            Err(SecurityError::SegmentTooLong { len: 101, .. })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_config_permissions() {
        use std::os::unix::fs::PermissionsExt;
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "version = \"1.0\"").unwrap();

        set_config_permissions(&path).unwrap();
        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
