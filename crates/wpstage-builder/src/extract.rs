//! Zip extraction for uploads and source trees.

use crate::error::{Error, Result};
use std::fs::{self, File};
use std::io;
use std::path::Path;
use tracing::debug;
use zip::ZipArchive;

/// Extract every entry of `archive` below `dest`, creating it if needed.
///
/// Entry names that are absolute or climb out with `..` abort the
/// extraction. Returns the number of files written.
pub fn extract_archive(archive: &Path, dest: &Path) -> Result<usize> {
    let mut zip = ZipArchive::new(File::open(archive)?)?;
    fs::create_dir_all(dest)?;

    let mut files = 0;
    for index in 0..zip.len() {
        let mut entry = zip.by_index(index)?;
        let relative = entry
            .enclosed_name()
            .ok_or_else(|| Error::UnsafeEntry(entry.name().to_string()))?;
        let target = dest.join(relative);

        if entry.is_dir() {
            fs::create_dir_all(&target)?;
            continue;
        }

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut out = File::create(&target)?;
        io::copy(&mut entry, &mut out)?;
        files += 1;
    }

    debug!(archive = %archive.display(), dest = %dest.display(), files, "archive extracted");
    Ok(files)
}

/// Replace `dest` with a fresh extraction of `archive`.
///
/// The archive is extracted into a scratch directory beside `dest`, which
/// only replaces `dest` once every entry is written. On failure the
/// previous contents of `dest` are untouched and the scratch directory is
/// removed.
pub fn extract_clean(archive: &Path, dest: &Path) -> Result<usize> {
    let parent = match dest.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)?;

    let scratch = tempfile::Builder::new()
        .prefix(".extract-")
        .tempdir_in(parent)?;
    let files = extract_archive(archive, scratch.path())?;

    if dest.exists() {
        fs::remove_dir_all(dest)?;
    }
    fs::rename(scratch.path(), dest)?;
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    fn make_zip(path: &Path, entries: &[(&str, &str)]) {
        let mut writer = ZipWriter::new(File::create(path).unwrap());
        for (name, body) in entries {
            writer.start_file(*name, SimpleFileOptions::default()).unwrap();
            writer.write_all(body.as_bytes()).unwrap();
        }
        writer.finish().unwrap();
    }

    #[test]
    fn test_extracts_nested_files() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("upload.zip");
        make_zip(&archive, &[("seo/seo.php", "<?php"), ("seo/inc/a.php", "a")]);

        let dest = temp.path().join("out");
        assert_eq!(extract_archive(&archive, &dest).unwrap(), 2);
        assert_eq!(fs::read_to_string(dest.join("seo/inc/a.php")).unwrap(), "a");
    }

    #[test]
    fn test_rejects_traversal() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("evil.zip");
        make_zip(&archive, &[("../escape.php", "<?php")]);

        let err = extract_archive(&archive, &temp.path().join("out")).unwrap_err();
        assert!(matches!(err, Error::UnsafeEntry(name) if name == "../escape.php"));
        assert!(!temp.path().join("escape.php").exists());
    }

    #[test]
    fn test_clean_extraction_drops_stale_files() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("upload.zip");
        make_zip(&archive, &[("seo/seo.php", "<?php")]);

        let dest = temp.path().join("source");
        fs::create_dir_all(dest.join("old")).unwrap();
        fs::write(dest.join("old/stale.php"), "stale").unwrap();

        extract_clean(&archive, &dest).unwrap();
        assert!(!dest.join("old").exists());
        assert!(dest.join("seo/seo.php").exists());
    }

    #[test]
    fn test_failed_extraction_keeps_previous_tree() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("conflict.zip");
        // A file entry followed by an entry that needs it to be a directory.
        make_zip(&archive, &[("akismet/a", "file"), ("akismet/a/b.php", "<?php")]);

        let dest = temp.path().join("source");
        fs::create_dir_all(dest.join("akismet")).unwrap();
        fs::write(dest.join("akismet/akismet.php"), "previous").unwrap();

        assert!(extract_clean(&archive, &dest).is_err());
        assert_eq!(
            fs::read_to_string(dest.join("akismet/akismet.php")).unwrap(),
            "previous"
        );
        assert!(!dest.join("akismet/a").exists());

        let mut left: Vec<String> = fs::read_dir(temp.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        left.sort();
        assert_eq!(left, vec!["conflict.zip", "source"]);
    }

    #[test]
    fn test_not_a_zip() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("broken.zip");
        fs::write(&archive, "definitely not a zip").unwrap();

        assert!(matches!(
            extract_archive(&archive, &temp.path().join("out")),
            Err(Error::Zip(_))
        ));
    }
}
