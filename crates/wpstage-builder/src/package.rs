//! Deterministic zip packaging.

use crate::error::{Error, Result};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{self, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;
use wpstage_fs::{IgnoreRules, TreeWalker};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

/// What [`write_archive`] produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveSummary {
    pub path: PathBuf,
    /// Lowercase hex SHA-256 of the finished archive
    pub sha256: String,
    pub file_count: usize,
}

fn file_options() -> SimpleFileOptions {
    SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(DateTime::default())
        .unix_permissions(0o644)
}

fn dir_options() -> SimpleFileOptions {
    file_options().unix_permissions(0o755)
}

/// Zip the contents of `source` under a single `<root_name>/` folder and
/// write the archive to `dest`.
///
/// Entries are added in walk order (sorted by name at every level) with a
/// fixed timestamp, so the same input always yields the same bytes. Junk
/// entries (`.git`, `node_modules`, `__MACOSX`, `.DS_Store`) are left out.
/// The archive is assembled in a temporary file next to `dest` and only
/// renamed into place once complete.
pub fn write_archive(source: &Path, root_name: &str, dest: &Path) -> Result<ArchiveSummary> {
    if !source.is_dir() {
        return Err(Error::SourceMissing(source.to_path_buf()));
    }

    let parent = dest.parent().unwrap_or_else(|| Path::new("."));
    let mut temp = NamedTempFile::new_in(parent)?;
    let mut file_count = 0;

    {
        let mut writer = ZipWriter::new(temp.as_file_mut());
        writer.add_directory(format!("{root_name}/"), dir_options())?;

        for entry in TreeWalker::new(source, IgnoreRules::tree()).walk() {
            let name = format!("{root_name}/{}", entry.relative_slash());
            if entry.is_dir {
                writer.add_directory(format!("{name}/"), dir_options())?;
                continue;
            }

            writer.start_file(name, file_options())?;
            let mut input = File::open(&entry.path)?;
            io::copy(&mut input, &mut writer)?;
            file_count += 1;
        }

        writer.finish()?;
    }

    let sha256 = hash_file(temp.as_file_mut())?;
    temp.persist(dest)?;
    debug!(path = %dest.display(), files = file_count, sha256 = %sha256, "archive written");

    Ok(ArchiveSummary {
        path: dest.to_path_buf(),
        sha256,
        file_count,
    })
}

fn hash_file(file: &mut File) -> io::Result<String> {
    file.seek(SeekFrom::Start(0))?;
    let mut hasher = Sha256::new();
    io::copy(file, &mut hasher)?;
    Ok(hex::encode(hasher.finalize()))
}

/// SHA-256 of a file on disk, lowercase hex.
pub fn sha256_of(path: &Path) -> Result<String> {
    let mut file = File::open(path)?;
    Ok(hash_file(&mut file)?)
}
