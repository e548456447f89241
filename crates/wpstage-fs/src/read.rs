//! Small read helpers shared by the scanner and the builder.

use crate::ignore::is_hidden_or_metadata;
use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

/// Read at most `limit` bytes from the start of a file as text.
///
/// Invalid UTF-8 (including a multi-byte character cut at the limit) is
/// replaced rather than rejected.
pub fn read_prefix(path: &Path, limit: usize) -> io::Result<String> {
    let file = File::open(path)?;
    let mut buffer = Vec::with_capacity(limit.min(64 * 1024));
    file.take(limit as u64).read_to_end(&mut buffer)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

/// Children of `dir` whose names do not start with `.` or `__`, sorted by name.
pub fn visible_children(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut children = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name();
        if is_hidden_or_metadata(&name.to_string_lossy()) {
            continue;
        }
        children.push(entry.path());
    }
    children.sort();
    Ok(children)
}
