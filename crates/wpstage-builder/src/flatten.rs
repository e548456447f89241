//! Input flattening: avoid `slug/slug/...` double nesting.

use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;
use wpstage_fs::visible_children;

/// Directory whose contents should sit directly under `<slug>/` in the
/// archive.
///
/// When the only visible child of `source_dir` is a directory named
/// exactly `slug`, that directory is used instead; otherwise `source_dir`
/// itself. Only one level is ever descended.
pub fn effective_source(source_dir: &Path, slug: &str) -> io::Result<PathBuf> {
    let children = visible_children(source_dir)?;

    if let [only] = children.as_slice() {
        let named_after_slug = only.file_name().is_some_and(|name| name == slug);
        if named_after_slug && only.is_dir() {
            debug!(from = %source_dir.display(), to = %only.display(), "flattening nested source folder");
            return Ok(only.clone());
        }
    }

    Ok(source_dir.to_path_buf())
}
