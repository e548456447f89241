//! Shared directory walking for wpstage.
//!
//! Every part of wpstage that enumerates a directory tree (the archive
//! scanner, the tree description generator, the source uploader) goes
//! through [`TreeWalker`], parameterized by an [`IgnorePredicate`] and an
//! optional depth limit.
//!
//! # Example
//!
//! ```no_run
//! use wpstage_fs::{IgnoreRules, TreeWalker};
//!
//! let entries = TreeWalker::new("/tmp/extracted", IgnoreRules::scanner())
//!     .max_depth(Some(1))
//!     .walk();
//! for entry in entries.iter().filter(|e| !e.is_dir) {
//!     println!("{} (depth {})", entry.relative.display(), entry.depth);
//! }
//! ```

mod error;
mod ignore;
mod read;
mod walker;

pub use error::{Error, Result};
pub use ignore::{is_hidden_or_metadata, is_junk_name, IgnorePredicate, IgnoreRules, JUNK_NAMES};
pub use read::{read_prefix, visible_children};
pub use walker::{to_slash, TreeWalker, WalkEntry};
