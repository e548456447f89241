//! Walks over realistic extracted-archive layouts.

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use wpstage_fs::{IgnoreRules, TreeWalker};

fn touch(root: &Path, relative: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, "<?php").unwrap();
}

#[test]
fn test_scanner_walk_over_mac_archive() {
    let temp = TempDir::new().unwrap();
    touch(temp.path(), "contact-form/contact-form.php");
    touch(temp.path(), "contact-form/includes/admin.php");
    touch(temp.path(), "__MACOSX/contact-form/._contact-form.php");
    touch(temp.path(), "contact-form/.git/objects/pack.zip");
    touch(temp.path(), "contact-form/node_modules/dep/index.php");

    let files: Vec<PathBuf> = TreeWalker::new(temp.path(), IgnoreRules::scanner())
        .files()
        .into_iter()
        .map(|e| e.relative)
        .collect();

    assert_eq!(
        files,
        vec![
            PathBuf::from("contact-form/contact-form.php"),
            PathBuf::from("contact-form/includes/admin.php"),
        ]
    );
}

#[test]
fn test_glob_rules_combine_with_defaults() {
    let temp = TempDir::new().unwrap();
    touch(temp.path(), "theme/style.css");
    touch(temp.path(), "theme/assets/app.js.map");

    let rules = IgnoreRules::upload().with_patterns(&["**/*.map"]).unwrap();
    let files = TreeWalker::new(temp.path(), rules).files();

    assert_eq!(files.len(), 1);
    assert_eq!(files[0].file_name(), "style.css");
    assert_eq!(files[0].size, 5);
}

#[test]
fn test_closure_predicate_walk() {
    let temp = TempDir::new().unwrap();
    touch(temp.path(), "keep/a.php");
    touch(temp.path(), "skip/b.php");

    let predicate = |relative: &Path, _: &str, is_dir: bool| is_dir && relative.starts_with("skip");
    let files = TreeWalker::new(temp.path(), predicate).files();

    assert_eq!(files.len(), 1);
    assert_eq!(files[0].relative, PathBuf::from("keep/a.php"));
}
