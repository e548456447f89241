//! `tree.json`: a browsable description of a release's source.

use crate::error::Result;
use std::iter::Peekable;
use std::path::Path;
use std::vec::IntoIter;
use tempfile::NamedTempFile;
use wpstage_core::TreeNode;
use wpstage_fs::{IgnoreRules, TreeWalker, WalkEntry};

/// Describe the tree below `root`.
///
/// Children are sorted by name. Junk entries are skipped, and folders with
/// no remaining files below them are omitted entirely.
pub fn describe(root: &Path) -> Vec<TreeNode> {
    let entries = TreeWalker::new(root, IgnoreRules::tree()).walk();
    let mut iter = entries.into_iter().peekable();
    collect_level(&mut iter, Path::new(""))
}

// Walk entries arrive depth-first, so a directory's descendants directly
// follow it.
fn collect_level(iter: &mut Peekable<IntoIter<WalkEntry>>, parent: &Path) -> Vec<TreeNode> {
    let mut nodes = Vec::new();

    while let Some(entry) = iter.next_if(|e| e.relative.parent() == Some(parent)) {
        let name = entry.file_name().to_string();
        let path = entry.relative_slash();

        if entry.is_dir {
            let children = collect_level(iter, &entry.relative);
            if !children.is_empty() {
                nodes.push(TreeNode::Folder {
                    name,
                    path,
                    children,
                });
            }
        } else {
            nodes.push(TreeNode::File {
                name,
                path,
                size: entry.size,
            });
        }
    }

    nodes
}

/// Write `nodes` as pretty JSON to `dest`, replacing any previous file.
pub fn write_tree(nodes: &[TreeNode], dest: &Path) -> Result<()> {
    let parent = dest.parent().unwrap_or_else(|| Path::new("."));
    let temp = NamedTempFile::new_in(parent)?;
    serde_json::to_writer_pretty(temp.as_file(), nodes)?;
    temp.persist(dest)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_nested_description() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("inc/admin")).unwrap();
        fs::write(temp.path().join("plugin.php"), "12345").unwrap();
        fs::write(temp.path().join("inc/admin/page.php"), "x").unwrap();

        let tree = describe(temp.path());
        assert_eq!(
            tree,
            vec![
                TreeNode::Folder {
                    name: "inc".to_string(),
                    path: "inc".to_string(),
                    children: vec![TreeNode::Folder {
                        name: "admin".to_string(),
                        path: "inc/admin".to_string(),
                        children: vec![TreeNode::File {
                            name: "page.php".to_string(),
                            path: "inc/admin/page.php".to_string(),
                            size: 1,
                        }],
                    }],
                },
                TreeNode::File {
                    name: "plugin.php".to_string(),
                    path: "plugin.php".to_string(),
                    size: 5,
                },
            ]
        );
    }

    #[test]
    fn test_empty_and_junk_folders_are_omitted() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("empty/inner")).unwrap();
        fs::create_dir_all(temp.path().join("node_modules/lodash")).unwrap();
        fs::write(temp.path().join("node_modules/lodash/index.js"), "x").unwrap();
        fs::write(temp.path().join("style.css"), "/* */").unwrap();

        let tree = describe(temp.path());
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].name(), "style.css");
    }

    #[test]
    fn test_write_tree_replaces_file() {
        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("tree.json");
        fs::write(&dest, "stale").unwrap();

        let nodes = vec![TreeNode::File {
            name: "a.php".to_string(),
            path: "a.php".to_string(),
            size: 3,
        }];
        write_tree(&nodes, &dest).unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&dest).unwrap()).unwrap();
        assert_eq!(json[0]["type"], "file");
        assert_eq!(json[0]["size"], 3);
    }
}
