//! File tree capability
//!
//! The locator walks a [`SourceTree`] rather than the filesystem directly so
//! tests can run against an in-memory tree. Paths are '/'-separated and
//! relative to the tree root; the root itself is the empty string.

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use ignore::WalkBuilder;

/// One directory entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    pub name: String,
    pub is_dir: bool,
}

impl TreeEntry {
    pub fn file(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_dir: false,
        }
    }

    pub fn dir(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_dir: true,
        }
    }
}

/// Read access to a tree of source files
pub trait SourceTree: Send + Sync {
    /// List a directory. Entries are returned sorted by name.
    fn list(&self, dir: &str) -> io::Result<Vec<TreeEntry>>;

    /// Read a file's full content
    fn open(&self, path: &str) -> io::Result<String>;
}

/// Write access, used by result delivery. Delivery reads files back before
/// committing, so every writer is also a [`SourceTree`].
pub trait TreeWriter: SourceTree {
    fn write(&self, path: &str, content: &str) -> io::Result<()>;
}

/// Join a relative directory and an entry name
pub fn join_path(dir: &str, name: &str) -> String {
    if dir.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", dir, name)
    }
}

// =============================================================================
// Filesystem
// =============================================================================

/// Tree rooted at a directory on disk
#[derive(Debug, Clone)]
pub struct FsTree {
    root: PathBuf,
}

impl FsTree {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    fn resolve(&self, path: &str) -> PathBuf {
        path.split('/')
            .filter(|part| !part.is_empty())
            .fold(self.root.clone(), |acc, part| acc.join(part))
    }
}

impl SourceTree for FsTree {
    /// One level of the directory. Entries matched by `.gitignore` (inside a
    /// git work tree) are left out; hidden entries are kept so the locator can
    /// report skipping them.
    fn list(&self, dir: &str) -> io::Result<Vec<TreeEntry>> {
        let path = self.resolve(dir);
        if !path.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("no such directory: {}", path.display()),
            ));
        }

        let walker = WalkBuilder::new(&path)
            .max_depth(Some(1))
            .hidden(false)
            .git_ignore(true)
            .git_global(true)
            .git_exclude(true)
            .follow_links(false)
            .sort_by_file_name(|a, b| a.cmp(b))
            .build();

        let mut entries = Vec::new();
        for entry in walker {
            let entry = entry.map_err(io::Error::other)?;
            if entry.depth() == 0 {
                continue;
            }
            // Symlinks are not followed
            let Some(file_type) = entry.file_type() else {
                continue;
            };
            if file_type.is_symlink() {
                continue;
            }
            let Some(name) = entry.file_name().to_str().map(String::from) else {
                continue;
            };
            entries.push(TreeEntry {
                name,
                is_dir: file_type.is_dir(),
            });
        }
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    fn open(&self, path: &str) -> io::Result<String> {
        std::fs::read_to_string(self.resolve(path))
    }
}

impl TreeWriter for FsTree {
    fn write(&self, path: &str, content: &str) -> io::Result<()> {
        std::fs::write(self.resolve(path), content)
    }
}

// =============================================================================
// In-memory
// =============================================================================

/// Tree held entirely in memory; directories are implied by file paths
#[derive(Debug, Default)]
pub struct MemoryTree {
    files: RwLock<BTreeMap<String, String>>,
}

impl MemoryTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, path: &str, content: &str) -> Self {
        if let Ok(files) = self.files.get_mut() {
            files.insert(path.trim_matches('/').to_string(), content.to_string());
        }
        self
    }

    /// Current content of a file, if present
    pub fn content(&self, path: &str) -> Option<String> {
        self.files.read().ok()?.get(path).cloned()
    }

    fn poisoned() -> io::Error {
        io::Error::other("memory tree lock poisoned")
    }
}

impl SourceTree for MemoryTree {
    fn list(&self, dir: &str) -> io::Result<Vec<TreeEntry>> {
        let files = self.files.read().map_err(|_| Self::poisoned())?;
        let prefix = if dir.is_empty() {
            String::new()
        } else {
            format!("{}/", dir.trim_matches('/'))
        };

        let mut entries: BTreeMap<String, bool> = BTreeMap::new();
        for path in files.keys() {
            let Some(rest) = path.strip_prefix(&prefix) else {
                continue;
            };
            match rest.split_once('/') {
                Some((sub, _)) => {
                    entries.insert(sub.to_string(), true);
                }
                None => {
                    entries.entry(rest.to_string()).or_insert(false);
                }
            }
        }

        if entries.is_empty() && !dir.is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("no such directory: {}", dir),
            ));
        }

        Ok(entries
            .into_iter()
            .map(|(name, is_dir)| TreeEntry { name, is_dir })
            .collect())
    }

    fn open(&self, path: &str) -> io::Result<String> {
        let files = self.files.read().map_err(|_| Self::poisoned())?;
        files.get(path).cloned().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("no such file: {}", path))
        })
    }
}

impl TreeWriter for MemoryTree {
    fn write(&self, path: &str, content: &str) -> io::Result<()> {
        let mut files = self.files.write().map_err(|_| Self::poisoned())?;
        files.insert(path.to_string(), content.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::vcs::test_repo::{git_available, init};
    use tempfile::TempDir;

    #[test]
    fn test_memory_tree_lists_implied_dirs() {
        let tree = MemoryTree::new()
            .with_file("b.go", "package b")
            .with_file("pkg/a.go", "package pkg")
            .with_file("pkg/sub/c.go", "package sub");

        let root = tree.list("").unwrap();
        assert_eq!(root, vec![TreeEntry::file("b.go"), TreeEntry::dir("pkg")]);

        let pkg = tree.list("pkg").unwrap();
        assert_eq!(pkg, vec![TreeEntry::file("a.go"), TreeEntry::dir("sub")]);
    }

    #[test]
    fn test_memory_tree_write_then_open() {
        let tree = MemoryTree::new().with_file("a.go", "old");
        tree.write("a.go", "new").unwrap();
        assert_eq!(tree.open("a.go").unwrap(), "new");
        assert!(tree.open("missing.go").is_err());
    }

    #[test]
    fn test_fs_tree_list_sorted() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("z.go"), "package z").unwrap();
        std::fs::write(dir.path().join("a.go"), "package a").unwrap();
        std::fs::create_dir(dir.path().join("m")).unwrap();

        let tree = FsTree::new(dir.path());
        let names: Vec<_> = tree
            .list("")
            .unwrap()
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(names, vec!["a.go", "m", "z.go"]);
    }

    #[test]
    fn test_fs_tree_keeps_hidden_and_skips_symlinks() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join(".cache")).unwrap();
        std::fs::write(dir.path().join("a.go"), "package a").unwrap();
        #[cfg(unix)]
        std::os::unix::fs::symlink(dir.path().join("a.go"), dir.path().join("link.go")).unwrap();

        let entries = FsTree::new(dir.path()).list("").unwrap();
        assert_eq!(entries, vec![TreeEntry::dir(".cache"), TreeEntry::file("a.go")]);
    }

    #[test]
    fn test_fs_tree_honors_gitignore_in_repository() {
        if !git_available() {
            return;
        }
        let dir = TempDir::new().unwrap();
        init(
            dir.path(),
            &[(".gitignore", "gen.go\n"), ("a.go", "package a\n")],
        );
        std::fs::write(dir.path().join("gen.go"), "package a\n").unwrap();

        let names: Vec<_> = FsTree::new(dir.path())
            .list("")
            .unwrap()
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert!(names.contains(&"a.go".to_string()));
        assert!(!names.contains(&"gen.go".to_string()));
    }

    #[test]
    fn test_fs_tree_missing_directory() {
        let dir = TempDir::new().unwrap();
        let err = FsTree::new(dir.path()).list("nope").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn test_fs_tree_round_trip_nested() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("pkg")).unwrap();
        let tree = FsTree::new(dir.path());

        tree.write("pkg/a.go", "package pkg\n").unwrap();
        assert_eq!(tree.open("pkg/a.go").unwrap(), "package pkg\n");
    }

    #[test]
    fn test_join_path() {
        assert_eq!(join_path("", "a.go"), "a.go");
        assert_eq!(join_path("pkg", "a.go"), "pkg/a.go");
    }
}
