//! Immutable VFS snapshots.
//!
//! The transform pipeline never reads the live tree. It works on a snapshot:
//! every file's content at one revision, cheap to clone and safe to move to a
//! worker thread.

use std::sync::Arc;

use indexmap::IndexMap;

use super::path;

/// All files of the tree at one revision, in depth-first creation order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VfsSnapshot {
    revision: u64,
    files: Arc<IndexMap<String, String>>,
}

impl VfsSnapshot {
    /// Build a snapshot from `(path, content)` pairs.
    pub fn new(revision: u64, files: impl IntoIterator<Item = (String, String)>) -> Self {
        Self {
            revision,
            files: Arc::new(files.into_iter().collect()),
        }
    }

    /// Convenience for tests and tools: revision 0 from borrowed pairs.
    pub fn from_files<'a>(files: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self::new(
            0,
            files
                .into_iter()
                .map(|(p, c)| (p.to_string(), c.to_string())),
        )
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Content of the file at `path`.
    pub fn get(&self, path: &str) -> Option<&str> {
        self.files.get(path).map(String::as_str)
    }

    /// Whether a file exists at `path`.
    pub fn is_file(&self, path: &str) -> bool {
        self.files.contains_key(path)
    }

    /// Whether `path` is a directory that holds at least one file.
    pub fn is_dir(&self, dir: &str) -> bool {
        dir == path::ROOT
            || self
                .files
                .keys()
                .any(|p| p.len() > dir.len() && path::is_within(p, dir))
    }

    /// Files in creation order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.files.iter().map(|(p, c)| (p.as_str(), c.as_str()))
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}
