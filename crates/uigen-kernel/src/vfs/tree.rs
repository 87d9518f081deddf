//! The virtual file system.
//!
//! An in-memory tree of files and directories keyed by absolute path. It never
//! touches disk. Every successful mutation bumps the revision and then
//! notifies observers, in order.

use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;
use tracing::debug;
use uigen_types::{NodeType, SerializedNode, SerializedTree};

use super::error::{VfsError, VfsResult};
use super::events::{ChangeKind, Observer, Observers, SubscriptionId, VfsEvent};
use super::node::{FileNode, NodeBody, NodeId, Tree};
use super::path;
use super::snapshot::VfsSnapshot;

/// A VFS shared between the tool adapter and the session that drives it.
pub type SharedVfs = Arc<RwLock<VirtualFs>>;

/// Create a new empty shared VFS.
pub fn shared_vfs() -> SharedVfs {
    Arc::new(RwLock::new(VirtualFs::new()))
}

/// In-memory file tree with change notification.
#[derive(Debug, Default)]
pub struct VirtualFs {
    tree: Tree,
    observers: Observers,
    revision: u64,
}

impl VirtualFs {
    /// Create an empty tree (just the root directory).
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a tree hydrated from a persisted mapping.
    pub fn from_serialized(tree: &SerializedTree) -> VfsResult<Self> {
        let mut vfs = Self::new();
        vfs.deserialize(tree)?;
        Ok(vfs)
    }

    /// Revision counter; bumped once per successful mutation.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    // ========================================================================
    // Observers
    // ========================================================================

    /// Register an observer. Called synchronously after every mutation.
    pub fn subscribe(&mut self, observer: Observer) -> SubscriptionId {
        self.observers.subscribe(observer)
    }

    /// Remove an observer. Returns false if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.observers.unsubscribe(id)
    }

    fn emit(&mut self, kind: ChangeKind, path: String, from: Option<String>, node_type: Option<NodeType>) {
        self.revision += 1;
        let event = VfsEvent {
            kind,
            path,
            from,
            node_type,
            revision: self.revision,
        };
        debug!(event = %event, "vfs change");
        self.observers.notify(&event);
    }

    // ========================================================================
    // Reading
    // ========================================================================

    fn lookup(&self, path: &str) -> VfsResult<Option<NodeId>> {
        let segments = path::segments(path)?;
        Ok(self.tree.lookup(&segments))
    }

    fn require(&self, path: &str) -> VfsResult<NodeId> {
        self.lookup(path)?.ok_or_else(|| VfsError::not_found(path))
    }

    /// Whether any node exists at `path`. Invalid paths do not exist.
    pub fn exists(&self, path: &str) -> bool {
        matches!(self.lookup(path), Ok(Some(_)))
    }

    /// Detached view of the node at `path`.
    pub fn node(&self, path: &str) -> VfsResult<FileNode> {
        let id = self.require(path)?;
        Ok(self.tree.view(id))
    }

    /// Read a file's content. Directories read as `NotFound`.
    pub fn read_file(&self, path: &str) -> VfsResult<&str> {
        let id = self.require(path)?;
        match &self.tree.node(id).body {
            NodeBody::File { content } => Ok(content),
            NodeBody::Directory { .. } => Err(VfsError::not_found(path)),
        }
    }

    /// Children of a directory, in creation order.
    pub fn list_children(&self, path: &str) -> VfsResult<Vec<FileNode>> {
        let id = self.require(path)?;
        if self.tree.node(id).node_type() != NodeType::Directory {
            return Err(VfsError::not_a_directory(path));
        }
        Ok(self.tree.children(id).map(|child| self.tree.view(child)).collect())
    }

    /// Every file as `(path, content)`, depth-first in creation order.
    pub fn files(&self) -> Vec<(String, String)> {
        self.tree
            .walk()
            .into_iter()
            .filter_map(|id| match &self.tree.node(id).body {
                NodeBody::File { content } => Some((self.tree.path_of(id), content.clone())),
                NodeBody::Directory { .. } => None,
            })
            .collect()
    }

    /// Number of files (directories excluded).
    pub fn file_count(&self) -> usize {
        self.tree
            .walk()
            .into_iter()
            .filter(|id| self.tree.node(*id).node_type() == NodeType::File)
            .count()
    }

    /// True when the tree holds nothing but the root.
    pub fn is_empty(&self) -> bool {
        self.tree.len() == 1
    }

    /// Immutable copy of every file, tagged with the current revision.
    pub fn snapshot(&self) -> VfsSnapshot {
        VfsSnapshot::new(self.revision, self.files())
    }

    // ========================================================================
    // Writing
    // ========================================================================

    /// Create a file, creating missing parent directories. An existing file at
    /// `path` has its content replaced; a directory there is a conflict.
    pub fn create_file(&mut self, path: &str, content: impl Into<String>) -> VfsResult<FileNode> {
        let segments = path::segments(path)?;
        let Some((name, parents)) = segments.split_last() else {
            return Err(VfsError::path_conflict(path));
        };
        let content = content.into();

        if let Some(existing) = self.tree.lookup(&segments) {
            if !self.tree.set_content(existing, content.clone()) {
                return Err(VfsError::path_conflict(path));
            }
            self.emit(ChangeKind::Updated, path.to_string(), None, Some(NodeType::File));
        } else {
            let parent = self.tree.ensure_dirs(parents)?;
            self.tree.insert_child(
                parent,
                name,
                NodeBody::File {
                    content: content.clone(),
                },
            );
            self.emit(ChangeKind::Created, path.to_string(), None, Some(NodeType::File));
        }

        Ok(FileNode::File {
            path: path.to_string(),
            content,
        })
    }

    /// Create a directory (and missing parents). Idempotent on an existing
    /// directory; a file at `path` is a conflict.
    pub fn create_directory(&mut self, path: &str) -> VfsResult<FileNode> {
        let segments = path::segments(path)?;
        match self.tree.lookup(&segments) {
            Some(id) if self.tree.node(id).node_type() == NodeType::Directory => {}
            Some(_) => return Err(VfsError::path_conflict(path)),
            None => {
                self.tree.ensure_dirs(&segments)?;
                self.emit(
                    ChangeKind::Created,
                    path.to_string(),
                    None,
                    Some(NodeType::Directory),
                );
            }
        }
        Ok(FileNode::Directory {
            path: path.to_string(),
        })
    }

    /// Replace the full content of an existing file.
    pub fn update_file(&mut self, path: &str, content: impl Into<String>) -> VfsResult<()> {
        let id = self.require(path)?;
        if !self.tree.set_content(id, content.into()) {
            return Err(VfsError::not_found(path));
        }
        self.emit(ChangeKind::Updated, path.to_string(), None, Some(NodeType::File));
        Ok(())
    }

    /// Remove a file, or a directory with everything below it.
    pub fn delete_node(&mut self, path: &str) -> VfsResult<()> {
        let id = self.require(path)?;
        if id == self.tree.root() {
            return Err(VfsError::invalid_path(path, "the root cannot be deleted"));
        }
        let node_type = self.tree.node(id).node_type();
        let removed = self.tree.remove_subtree(id);
        debug!(path, removed, "deleted subtree");
        self.emit(ChangeKind::Deleted, path.to_string(), None, Some(node_type));
        Ok(())
    }

    /// Move a node (and its subtree) to `new_path`. Missing parents of the
    /// destination are created.
    pub fn rename_node(&mut self, old_path: &str, new_path: &str) -> VfsResult<()> {
        let id = self.require(old_path)?;
        if id == self.tree.root() {
            return Err(VfsError::invalid_path(old_path, "the root cannot be renamed"));
        }
        let new_segments = path::segments(new_path)?;
        let Some((new_name, new_parents)) = new_segments.split_last() else {
            return Err(VfsError::path_conflict(new_path));
        };
        if self.tree.lookup(&new_segments).is_some() {
            return Err(VfsError::path_conflict(new_path));
        }
        if path::is_within(new_path, old_path) {
            return Err(VfsError::invalid_path(
                new_path,
                "cannot move a directory inside itself",
            ));
        }

        let new_parent = self.tree.ensure_dirs(new_parents)?;
        debug_assert!(!self.tree.is_descendant_or_self(new_parent, id));
        let node_type = self.tree.node(id).node_type();
        self.tree.move_node(id, new_parent, new_name);
        self.emit(
            ChangeKind::Renamed,
            new_path.to_string(),
            Some(old_path.to_string()),
            Some(node_type),
        );
        Ok(())
    }

    /// Drop everything but the root.
    pub fn reset(&mut self) {
        self.tree = Tree::new();
        self.emit(ChangeKind::Replaced, path::ROOT.to_string(), None, None);
    }

    // ========================================================================
    // Persistence
    // ========================================================================

    /// Flat path → node mapping (root omitted), depth-first creation order.
    pub fn serialize(&self) -> SerializedTree {
        self.tree
            .walk()
            .into_iter()
            .map(|id| {
                let node = match &self.tree.node(id).body {
                    NodeBody::File { content } => SerializedNode::file(content.clone()),
                    NodeBody::Directory { .. } => SerializedNode::Directory,
                };
                (self.tree.path_of(id), node)
            })
            .collect::<IndexMap<_, _>>()
    }

    /// Replace the whole tree from a persisted mapping. All-or-nothing: any
    /// malformed entry aborts the load and leaves the current tree untouched.
    pub fn deserialize(&mut self, mapping: &SerializedTree) -> VfsResult<()> {
        let tree = build_tree(mapping)?;
        self.tree = tree;
        self.emit(ChangeKind::Replaced, path::ROOT.to_string(), None, None);
        Ok(())
    }

    /// Serialize to JSON text.
    pub fn to_json(&self) -> String {
        // SerializedTree is string keys and plain enums; it always serializes.
        serde_json::to_string(&self.serialize()).unwrap_or_else(|_| "{}".to_string())
    }

    /// Replace the tree from JSON text. Malformed JSON is a deserialize error.
    pub fn load_json(&mut self, json: &str) -> VfsResult<()> {
        let mapping: SerializedTree =
            serde_json::from_str(json).map_err(|e| VfsError::deserialize(e.to_string()))?;
        self.deserialize(&mapping)
    }
}

/// Build a fresh tree from a mapping without touching any live tree.
fn build_tree(mapping: &SerializedTree) -> VfsResult<Tree> {
    let mut tree = Tree::new();
    for (entry_path, entry) in mapping {
        let segments = path::segments(entry_path)
            .map_err(|e| VfsError::deserialize(format!("entry {entry_path:?}: {e}")))?;
        let conflict = || {
            VfsError::deserialize(format!(
                "entry {entry_path:?} conflicts with an existing node"
            ))
        };

        let Some((name, parents)) = segments.split_last() else {
            // The root itself: only a directory is acceptable.
            if matches!(entry, SerializedNode::File { .. }) {
                return Err(conflict());
            }
            continue;
        };

        let parent = tree
            .ensure_dirs(parents)
            .map_err(|e| VfsError::deserialize(format!("entry {entry_path:?}: {e}")))?;

        match (tree.lookup(&segments), entry) {
            (Some(existing), SerializedNode::Directory)
                if tree.node(existing).node_type() == NodeType::Directory => {}
            (Some(_), _) => return Err(conflict()),
            (None, SerializedNode::Directory) => {
                tree.insert_child(
                    parent,
                    name,
                    NodeBody::Directory {
                        children: IndexMap::new(),
                    },
                );
            }
            (None, SerializedNode::File { content }) => {
                tree.insert_child(
                    parent,
                    name,
                    NodeBody::File {
                        content: content.clone(),
                    },
                );
            }
        }
    }
    Ok(tree)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn recorder(vfs: &mut VirtualFs) -> Arc<Mutex<Vec<VfsEvent>>> {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();
        vfs.subscribe(Box::new(move |e| sink.lock().unwrap().push(e.clone())));
        events
    }

    #[test]
    fn test_create_and_read() {
        let mut vfs = VirtualFs::new();
        vfs.create_file("/App.jsx", "export default 1").unwrap();
        assert_eq!(vfs.read_file("/App.jsx").unwrap(), "export default 1");
    }

    #[test]
    fn test_create_makes_parents() {
        let mut vfs = VirtualFs::new();
        vfs.create_file("/components/ui/Button.tsx", "").unwrap();
        assert!(vfs.node("/components").unwrap().is_dir());
        assert!(vfs.node("/components/ui").unwrap().is_dir());
        assert_eq!(vfs.file_count(), 1);
    }

    #[test]
    fn test_create_rejects_bad_paths() {
        let mut vfs = VirtualFs::new();
        for bad in ["relative.js", "/a//b.js", "/a/../b.js", "/./a.js", "/a/"] {
            let err = vfs.create_file(bad, "").unwrap_err();
            assert_eq!(err.kind(), uigen_types::ErrorKind::InvalidPath, "{bad}");
        }
        assert!(vfs.is_empty());
    }

    #[test]
    fn test_create_over_directory_conflicts() {
        let mut vfs = VirtualFs::new();
        vfs.create_file("/dir/a.js", "").unwrap();
        assert_eq!(
            vfs.create_file("/dir", "x").unwrap_err(),
            VfsError::path_conflict("/dir")
        );
        assert_eq!(
            vfs.create_directory("/dir/a.js").unwrap_err(),
            VfsError::path_conflict("/dir/a.js")
        );
    }

    #[test]
    fn test_create_existing_file_replaces() {
        let mut vfs = VirtualFs::new();
        let events = recorder(&mut vfs);
        vfs.create_file("/a.js", "1").unwrap();
        vfs.create_file("/a.js", "2").unwrap();
        assert_eq!(vfs.read_file("/a.js").unwrap(), "2");
        let kinds: Vec<_> = events.lock().unwrap().iter().map(|e| e.kind).collect();
        assert_eq!(kinds, [ChangeKind::Created, ChangeKind::Updated]);
    }

    #[test]
    fn test_read_directory_is_not_found() {
        let mut vfs = VirtualFs::new();
        vfs.create_directory("/dir").unwrap();
        assert_eq!(vfs.read_file("/dir").unwrap_err(), VfsError::not_found("/dir"));
        assert_eq!(vfs.read_file("/nope").unwrap_err(), VfsError::not_found("/nope"));
    }

    #[test]
    fn test_update_requires_existing_file() {
        let mut vfs = VirtualFs::new();
        assert_eq!(
            vfs.update_file("/a.js", "x").unwrap_err(),
            VfsError::not_found("/a.js")
        );
        vfs.create_file("/a.js", "old").unwrap();
        vfs.update_file("/a.js", "new").unwrap();
        assert_eq!(vfs.read_file("/a.js").unwrap(), "new");
    }

    #[test]
    fn test_delete_directory_removes_descendants() {
        let mut vfs = VirtualFs::new();
        vfs.create_file("/a/b/c.js", "").unwrap();
        vfs.create_file("/a/d.js", "").unwrap();
        vfs.create_file("/keep.js", "").unwrap();

        vfs.delete_node("/a").unwrap();
        assert!(!vfs.exists("/a"));
        assert!(!vfs.exists("/a/b"));
        assert!(!vfs.exists("/a/b/c.js"));
        assert!(!vfs.exists("/a/d.js"));
        assert!(vfs.exists("/keep.js"));
    }

    #[test]
    fn test_delete_missing_is_not_found_and_noop() {
        let mut vfs = VirtualFs::new();
        vfs.create_file("/a.js", "").unwrap();
        let before = vfs.serialize();
        let revision = vfs.revision();

        assert_eq!(vfs.delete_node("/b.js").unwrap_err(), VfsError::not_found("/b.js"));
        assert_eq!(vfs.serialize(), before);
        assert_eq!(vfs.revision(), revision);
    }

    #[test]
    fn test_delete_root_is_invalid() {
        let mut vfs = VirtualFs::new();
        assert_eq!(
            vfs.delete_node("/").unwrap_err().kind(),
            uigen_types::ErrorKind::InvalidPath
        );
    }

    #[test]
    fn test_rename_moves_subtree() {
        let mut vfs = VirtualFs::new();
        vfs.create_file("/a/c.js", "c").unwrap();
        vfs.rename_node("/a", "/b").unwrap();

        assert_eq!(vfs.read_file("/b/c.js").unwrap(), "c");
        assert!(!vfs.exists("/a"));
        assert!(!vfs.exists("/a/c.js"));
        let children = vfs.list_children("/b").unwrap();
        assert_eq!(children[0].path(), "/b/c.js");
    }

    #[test]
    fn test_rename_errors() {
        let mut vfs = VirtualFs::new();
        vfs.create_file("/a/c.js", "").unwrap();
        vfs.create_file("/x.js", "").unwrap();

        assert_eq!(
            vfs.rename_node("/missing", "/y").unwrap_err(),
            VfsError::not_found("/missing")
        );
        assert_eq!(
            vfs.rename_node("/x.js", "/a/c.js").unwrap_err(),
            VfsError::path_conflict("/a/c.js")
        );
        assert_eq!(
            vfs.rename_node("/a", "/a/inner").unwrap_err().kind(),
            uigen_types::ErrorKind::InvalidPath
        );
        assert_eq!(
            vfs.rename_node("/a", "/x.js/a").unwrap_err(),
            VfsError::not_a_directory("/x.js")
        );
    }

    #[test]
    fn test_rename_creates_destination_parents() {
        let mut vfs = VirtualFs::new();
        vfs.create_file("/Button.jsx", "b").unwrap();
        vfs.rename_node("/Button.jsx", "/components/Button.jsx").unwrap();
        assert_eq!(vfs.read_file("/components/Button.jsx").unwrap(), "b");
    }

    #[test]
    fn test_list_children_order_and_errors() {
        let mut vfs = VirtualFs::new();
        vfs.create_file("/z.js", "").unwrap();
        vfs.create_file("/a.js", "").unwrap();
        vfs.create_directory("/m").unwrap();

        let names: Vec<_> = vfs
            .list_children("/")
            .unwrap()
            .iter()
            .map(|n| n.name().to_string())
            .collect();
        assert_eq!(names, ["z.js", "a.js", "m"]);

        assert_eq!(
            vfs.list_children("/z.js").unwrap_err(),
            VfsError::not_a_directory("/z.js")
        );
        assert_eq!(
            vfs.list_children("/nope").unwrap_err(),
            VfsError::not_found("/nope")
        );
    }

    #[test]
    fn test_events_in_order_with_revisions() {
        let mut vfs = VirtualFs::new();
        let events = recorder(&mut vfs);

        vfs.create_file("/a.js", "").unwrap();
        vfs.update_file("/a.js", "x").unwrap();
        vfs.rename_node("/a.js", "/b.js").unwrap();
        vfs.delete_node("/b.js").unwrap();
        let _ = vfs.delete_node("/b.js");

        let events = events.lock().unwrap();
        let summary: Vec<_> = events
            .iter()
            .map(|e| (e.kind, e.path.as_str(), e.revision))
            .collect();
        assert_eq!(
            summary,
            [
                (ChangeKind::Created, "/a.js", 1),
                (ChangeKind::Updated, "/a.js", 2),
                (ChangeKind::Renamed, "/b.js", 3),
                (ChangeKind::Deleted, "/b.js", 4),
            ]
        );
        assert_eq!(events[2].from.as_deref(), Some("/a.js"));
    }

    #[test]
    fn test_serialize_roundtrip() {
        let mut vfs = VirtualFs::new();
        vfs.create_file("/App.jsx", "app").unwrap();
        vfs.create_file("/components/Button.tsx", "button").unwrap();
        vfs.create_directory("/empty").unwrap();

        let mapping = vfs.serialize();
        let restored = VirtualFs::from_serialized(&mapping).unwrap();
        assert_eq!(restored.serialize(), mapping);
        assert_eq!(restored.read_file("/components/Button.tsx").unwrap(), "button");
        assert!(restored.node("/empty").unwrap().is_dir());
    }

    #[test]
    fn test_deserialize_failure_keeps_tree() {
        let mut vfs = VirtualFs::new();
        vfs.create_file("/keep.js", "k").unwrap();
        let events = recorder(&mut vfs);

        let mut bad = SerializedTree::new();
        bad.insert("/ok.js".into(), SerializedNode::file(""));
        bad.insert("/ok.js/child.js".into(), SerializedNode::file(""));
        let err = vfs.deserialize(&bad).unwrap_err();
        assert_eq!(err.kind(), uigen_types::ErrorKind::DeserializeError);

        let mut bad_path = SerializedTree::new();
        bad_path.insert("/a/../b".into(), SerializedNode::Directory);
        assert!(vfs.deserialize(&bad_path).is_err());

        assert_eq!(vfs.read_file("/keep.js").unwrap(), "k");
        assert!(!vfs.exists("/ok.js"));
        assert!(events.lock().unwrap().is_empty());
    }

    #[test]
    fn test_deserialize_accepts_root_and_implicit_dirs() {
        let mut mapping = SerializedTree::new();
        mapping.insert("/".into(), SerializedNode::Directory);
        mapping.insert("/src/App.jsx".into(), SerializedNode::file("x"));
        mapping.insert("/src".into(), SerializedNode::Directory);

        let vfs = VirtualFs::from_serialized(&mapping).unwrap();
        assert_eq!(vfs.read_file("/src/App.jsx").unwrap(), "x");

        let mut root_file = SerializedTree::new();
        root_file.insert("/".into(), SerializedNode::file("nope"));
        assert!(VirtualFs::from_serialized(&root_file).is_err());
    }

    #[test]
    fn test_load_json_malformed() {
        let mut vfs = VirtualFs::new();
        vfs.create_file("/a.js", "a").unwrap();
        let err = vfs.load_json("{\"/b.js\": {\"type\": \"file\"}}").unwrap_err();
        assert_eq!(err.kind(), uigen_types::ErrorKind::DeserializeError);
        assert!(vfs.exists("/a.js"));

        let json = vfs.to_json();
        let mut other = VirtualFs::new();
        other.load_json(&json).unwrap();
        assert_eq!(other.read_file("/a.js").unwrap(), "a");
    }

    #[test]
    fn test_reset_and_snapshot() {
        let mut vfs = VirtualFs::new();
        vfs.create_file("/a.js", "a").unwrap();
        let snap = vfs.snapshot();
        assert_eq!(snap.revision(), 1);
        assert_eq!(snap.get("/a.js"), Some("a"));

        vfs.reset();
        assert!(vfs.is_empty());
        assert_eq!(vfs.revision(), 2);
        assert_eq!(snap.get("/a.js"), Some("a"));
    }
}
