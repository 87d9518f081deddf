//! Node storage.
//!
//! Nodes live in an arena keyed by a stable [`NodeId`]. Ownership flows
//! downward only: a directory's `children` map owns its child ids, while the
//! `parent` field is a plain id used to recompute paths. Paths are never
//! stored, so moving a subtree re-paths every descendant for free.

use std::collections::HashMap;

use indexmap::IndexMap;
use uigen_types::NodeType;

use super::error::{VfsError, VfsResult};
use super::path;

/// Public view of a node, detached from the tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FileNode {
    File { path: String, content: String },
    Directory { path: String },
}

impl FileNode {
    pub fn path(&self) -> &str {
        match self {
            FileNode::File { path, .. } | FileNode::Directory { path } => path,
        }
    }

    /// Last path segment (empty for the root).
    pub fn name(&self) -> &str {
        path::file_name(self.path())
    }

    pub fn node_type(&self) -> NodeType {
        match self {
            FileNode::File { .. } => NodeType::File,
            FileNode::Directory { .. } => NodeType::Directory,
        }
    }

    pub fn content(&self) -> Option<&str> {
        match self {
            FileNode::File { content, .. } => Some(content),
            FileNode::Directory { .. } => None,
        }
    }

    pub fn is_file(&self) -> bool {
        matches!(self, FileNode::File { .. })
    }

    pub fn is_dir(&self) -> bool {
        matches!(self, FileNode::Directory { .. })
    }
}

/// Arena key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) struct NodeId(u64);

#[derive(Clone, Debug)]
pub(crate) enum NodeBody {
    File { content: String },
    /// Insertion order is creation order.
    Directory { children: IndexMap<String, NodeId> },
}

#[derive(Clone, Debug)]
pub(crate) struct Node {
    pub(crate) name: String,
    pub(crate) parent: Option<NodeId>,
    pub(crate) body: NodeBody,
}

impl Node {
    pub(crate) fn node_type(&self) -> NodeType {
        match self.body {
            NodeBody::File { .. } => NodeType::File,
            NodeBody::Directory { .. } => NodeType::Directory,
        }
    }
}

/// The tree proper: arena plus root. Knows nothing about notifications or
/// revisions; `VirtualFs` layers those on top.
#[derive(Clone, Debug)]
pub(crate) struct Tree {
    nodes: HashMap<NodeId, Node>,
    root: NodeId,
    next_id: u64,
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

impl Tree {
    pub(crate) fn new() -> Self {
        let root = NodeId(0);
        let mut nodes = HashMap::new();
        nodes.insert(
            root,
            Node {
                name: String::new(),
                parent: None,
                body: NodeBody::Directory {
                    children: IndexMap::new(),
                },
            },
        );
        Self {
            nodes,
            root,
            next_id: 1,
        }
    }

    pub(crate) fn root(&self) -> NodeId {
        self.root
    }

    pub(crate) fn node(&self, id: NodeId) -> &Node {
        &self.nodes[&id]
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        // Ids handed out by this tree are always present.
        self.nodes.get_mut(&id).unwrap_or_else(|| unreachable!("dangling node id"))
    }

    pub(crate) fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Ordered children of a directory (empty for files).
    pub(crate) fn children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        let children = match &self.node(id).body {
            NodeBody::Directory { children } => Some(children.values().copied()),
            NodeBody::File { .. } => None,
        };
        children.into_iter().flatten()
    }

    /// Walk `segments` from the root.
    pub(crate) fn lookup(&self, segments: &[&str]) -> Option<NodeId> {
        let mut current = self.root;
        for segment in segments {
            match &self.node(current).body {
                NodeBody::Directory { children } => current = *children.get(*segment)?,
                NodeBody::File { .. } => return None,
            }
        }
        Some(current)
    }

    /// Recompute the absolute path of a node from its parent chain.
    pub(crate) fn path_of(&self, id: NodeId) -> String {
        let mut names = Vec::new();
        let mut current = Some(id);
        while let Some(node_id) = current {
            let node = self.node(node_id);
            if node.parent.is_some() {
                names.push(node.name.as_str());
            }
            current = node.parent;
        }
        names.reverse();
        format!("/{}", names.join("/"))
    }

    /// Detached public view of a node.
    pub(crate) fn view(&self, id: NodeId) -> FileNode {
        let path = self.path_of(id);
        match &self.node(id).body {
            NodeBody::File { content } => FileNode::File {
                path,
                content: content.clone(),
            },
            NodeBody::Directory { .. } => FileNode::Directory { path },
        }
    }

    /// Walk `segments` from the root, creating missing directories.
    pub(crate) fn ensure_dirs(&mut self, segments: &[&str]) -> VfsResult<NodeId> {
        let mut current = self.root;
        for (depth, segment) in segments.iter().enumerate() {
            let existing = match &self.node(current).body {
                NodeBody::Directory { children } => children.get(*segment).copied(),
                NodeBody::File { .. } => None,
            };
            current = match existing {
                Some(child) => {
                    if matches!(self.node(child).body, NodeBody::File { .. }) {
                        let prefix = format!("/{}", segments[..=depth].join("/"));
                        return Err(VfsError::not_a_directory(prefix));
                    }
                    child
                }
                None => self.insert_child(
                    current,
                    segment,
                    NodeBody::Directory {
                        children: IndexMap::new(),
                    },
                ),
            };
        }
        Ok(current)
    }

    /// Attach a new node under `parent`. The caller has checked that `parent`
    /// is a directory and `name` is free.
    pub(crate) fn insert_child(&mut self, parent: NodeId, name: &str, body: NodeBody) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.nodes.insert(
            id,
            Node {
                name: name.to_string(),
                parent: Some(parent),
                body,
            },
        );
        if let NodeBody::Directory { children } = &mut self.node_mut(parent).body {
            children.insert(name.to_string(), id);
        }
        id
    }

    /// Replace a file's content. Returns false if `id` is a directory.
    pub(crate) fn set_content(&mut self, id: NodeId, new_content: String) -> bool {
        match &mut self.node_mut(id).body {
            NodeBody::File { content } => {
                *content = new_content;
                true
            }
            NodeBody::Directory { .. } => false,
        }
    }

    /// Detach `id` from its parent and drop it with its whole subtree.
    /// Returns the number of nodes removed.
    pub(crate) fn remove_subtree(&mut self, id: NodeId) -> usize {
        self.detach(id);
        let mut stack = vec![id];
        let mut removed = 0;
        while let Some(current) = stack.pop() {
            if let Some(node) = self.nodes.remove(&current) {
                if let NodeBody::Directory { children } = node.body {
                    stack.extend(children.into_values());
                }
                removed += 1;
            }
        }
        removed
    }

    /// Move `id` under `new_parent` as `new_name`. It lands last in the new
    /// parent's child order.
    pub(crate) fn move_node(&mut self, id: NodeId, new_parent: NodeId, new_name: &str) {
        self.detach(id);
        let node = self.node_mut(id);
        node.name = new_name.to_string();
        node.parent = Some(new_parent);
        if let NodeBody::Directory { children } = &mut self.node_mut(new_parent).body {
            children.insert(new_name.to_string(), id);
        }
    }

    /// Whether `id` is `ancestor` or one of its descendants.
    pub(crate) fn is_descendant_or_self(&self, id: NodeId, ancestor: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node_id) = current {
            if node_id == ancestor {
                return true;
            }
            current = self.node(node_id).parent;
        }
        false
    }

    /// Depth-first, creation-ordered walk below (and excluding) the root.
    pub(crate) fn walk(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(self.root).collect();
        stack.reverse();
        while let Some(id) = stack.pop() {
            out.push(id);
            let mut children: Vec<NodeId> = self.children(id).collect();
            children.reverse();
            stack.extend(children);
        }
        out
    }

    fn detach(&mut self, id: NodeId) {
        let Some(parent) = self.node(id).parent else {
            return;
        };
        let name = self.node(id).name.clone();
        if let NodeBody::Directory { children } = &mut self.node_mut(parent).body {
            children.shift_remove(&name);
        }
    }
}
