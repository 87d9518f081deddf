//! Persisted tree shape.
//!
//! Project storage sees the file tree as a flat, ordered mapping of absolute
//! path to node. Directories carry no payload; files carry their full text.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Discriminant of a tree node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    File,
    Directory,
}

impl NodeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeType::File => "file",
            NodeType::Directory => "directory",
        }
    }
}

impl std::fmt::Display for NodeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of a [`SerializedTree`]:
/// `{"type": "file", "content": "..."}` or `{"type": "directory"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SerializedNode {
    File { content: String },
    Directory,
}

impl SerializedNode {
    pub fn file(content: impl Into<String>) -> Self {
        Self::File {
            content: content.into(),
        }
    }

    pub fn node_type(&self) -> NodeType {
        match self {
            Self::File { .. } => NodeType::File,
            Self::Directory => NodeType::Directory,
        }
    }

    pub fn content(&self) -> Option<&str> {
        match self {
            Self::File { content } => Some(content),
            Self::Directory => None,
        }
    }
}

/// Flat path → node mapping, in the tree's depth-first creation order.
pub type SerializedTree = IndexMap<String, SerializedNode>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_node_wire_shape() {
        let mut tree = SerializedTree::new();
        tree.insert("/".into(), SerializedNode::Directory);
        tree.insert("/App.jsx".into(), SerializedNode::file("x"));

        let value = serde_json::to_value(&tree).unwrap();
        assert_eq!(
            value,
            json!({
                "/": {"type": "directory"},
                "/App.jsx": {"type": "file", "content": "x"},
            })
        );
    }

    #[test]
    fn test_order_survives_json() {
        let text = r#"{"/z.js":{"type":"file","content":""},"/a.js":{"type":"file","content":""}}"#;
        let tree: SerializedTree = serde_json::from_str(text).unwrap();
        let keys: Vec<_> = tree.keys().map(String::as_str).collect();
        assert_eq!(keys, ["/z.js", "/a.js"]);
    }

    #[test]
    fn test_file_without_content_is_rejected() {
        let result: Result<SerializedNode, _> = serde_json::from_value(json!({"type": "file"}));
        assert!(result.is_err());
    }
}
