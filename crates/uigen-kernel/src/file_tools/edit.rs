//! FileEditEngine: the `str_replace_editor` tool.

use async_trait::async_trait;
use tracing::{debug, warn};
use uigen_types::{FILE_EDIT_TOOL, FileEditCommand, ToolOutcome};

use crate::tools::ToolEngine;
use crate::vfs::{FileNode, SharedVfs, path};

use super::error::Result;
use super::parse_command;
use super::text::{
    content_with_line_numbers, extract_context, extract_lines, insert_at_line, replace_unique,
};

/// Engine for viewing, creating and editing files.
pub struct FileEditEngine {
    vfs: SharedVfs,
}

impl FileEditEngine {
    pub fn new(vfs: SharedVfs) -> Self {
        Self { vfs }
    }

    /// Apply one validated command.
    pub fn apply(&self, command: &FileEditCommand) -> Result<String> {
        let path = path::normalize(command.path());
        match command {
            FileEditCommand::View { view_range, .. } => self.view(&path, *view_range),
            FileEditCommand::Create { file_text, .. } => {
                self.create(&path, file_text.as_deref().unwrap_or_default())
            }
            FileEditCommand::StrReplace {
                old_str, new_str, ..
            } => self.str_replace(&path, old_str, new_str.as_deref().unwrap_or_default()),
            FileEditCommand::Insert {
                insert_line,
                new_str,
                ..
            } => self.insert(&path, *insert_line, new_str),
        }
    }

    fn view(&self, path: &str, view_range: Option<(i64, i64)>) -> Result<String> {
        let vfs = self.vfs.read();
        match vfs.node(path)? {
            FileNode::File { content, .. } => match view_range {
                Some((start, end)) => extract_lines(&content, start, end),
                None => Ok(content_with_line_numbers(&content)),
            },
            FileNode::Directory { .. } => {
                let children = vfs.list_children(path)?;
                if children.is_empty() {
                    return Ok(format!("{path} is empty"));
                }
                Ok(children
                    .iter()
                    .map(|child| match child {
                        FileNode::Directory { .. } => format!("[DIR] {}", child.name()),
                        FileNode::File { .. } => format!("[FILE] {}", child.name()),
                    })
                    .collect::<Vec<_>>()
                    .join("\n"))
            }
        }
    }

    fn create(&self, path: &str, text: &str) -> Result<String> {
        let mut vfs = self.vfs.write();
        let existed = vfs.exists(path);
        vfs.create_file(path, text)?;
        Ok(if existed {
            format!("Overwrote {path}")
        } else {
            format!("Created {path}")
        })
    }

    fn str_replace(&self, path: &str, old: &str, new: &str) -> Result<String> {
        let mut vfs = self.vfs.write();
        let content = vfs.read_file(path)?;
        let (updated, pos) = replace_unique(content, old, new, path)?;
        vfs.update_file(path, updated.as_str())?;
        Ok(format!(
            "Replaced 1 occurrence in {path}\n\n{}",
            extract_context(&updated, pos, new.len())
        ))
    }

    fn insert(&self, path: &str, line: i64, text: &str) -> Result<String> {
        let mut vfs = self.vfs.write();
        let content = vfs.read_file(path)?;
        let (updated, at) = insert_at_line(content, line, text);
        vfs.update_file(path, updated)?;
        Ok(format!("Inserted text at line {at} of {path}"))
    }
}

#[async_trait]
impl ToolEngine for FileEditEngine {
    fn name(&self) -> &str {
        FILE_EDIT_TOOL
    }

    fn description(&self) -> &str {
        "View, create and edit files in the project. Paths are absolute from the project root."
    }

    fn schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "command": {
                    "type": "string",
                    "enum": ["view", "create", "str_replace", "insert"],
                    "description": "Operation to perform"
                },
                "path": {
                    "type": "string",
                    "description": "File or directory path, e.g. /App.jsx"
                },
                "file_text": {
                    "type": "string",
                    "description": "Content for create"
                },
                "old_str": {
                    "type": "string",
                    "description": "Exact text to replace; must occur exactly once"
                },
                "new_str": {
                    "type": "string",
                    "description": "Replacement text for str_replace, or the text to insert"
                },
                "insert_line": {
                    "type": "integer",
                    "description": "1-based line the inserted text will start on"
                },
                "view_range": {
                    "type": "array",
                    "items": {"type": "integer"},
                    "minItems": 2,
                    "maxItems": 2,
                    "description": "Inclusive 1-based line range for view; -1 means end of file"
                }
            },
            "required": ["command", "path"]
        })
    }

    #[tracing::instrument(skip(self, args), name = "engine.str_replace_editor")]
    async fn execute(&self, args: serde_json::Value) -> ToolOutcome {
        let command: FileEditCommand = match parse_command(FILE_EDIT_TOOL, args) {
            Ok(c) => c,
            Err(e) => {
                warn!(error = %e, "rejected arguments");
                return ToolOutcome::failure(e.kind(), e.to_string());
            }
        };

        match self.apply(&command) {
            Ok(result) => {
                debug!(command = command.name(), path = command.path(), "applied");
                ToolOutcome::success(result)
            }
            Err(e) => {
                warn!(command = command.name(), path = command.path(), error = %e, "command failed");
                ToolOutcome::failure(e.kind(), e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vfs::shared_vfs;
    use serde_json::json;
    use uigen_types::ErrorKind;

    fn engine() -> (SharedVfs, FileEditEngine) {
        let vfs = shared_vfs();
        (vfs.clone(), FileEditEngine::new(vfs))
    }

    #[tokio::test]
    async fn test_create_and_view() {
        let (vfs, engine) = engine();
        let out = engine
            .execute(json!({"command": "create", "path": "components/Button.jsx", "file_text": "a\nb\n"}))
            .await;
        assert!(out.is_ok());
        assert_eq!(out.text(), "Created /components/Button.jsx");
        assert_eq!(vfs.read().read_file("/components/Button.jsx").unwrap(), "a\nb\n");

        let out = engine
            .execute(json!({"command": "view", "path": "/components/Button.jsx"}))
            .await;
        assert_eq!(out.text(), "   1→ a\n   2→ b");

        let out = engine
            .execute(json!({"command": "view", "path": "/components/Button.jsx", "view_range": [2, -1]}))
            .await;
        assert_eq!(out.text(), "   2→ b");
    }

    #[tokio::test]
    async fn test_create_overwrites() {
        let (vfs, engine) = engine();
        engine.execute(json!({"command": "create", "path": "/a.js", "file_text": "1"})).await;
        let out = engine
            .execute(json!({"command": "create", "path": "/a.js", "file_text": "2"}))
            .await;
        assert_eq!(out.text(), "Overwrote /a.js");
        assert_eq!(vfs.read().read_file("/a.js").unwrap(), "2");
    }

    #[tokio::test]
    async fn test_view_directory() {
        let (_vfs, engine) = engine();
        engine.execute(json!({"command": "create", "path": "/b.js"})).await;
        engine.execute(json!({"command": "create", "path": "/lib/a.js"})).await;
        let out = engine.execute(json!({"command": "view", "path": "/"})).await;
        assert_eq!(out.text(), "[FILE] b.js\n[DIR] lib");
    }

    #[tokio::test]
    async fn test_str_replace() {
        let (vfs, engine) = engine();
        vfs.write().create_file("/a.js", "const x = 1;\n").unwrap();
        let out = engine
            .execute(json!({"command": "str_replace", "path": "/a.js", "old_str": "1", "new_str": "2"}))
            .await;
        assert!(out.is_ok(), "{out:?}");
        assert!(out.text().starts_with("Replaced 1 occurrence in /a.js"));
        assert_eq!(vfs.read().read_file("/a.js").unwrap(), "const x = 2;\n");
    }

    #[tokio::test]
    async fn test_str_replace_ambiguous_leaves_file() {
        let (vfs, engine) = engine();
        vfs.write().create_file("/a.js", "x; x;").unwrap();
        let revision = vfs.read().revision();
        let out = engine
            .execute(json!({"command": "str_replace", "path": "/a.js", "old_str": "x", "new_str": "y"}))
            .await;
        assert_eq!(out.error_kind(), Some(ErrorKind::AmbiguousMatch));
        assert_eq!(vfs.read().read_file("/a.js").unwrap(), "x; x;");
        assert_eq!(vfs.read().revision(), revision);
    }

    #[tokio::test]
    async fn test_str_replace_missing_new_str_deletes() {
        let (vfs, engine) = engine();
        vfs.write().create_file("/a.js", "keep drop").unwrap();
        engine
            .execute(json!({"command": "str_replace", "path": "/a.js", "old_str": " drop"}))
            .await;
        assert_eq!(vfs.read().read_file("/a.js").unwrap(), "keep");
    }

    #[tokio::test]
    async fn test_insert_alias() {
        let (vfs, engine) = engine();
        vfs.write().create_file("/a.js", "a\nc\n").unwrap();
        let out = engine
            .execute(json!({"command": "insert", "path": "/a.js", "insert_line": 2, "new_content": "b"}))
            .await;
        assert_eq!(out.text(), "Inserted text at line 2 of /a.js");
        assert_eq!(vfs.read().read_file("/a.js").unwrap(), "a\nb\nc\n");
    }

    #[tokio::test]
    async fn test_failures_are_typed() {
        let (_vfs, engine) = engine();
        let out = engine.execute(json!({"command": "view", "path": "/nope.js"})).await;
        assert_eq!(out.error_kind(), Some(ErrorKind::NotFound));

        let out = engine.execute(json!({"command": "explode", "path": "/a"})).await;
        assert_eq!(out.error_kind(), Some(ErrorKind::InvalidArguments));

        let out = engine.execute(json!({"command": "str_replace", "path": "/a"})).await;
        assert_eq!(out.error_kind(), Some(ErrorKind::InvalidArguments));

        let out = engine
            .execute(json!({"command": "create", "path": "/a/../b.js", "file_text": ""}))
            .await;
        assert_eq!(out.error_kind(), Some(ErrorKind::InvalidPath));
    }
}
