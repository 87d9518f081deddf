//! FileManagerEngine: the `file_manager` tool (rename and delete).

use async_trait::async_trait;
use tracing::{debug, warn};
use uigen_types::{FILE_MANAGER_TOOL, FileManagerCommand, ToolOutcome};

use crate::tools::ToolEngine;
use crate::vfs::{SharedVfs, path};

use super::error::Result;
use super::parse_command;

/// Engine for moving and removing files and directories.
pub struct FileManagerEngine {
    vfs: SharedVfs,
}

impl FileManagerEngine {
    pub fn new(vfs: SharedVfs) -> Self {
        Self { vfs }
    }

    /// Apply one validated command.
    pub fn apply(&self, command: &FileManagerCommand) -> Result<String> {
        let mut vfs = self.vfs.write();
        match command {
            FileManagerCommand::Rename { path: from, new_path } => {
                let from = path::normalize(from);
                let to = path::normalize(new_path);
                vfs.rename_node(&from, &to)?;
                Ok(format!("Renamed {from} to {to}"))
            }
            FileManagerCommand::Delete { path: target } => {
                let target = path::normalize(target);
                vfs.delete_node(&target)?;
                Ok(format!("Deleted {target}"))
            }
        }
    }
}

#[async_trait]
impl ToolEngine for FileManagerEngine {
    fn name(&self) -> &str {
        FILE_MANAGER_TOOL
    }

    fn description(&self) -> &str {
        "Rename or delete files and directories. Renaming a directory moves everything inside it."
    }

    fn schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "command": {
                    "type": "string",
                    "enum": ["rename", "delete"],
                    "description": "Operation to perform"
                },
                "path": {
                    "type": "string",
                    "description": "Path of the file or directory"
                },
                "new_path": {
                    "type": "string",
                    "description": "Destination path for rename"
                }
            },
            "required": ["command", "path"]
        })
    }

    #[tracing::instrument(skip(self, args), name = "engine.file_manager")]
    async fn execute(&self, args: serde_json::Value) -> ToolOutcome {
        let command: FileManagerCommand = match parse_command(FILE_MANAGER_TOOL, args) {
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

    #[tokio::test]
    async fn test_rename_directory() {
        let vfs = shared_vfs();
        vfs.write().create_file("/a/c.js", "c").unwrap();
        let engine = FileManagerEngine::new(vfs.clone());

        let out = engine
            .execute(json!({"command": "rename", "path": "a", "new_path": "/b/"}))
            .await;
        assert_eq!(out.text(), "Renamed /a to /b");

        let vfs = vfs.read();
        assert_eq!(vfs.read_file("/b/c.js").unwrap(), "c");
        assert!(!vfs.exists("/a"));
        assert!(!vfs.exists("/a/c.js"));
    }

    #[tokio::test]
    async fn test_rename_requires_new_path() {
        let engine = FileManagerEngine::new(shared_vfs());
        let out = engine.execute(json!({"command": "rename", "path": "/a"})).await;
        assert_eq!(out.error_kind(), Some(ErrorKind::InvalidArguments));
    }

    #[tokio::test]
    async fn test_delete() {
        let vfs = shared_vfs();
        vfs.write().create_file("/lib/x.js", "").unwrap();
        let engine = FileManagerEngine::new(vfs.clone());

        let out = engine.execute(json!({"command": "delete", "path": "/lib"})).await;
        assert!(out.is_ok());
        assert!(vfs.read().is_empty());

        let out = engine.execute(json!({"command": "delete", "path": "/lib"})).await;
        assert_eq!(out.error_kind(), Some(ErrorKind::NotFound));

        let out = engine.execute(json!({"command": "delete", "path": "/"})).await;
        assert_eq!(out.error_kind(), Some(ErrorKind::InvalidPath));
    }
}
