//! File tools: the tool-call adapter between the model loop and the VFS.
//!
//! Two tools, each a closed set of commands validated at this boundary:
//!
//! - `str_replace_editor` ([`FileEditEngine`]): view, create, str_replace, insert
//! - `file_manager` ([`FileManagerEngine`]): rename, delete
//!
//! ```text
//! model loop ──(tool, JSON args)──▶ ToolRegistry ──▶ engine ──▶ SharedVfs
//!            ◀──── {ok, result} | {ok: false, errorKind, message} ────┘
//! ```
//!
//! Paths from the model are normalized here (leading `/` added, repeated and
//! trailing slashes dropped). `.` and `..` segments are left for the VFS to
//! reject.

pub mod edit;
pub mod error;
pub mod manager;
pub mod text;

use std::sync::Arc;

use serde::de::DeserializeOwned;
use uigen_types::ToolCallError;

pub use edit::FileEditEngine;
pub use error::ToolError;
pub use manager::FileManagerEngine;

use crate::tools::ToolRegistry;
use crate::vfs::SharedVfs;

/// Validate a raw argument bag into `tool`'s command type.
pub fn parse_command<T: DeserializeOwned>(tool: &str, args: serde_json::Value) -> error::Result<T> {
    serde_json::from_value(args).map_err(|e| {
        ToolError::Call(ToolCallError::InvalidArguments {
            tool: tool.to_string(),
            reason: e.to_string(),
        })
    })
}

/// Registry with both file tools bound to `vfs`.
pub fn registry(vfs: &SharedVfs) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Arc::new(FileEditEngine::new(vfs.clone())));
    registry.register(Arc::new(FileManagerEngine::new(vfs.clone())));
    registry
}
