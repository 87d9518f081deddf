//! The tool-call contract.
//!
//! The model loop hands us a tool name and a loosely-typed JSON argument bag.
//! We validate it once, at the boundary, into a closed set of tagged variants
//! so nothing past this point ever looks at raw JSON.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::ErrorKind;

/// Name of the file-edit tool (view / create / str_replace / insert).
pub const FILE_EDIT_TOOL: &str = "str_replace_editor";

/// Name of the file-manager tool (rename / delete).
pub const FILE_MANAGER_TOOL: &str = "file_manager";

/// Commands accepted by the file-edit tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum FileEditCommand {
    /// Read a file (line-numbered) or list a directory.
    View {
        path: String,
        /// Inclusive 1-based line range; `-1` as the end means end of file.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        view_range: Option<(i64, i64)>,
    },
    /// Create a file, overwriting one that already exists.
    Create {
        path: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        file_text: Option<String>,
    },
    /// Replace exactly one occurrence of `old_str`.
    StrReplace {
        path: String,
        old_str: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        new_str: Option<String>,
    },
    /// Insert text so that it starts at 1-based line `insert_line`.
    Insert {
        path: String,
        insert_line: i64,
        #[serde(alias = "new_content")]
        new_str: String,
    },
}

impl FileEditCommand {
    /// The target path as given by the caller (not yet normalized).
    pub fn path(&self) -> &str {
        match self {
            Self::View { path, .. }
            | Self::Create { path, .. }
            | Self::StrReplace { path, .. }
            | Self::Insert { path, .. } => path,
        }
    }

    /// Command name as it appears on the wire.
    pub fn name(&self) -> &'static str {
        match self {
            Self::View { .. } => "view",
            Self::Create { .. } => "create",
            Self::StrReplace { .. } => "str_replace",
            Self::Insert { .. } => "insert",
        }
    }
}

/// Commands accepted by the file-manager tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum FileManagerCommand {
    /// Move a file or directory (with its subtree) to `new_path`.
    Rename { path: String, new_path: String },
    /// Remove a file or a directory and everything below it.
    Delete { path: String },
}

impl FileManagerCommand {
    /// The source path as given by the caller.
    pub fn path(&self) -> &str {
        match self {
            Self::Rename { path, .. } | Self::Delete { path } => path,
        }
    }

    /// Command name as it appears on the wire.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Rename { .. } => "rename",
            Self::Delete { .. } => "delete",
        }
    }
}

/// An argument bag that did not validate into a command.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ToolCallError {
    #[error("invalid arguments for {tool}: {reason}")]
    InvalidArguments { tool: String, reason: String },
}

impl ToolCallError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidArguments { .. } => ErrorKind::InvalidArguments,
        }
    }
}

/// Result of a tool invocation, as returned to the model loop.
///
/// On the wire this is `{"ok": true, "result": ...}` or
/// `{"ok": false, "errorKind": ..., "message": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "WireOutcome", try_from = "WireOutcome")]
pub enum ToolOutcome {
    Success { result: String },
    Failure { kind: ErrorKind, message: String },
}

impl ToolOutcome {
    /// Create a successful outcome.
    pub fn success(result: impl Into<String>) -> Self {
        Self::Success {
            result: result.into(),
        }
    }

    /// Create a failed outcome.
    pub fn failure(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self::Failure {
            kind,
            message: message.into(),
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// The error kind, if this is a failure.
    pub fn error_kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Success { .. } => None,
            Self::Failure { kind, .. } => Some(*kind),
        }
    }

    /// The result text or the error message.
    pub fn text(&self) -> &str {
        match self {
            Self::Success { result } => result,
            Self::Failure { message, .. } => message,
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireOutcome {
    ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    result: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error_kind: Option<ErrorKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

impl From<ToolOutcome> for WireOutcome {
    fn from(outcome: ToolOutcome) -> Self {
        match outcome {
            ToolOutcome::Success { result } => Self {
                ok: true,
                result: Some(result),
                error_kind: None,
                message: None,
            },
            ToolOutcome::Failure { kind, message } => Self {
                ok: false,
                result: None,
                error_kind: Some(kind),
                message: Some(message),
            },
        }
    }
}

impl TryFrom<WireOutcome> for ToolOutcome {
    type Error = String;

    fn try_from(wire: WireOutcome) -> Result<Self, Self::Error> {
        if wire.ok {
            Ok(Self::success(wire.result.unwrap_or_default()))
        } else {
            let kind = wire
                .error_kind
                .ok_or_else(|| "failed outcome is missing errorKind".to_string())?;
            Ok(Self::failure(kind, wire.message.unwrap_or_default()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn edit(args: serde_json::Value) -> serde_json::Result<FileEditCommand> {
        serde_json::from_value(args)
    }

    #[test]
    fn test_parse_file_edit_commands() {
        let command = edit(json!({"command": "str_replace", "path": "/App.jsx", "old_str": "a", "new_str": "b"}))
            .unwrap();
        assert_eq!(
            command,
            FileEditCommand::StrReplace {
                path: "/App.jsx".into(),
                old_str: "a".into(),
                new_str: Some("b".into()),
            }
        );
        assert_eq!(command.name(), "str_replace");
        assert_eq!(command.path(), "/App.jsx");
    }

    #[test]
    fn test_insert_accepts_new_content_alias() {
        let command = edit(json!({"command": "insert", "path": "/a.js", "insert_line": 2, "new_content": "x"}))
            .unwrap();
        match command {
            FileEditCommand::Insert { new_str, insert_line, .. } => {
                assert_eq!(new_str, "x");
                assert_eq!(insert_line, 2);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_view_range_and_null_optionals() {
        let command = edit(json!({"command": "view", "path": "/", "view_range": [1, -1], "file_text": null}))
            .unwrap();
        assert_eq!(
            command,
            FileEditCommand::View {
                path: "/".into(),
                view_range: Some((1, -1)),
            }
        );
    }

    #[test]
    fn test_missing_or_unknown_command_is_rejected() {
        assert!(edit(json!({"command": "str_replace", "path": "/a.js"})).is_err());
        let manager: serde_json::Result<FileManagerCommand> =
            serde_json::from_value(json!({"command": "chmod", "path": "/a"}));
        assert!(manager.is_err());

        let err = ToolCallError::InvalidArguments {
            tool: FILE_EDIT_TOOL.into(),
            reason: "missing field `old_str`".into(),
        };
        assert_eq!(err.kind(), ErrorKind::InvalidArguments);
        assert!(err.to_string().starts_with("invalid arguments for str_replace_editor"));
    }

    #[test]
    fn test_outcome_wire_shape() {
        let ok = serde_json::to_value(ToolOutcome::success("done")).unwrap();
        assert_eq!(ok, json!({"ok": true, "result": "done"}));

        let err = serde_json::to_value(ToolOutcome::failure(ErrorKind::NotFound, "nope")).unwrap();
        assert_eq!(
            err,
            json!({"ok": false, "errorKind": "NotFound", "message": "nope"})
        );

        let parsed: ToolOutcome = serde_json::from_value(err).unwrap();
        assert_eq!(parsed.error_kind(), Some(ErrorKind::NotFound));
    }

    #[test]
    fn test_failed_outcome_requires_kind() {
        let result: Result<ToolOutcome, _> = serde_json::from_value(json!({"ok": false}));
        assert!(result.is_err());
    }
}
