//! Error types for file tools.
//!
//! These errors go back to the model as failed tool results, so the messages
//! say what to change.

use thiserror::Error;
use uigen_types::{ErrorKind, ToolCallError};

use crate::vfs::VfsError;

/// Errors that can occur while applying a tool command.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ToolError {
    /// The VFS rejected the operation.
    #[error(transparent)]
    Vfs(#[from] VfsError),

    /// The argument bag did not validate.
    #[error(transparent)]
    Call(#[from] ToolCallError),

    /// `old_str` does not occur in the file.
    #[error("old_str not found in {path}. Make sure it matches exactly, including whitespace.")]
    NoMatch { path: String },

    /// `old_str` occurs more than once.
    #[error("old_str found {count} times in {path}. Include more surrounding context to make it unique.")]
    AmbiguousMatch { path: String, count: usize },

    /// Arguments parsed but make no sense.
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),
}

impl ToolError {
    /// Taxonomy kind for the tool outcome.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ToolError::Vfs(e) => e.kind(),
            ToolError::Call(e) => e.kind(),
            ToolError::NoMatch { .. } => ErrorKind::NotFound,
            ToolError::AmbiguousMatch { .. } => ErrorKind::AmbiguousMatch,
            ToolError::InvalidArguments(_) => ErrorKind::InvalidArguments,
        }
    }

    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidArguments(msg.into())
    }
}

/// Result type for tool commands.
pub type Result<T> = std::result::Result<T, ToolError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        assert_eq!(
            ToolError::from(VfsError::not_found("/a")).kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            ToolError::NoMatch { path: "/a".into() }.kind(),
            ErrorKind::NotFound
        );
        let err = ToolError::AmbiguousMatch {
            path: "/a.js".into(),
            count: 2,
        };
        assert_eq!(err.kind(), ErrorKind::AmbiguousMatch);
        assert!(err.to_string().contains("2 times"));
        assert_eq!(
            ToolError::from(ToolCallError::InvalidArguments {
                tool: "file_manager".into(),
                reason: "missing field `path`".into(),
            })
            .kind(),
            ErrorKind::InvalidArguments
        );
    }
}
