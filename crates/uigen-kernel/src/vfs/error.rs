//! VFS error types.

use thiserror::Error;
use uigen_types::ErrorKind;

/// VFS error type.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum VfsError {
    /// A path segment is empty, `.` or `..`, the path is not absolute, or the
    /// operation is not allowed on this path (e.g. deleting the root).
    #[error("invalid path {path:?}: {reason}")]
    InvalidPath { path: String, reason: String },

    /// File or directory not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Expected a directory.
    #[error("not a directory: {0}")]
    NotADirectory(String),

    /// Destination occupied, or occupied by a node of the other type.
    #[error("path conflict: {0}")]
    PathConflict(String),

    /// A persisted tree could not be loaded. The active tree is untouched.
    #[error("cannot load tree: {0}")]
    Deserialize(String),
}

impl VfsError {
    /// Create an InvalidPath error.
    pub fn invalid_path(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidPath {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a NotFound error.
    pub fn not_found(path: impl Into<String>) -> Self {
        Self::NotFound(path.into())
    }

    /// Create a NotADirectory error.
    pub fn not_a_directory(path: impl Into<String>) -> Self {
        Self::NotADirectory(path.into())
    }

    /// Create a PathConflict error.
    pub fn path_conflict(path: impl Into<String>) -> Self {
        Self::PathConflict(path.into())
    }

    /// Create a Deserialize error.
    pub fn deserialize(msg: impl Into<String>) -> Self {
        Self::Deserialize(msg.into())
    }

    /// Taxonomy kind for the tool boundary.
    pub fn kind(&self) -> ErrorKind {
        match self {
            VfsError::InvalidPath { .. } => ErrorKind::InvalidPath,
            VfsError::NotFound(_) => ErrorKind::NotFound,
            VfsError::NotADirectory(_) => ErrorKind::NotADirectory,
            VfsError::PathConflict(_) => ErrorKind::PathConflict,
            VfsError::Deserialize(_) => ErrorKind::DeserializeError,
        }
    }
}

/// VFS result type.
pub type VfsResult<T> = Result<T, VfsError>;
