//! The shared error taxonomy.
//!
//! Every layer has its own rich error enum, but they all collapse onto one of
//! these kinds when crossing a boundary. The string form is the PascalCase
//! variant name and is what the tool loop sees in `errorKind`.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

/// Kind of failure, independent of which component produced it.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Display, AsRefStr, EnumString,
)]
#[strum(ascii_case_insensitive)]
pub enum ErrorKind {
    /// A path segment is empty, `.` or `..`, or the operation targets the root.
    InvalidPath,
    /// The path (or the searched text) does not exist.
    NotFound,
    /// A directory was required but something else was found.
    NotADirectory,
    /// The destination is occupied, or occupied by the wrong node type.
    PathConflict,
    /// `str_replace` found the old text more than once.
    AmbiguousMatch,
    /// A relative import could not be matched to any file.
    UnresolvedImport,
    /// A single file failed to transpile.
    TransformError,
    /// A persisted tree could not be loaded.
    DeserializeError,
    /// The tool argument bag is malformed.
    InvalidArguments,
    /// No tool is registered under the requested name.
    UnknownTool,
    /// No entry module could be found.
    NoEntryPoint,
}

impl ErrorKind {
    /// Parse from string (case-insensitive).
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        <Self as FromStr>::from_str(s).ok()
    }

    /// Whether a model can reasonably retry the same tool with corrected
    /// arguments.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, ErrorKind::DeserializeError | ErrorKind::UnknownTool)
    }
}
