//! Pipeline error types.

use std::fmt;

use thiserror::Error;
use uigen_types::ErrorKind;

use super::transpile::TranspileError;

/// One problem found while building the module graph.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PipelineError {
    /// No entry file was given and none could be discovered, or the given
    /// one does not exist.
    #[error("no entry point{}", .requested.as_deref().map(|r| format!(": {r} does not exist")).unwrap_or_default())]
    NoEntryPoint { requested: Option<String> },

    /// A local specifier matched no file.
    #[error("cannot resolve import {specifier:?} from {importer}")]
    UnresolvedImport { specifier: String, importer: String },

    /// A file failed to transpile.
    #[error("{path}: {error}")]
    Transform { path: String, error: TranspileError },
}

impl PipelineError {
    pub fn unresolved(specifier: impl Into<String>, importer: impl Into<String>) -> Self {
        Self::UnresolvedImport {
            specifier: specifier.into(),
            importer: importer.into(),
        }
    }

    pub fn transform(path: impl Into<String>, error: TranspileError) -> Self {
        Self::Transform {
            path: path.into(),
            error,
        }
    }

    /// Taxonomy kind for the preview error surface.
    pub fn kind(&self) -> ErrorKind {
        match self {
            PipelineError::NoEntryPoint { .. } => ErrorKind::NoEntryPoint,
            PipelineError::UnresolvedImport { .. } => ErrorKind::UnresolvedImport,
            PipelineError::Transform { .. } => ErrorKind::TransformError,
        }
    }

    /// The file the error belongs to.
    pub fn path(&self) -> Option<&str> {
        match self {
            PipelineError::NoEntryPoint { requested } => requested.as_deref(),
            PipelineError::UnresolvedImport { importer, .. } => Some(importer),
            PipelineError::Transform { path, .. } => Some(path),
        }
    }
}

/// A rejected build: every error found across the reachable graph, in
/// breadth-first order from the entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleFailure {
    /// Snapshot revision the build ran against.
    pub revision: u64,
    pub entry: Option<String>,
    pub errors: Vec<PipelineError>,
}

impl BundleFailure {
    /// Errors of one kind.
    pub fn of_kind(&self, kind: ErrorKind) -> impl Iterator<Item = &PipelineError> {
        self.errors.iter().filter(move |e| e.kind() == kind)
    }
}

impl fmt::Display for BundleFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "build failed with {} error(s)", self.errors.len())?;
        for error in &self.errors {
            write!(f, "\n  {error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for BundleFailure {}
