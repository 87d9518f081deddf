//! Module transform pipeline.
//!
//! Turns a [`VfsSnapshot`](crate::vfs::VfsSnapshot) into a runnable
//! [`ModuleSet`]: resolve the entry, transpile every reachable file, rewrite
//! local specifiers to canonical paths and map bare ones to CDN URLs.
//!
//! ```text
//! snapshot ──▶ entry ──▶ transpile ──▶ scan imports ──▶ resolve ──┐
//!                           ▲                                      │
//!                           └────────── next local file ◀──────────┘
//! ```
//!
//! - [`transpile`] - TypeScript erasure and JSX lowering for one file
//! - [`Pipeline`] - Graph walk, error collection, content-hash cache
//! - [`PackageRegistry`] - Bare specifier → URL (pinned versions)

mod cache;
mod config;
mod error;
mod imports;
mod lexer;
mod pipeline;
mod registry;
mod resolve;
pub mod transpile;

pub use cache::{CacheStats, ContentHash};
pub use config::{DEFAULT_CDN, DEFAULT_REACT_VERSION, JsxRuntime, PipelineConfig};
pub use error::{BundleFailure, PipelineError};
pub use imports::{ImportKind, ImportRef};
pub use pipeline::{ModuleId, ModuleRecord, ModuleSet, Pipeline};
pub use registry::{PackageRegistry, PinnedRegistry, split_specifier};
pub use resolve::{Resolution, Resolver, is_local};
pub use transpile::{SourceKind, TranspileError, Transpiled, transpile};

/// Scan transpiled module code for its dependency references.
pub fn scan_imports(code: &str) -> Result<Vec<ImportRef>, TranspileError> {
    imports::scan_imports(code).map_err(|e| {
        let (line, column) = lexer::line_col(code, e.offset);
        TranspileError {
            message: e.message,
            line,
            column,
        }
    })
}
