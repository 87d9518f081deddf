//! # uigen-kernel
//!
//! Core of the uigen component generator: the model edits files through tool
//! calls, and every settled batch of edits becomes a live preview.
//!
//! A session:
//! - Owns `/` in an in-memory VFS that never touches disk
//! - Applies `str_replace_editor` / `file_manager` tool calls to it, one at a time
//! - Rebuilds the module graph when a turn ends (TypeScript and JSX transpiled,
//!   imports resolved, packages mapped to a CDN)
//! - Publishes a fresh, isolated preview unit per build

pub mod config;
pub mod file_tools;
pub mod preview;
pub mod session;
pub mod tools;
pub mod transform;
pub mod vfs;

pub use config::KernelConfig;
pub use file_tools::{FileEditEngine, FileManagerEngine, ToolError};
pub use preview::{
    BlobStore, ModuleUrls, PreviewBootstrapper, PreviewConfig, PreviewHandle, PreviewStatus,
};
pub use session::{BuildOutcome, PreviewState, ProjectSession, SessionError};
pub use tools::{ToolEngine, ToolInfo, ToolRegistry};
pub use transform::{
    BundleFailure, JsxRuntime, ModuleId, ModuleRecord, ModuleSet, PackageRegistry, Pipeline,
    PipelineConfig, PipelineError, PinnedRegistry, SourceKind, TranspileError, transpile,
};
pub use vfs::{
    ChangeKind, FileNode, SharedVfs, SubscriptionId, VfsError, VfsEvent, VfsResult, VfsSnapshot,
    VirtualFs, shared_vfs,
};
