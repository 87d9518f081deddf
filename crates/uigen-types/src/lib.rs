//! Shared wire types for uigen.
//!
//! Everything in this crate crosses a component boundary and is serialized:
//! the tool-call contract spoken by the external model loop, the flat tree
//! mapping handed to project storage, and the manifest handed to the sandboxed
//! preview surface. It has **no internal uigen dependencies**: a pure leaf
//! crate that the kernel builds on.
//!
//! # Boundaries
//!
//! ```text
//! model loop ──(tool, args)──▶ kernel ──ToolOutcome──▶ model loop
//! storage    ◀─SerializedTree─▶ kernel
//! kernel ──PreviewManifest / ImportMap──▶ preview surface
//! ```
//!
//! |--------------------|-----------------------------------------------|
//! | Type               | Purpose                                       |
//! |--------------------|-----------------------------------------------|
//! | [`ErrorKind`]      | Closed error taxonomy shared by every layer   |
//! | [`FileEditCommand`]| Validated file-edit command (tagged)          |
//! | [`ToolOutcome`]    | `{ok: true, result}` / `{ok: false, ...}`     |
//! | [`SerializedTree`] | Flat path → node mapping for persistence      |
//! | [`PreviewManifest`]| Entry + modules + package URLs for the surface|
//! | [`PreviewId`]      | Identity of one materialized preview unit     |
//! |--------------------|-----------------------------------------------|

pub mod error;
pub mod ids;
pub mod preview;
pub mod snapshot;
pub mod tool;

pub use error::ErrorKind;
pub use ids::PreviewId;
pub use preview::{ImportMap, PreviewManifest};
pub use snapshot::{NodeType, SerializedNode, SerializedTree};
pub use tool::{
    FileEditCommand, FileManagerCommand, ToolCallError, ToolOutcome,
    FILE_EDIT_TOOL, FILE_MANAGER_TOOL,
};
