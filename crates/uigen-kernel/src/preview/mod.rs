//! Preview bootstrapper.
//!
//! Turns a [`ModuleSet`](crate::transform::ModuleSet) into a self-contained
//! unit a sandboxed frame can load: module URLs, an import map, and an HTML
//! document whose bootstrap module mounts the entry component. A rejected
//! build becomes an error document instead.

mod blob;
mod bootstrap;
mod config;
pub mod html;

pub use blob::{Blob, BlobStore, JAVASCRIPT_MIME};
pub use bootstrap::{PreviewBootstrapper, PreviewHandle, PreviewStatus};
pub use config::{ModuleUrls, PreviewConfig, TAILWIND_CDN};
