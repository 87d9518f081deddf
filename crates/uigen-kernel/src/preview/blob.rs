//! In-process object-URL table.
//!
//! Plays the role of the browser's blob URL registry: each module's code is
//! registered under a fresh URL, the sandboxed surface dereferences URLs
//! through [`BlobStore::fetch`], and disposal revokes them.

use std::sync::Arc;

use dashmap::DashMap;
use tracing::trace;

/// MIME type of module blobs.
pub const JAVASCRIPT_MIME: &str = "text/javascript";

/// Registered content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    pub mime: String,
    pub content: Arc<str>,
}

/// Thread-safe URL → blob table.
#[derive(Debug)]
pub struct BlobStore {
    origin: String,
    blobs: DashMap<String, Blob>,
}

impl BlobStore {
    /// URLs look like `{origin}/{uuid}`.
    pub fn new(origin: impl Into<String>) -> Self {
        Self {
            origin: origin.into().trim_end_matches('/').to_string(),
            blobs: DashMap::new(),
        }
    }

    /// Register content and return its URL.
    pub fn create(&self, content: impl Into<Arc<str>>, mime: &str) -> String {
        let url = format!("{}/{}", self.origin, uuid::Uuid::new_v4());
        self.blobs.insert(
            url.clone(),
            Blob {
                mime: mime.to_string(),
                content: content.into(),
            },
        );
        trace!(url = %url, "blob created");
        url
    }

    pub fn fetch(&self, url: &str) -> Option<Blob> {
        self.blobs.get(url).map(|b| b.value().clone())
    }

    /// Release a URL. Returns whether it was live.
    pub fn revoke(&self, url: &str) -> bool {
        self.blobs.remove(url).is_some()
    }

    pub fn contains(&self, url: &str) -> bool {
        self.blobs.contains_key(url)
    }

    /// Number of live URLs.
    pub fn len(&self) -> usize {
        self.blobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.is_empty()
    }
}

impl Default for BlobStore {
    fn default() -> Self {
        Self::new("blob:uigen-preview")
    }
}
