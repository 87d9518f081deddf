//! Preview configuration.

use serde::{Deserialize, Serialize};

/// Tailwind's browser build, loaded by default so generated components can
/// use utility classes.
pub const TAILWIND_CDN: &str = "https://cdn.tailwindcss.com";

/// How module code is made addressable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleUrls {
    /// Registered in the [`BlobStore`](super::BlobStore); released on dispose.
    #[default]
    Blob,
    /// Inlined as base64 `data:` URLs; the document is self-contained.
    Data,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewConfig {
    /// Document `<title>`.
    pub title: String,

    /// Prefix of generated blob URLs.
    pub blob_origin: String,

    pub module_urls: ModuleUrls,

    /// Extra stylesheet hrefs.
    pub stylesheets: Vec<String>,

    /// Extra classic scripts, loaded before any module.
    pub scripts: Vec<String>,

    /// Element the entry component mounts into.
    pub root_element_id: String,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            title: "Preview".to_string(),
            blob_origin: "blob:uigen-preview".to_string(),
            module_urls: ModuleUrls::Blob,
            stylesheets: Vec::new(),
            scripts: vec![TAILWIND_CDN.to_string()],
            root_element_id: "root".to_string(),
        }
    }
}

impl PreviewConfig {
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_module_urls(mut self, mode: ModuleUrls) -> Self {
        self.module_urls = mode;
        self
    }

    pub fn with_stylesheet(mut self, href: impl Into<String>) -> Self {
        self.stylesheets.push(href.into());
        self
    }

    /// Replace the classic script list.
    pub fn with_scripts<I, S>(mut self, scripts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scripts = scripts.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_root_element_id(mut self, id: impl Into<String>) -> Self {
        self.root_element_id = id.into();
        self
    }
}
