//! Kernel configuration.
//!
//! One TOML document configures a session:
//!
//! ```toml
//! [pipeline]
//! cdn_base_url = "https://esm.sh"
//! cache = true
//!
//! [pipeline.packages]
//! react = "19.1.0"
//! react-dom = "19.1.0"
//!
//! [pipeline.jsx_runtime]
//! mode = "automatic"
//! import_source = "react"
//!
//! [preview]
//! title = "Preview"
//! module_urls = "blob"
//! ```
//!
//! Every field is optional; missing ones take their defaults.

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::preview::PreviewConfig;
use crate::transform::PipelineConfig;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KernelConfig {
    pub pipeline: PipelineConfig,
    pub preview: PreviewConfig,
}

impl KernelConfig {
    /// Parse a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Read and parse a TOML file.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::from_toml_str(&text)
            .with_context(|| format!("failed to parse config {}", path.display()))
    }

    /// Render as TOML.
    pub fn to_toml_string(&self) -> anyhow::Result<String> {
        toml::to_string_pretty(self).context("failed to serialize config")
    }

    pub fn with_pipeline(mut self, pipeline: PipelineConfig) -> Self {
        self.pipeline = pipeline;
        self
    }

    pub fn with_preview(mut self, preview: PreviewConfig) -> Self {
        self.preview = preview;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preview::ModuleUrls;
    use crate::transform::JsxRuntime;
    use std::io::Write;

    #[test]
    fn test_empty_document_is_default() {
        assert_eq!(KernelConfig::from_toml_str("").unwrap(), KernelConfig::default());
    }

    #[test]
    fn test_partial_document() {
        let config = KernelConfig::from_toml_str(
            r#"
[pipeline]
cache = false

[pipeline.packages]
zustand = "5.0.0"

[pipeline.jsx_runtime]
mode = "classic"
pragma = "h"
pragma_frag = "Fragment"

[preview]
module_urls = "data"
"#,
        )
        .unwrap();
        assert!(!config.pipeline.cache);
        assert_eq!(config.pipeline.packages.get("zustand").map(String::as_str), Some("5.0.0"));
        assert!(!config.pipeline.packages.contains_key("react"));
        assert!(matches!(config.pipeline.jsx_runtime, JsxRuntime::Classic { .. }));
        assert_eq!(config.preview.module_urls, ModuleUrls::Data);
        assert_eq!(config.preview.root_element_id, "root");
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[preview]\ntitle = \"Demo\"").unwrap();
        let config = KernelConfig::load(file.path()).unwrap();
        assert_eq!(config.preview.title, "Demo");

        let err = KernelConfig::load(file.path().with_extension("missing")).unwrap_err();
        assert!(err.to_string().contains("failed to read config"));
    }

    #[test]
    fn test_toml_round_trip() {
        let config = KernelConfig::default();
        let text = config.to_toml_string().unwrap();
        assert_eq!(KernelConfig::from_toml_str(&text).unwrap(), config);
    }
}
