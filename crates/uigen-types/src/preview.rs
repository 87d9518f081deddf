//! Preview boundary types.
//!
//! The sandboxed rendering surface receives everything it needs to build its
//! own module-loading context in one message, without calling back into the
//! kernel.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A browser import map (`<script type="importmap">`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportMap {
    /// Specifier → URL.
    pub imports: BTreeMap<String, String>,
}

impl ImportMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a mapping.
    pub fn insert(&mut self, specifier: impl Into<String>, url: impl Into<String>) {
        self.imports.insert(specifier.into(), url.into());
    }

    pub fn get(&self, specifier: &str) -> Option<&str> {
        self.imports.get(specifier).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.imports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.imports.is_empty()
    }

    /// Render as the JSON body of an import-map script tag.
    pub fn to_json(&self) -> String {
        // BTreeMap<String, String> always serializes.
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{\"imports\":{}}".to_string())
    }
}

/// Everything a preview surface needs to load one build of the project.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewManifest {
    /// Module identity of the entry point.
    pub entry: String,
    /// Module identity → executable source.
    pub modules: BTreeMap<String, String>,
    /// Local specifier (as written in module code) → module identity.
    pub local_specifiers: BTreeMap<String, String>,
    /// Bare package specifier → external module URL.
    pub packages: BTreeMap<String, String>,
    /// Collected stylesheet text, in import order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub styles: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_import_map_json() {
        let mut map = ImportMap::new();
        map.insert("react", "https://esm.sh/react@19");
        let json = map.to_json();
        assert!(json.contains("\"imports\""));
        assert!(json.contains("https://esm.sh/react@19"));
        assert_eq!(map.get("react"), Some("https://esm.sh/react@19"));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_manifest_camel_case() {
        let manifest = PreviewManifest {
            entry: "m1".into(),
            ..Default::default()
        };
        let value = serde_json::to_value(&manifest).unwrap();
        assert!(value.get("localSpecifiers").is_some());
        assert!(value.get("styles").is_none());
    }
}
