//! Pipeline configuration.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Default CDN serving ES modules for bare package specifiers.
pub const DEFAULT_CDN: &str = "https://esm.sh";

/// Version pinned for `react` and `react-dom` unless configured otherwise.
pub const DEFAULT_REACT_VERSION: &str = "19.1.0";

/// How JSX elements are lowered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum JsxRuntime {
    /// `_jsx(type, props, key)` imported from `{import_source}/jsx-runtime`.
    Automatic { import_source: String },
    /// `pragma(type, props, ...children)` with the pragma in scope.
    Classic { pragma: String, pragma_frag: String },
}

impl Default for JsxRuntime {
    fn default() -> Self {
        Self::Automatic {
            import_source: "react".to_string(),
        }
    }
}

impl JsxRuntime {
    /// Bare specifier the generated code imports, if any.
    pub fn runtime_specifier(&self) -> Option<String> {
        match self {
            Self::Automatic { import_source } => Some(format!("{import_source}/jsx-runtime")),
            Self::Classic { .. } => None,
        }
    }
}

/// Configuration for [`Pipeline`](super::Pipeline).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Base URL bare specifiers are rewritten against.
    pub cdn_base_url: String,

    /// Package name → version. Unlisted packages resolve unversioned.
    pub packages: BTreeMap<String, String>,

    /// Files tried in order when no entry point is given.
    pub entry_candidates: Vec<String>,

    /// Extensions tried, in order, for extensionless local specifiers.
    pub resolve_extensions: Vec<String>,

    pub jsx_runtime: JsxRuntime,

    /// Reuse transpiled output for unchanged file contents.
    pub cache: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        let packages = ["react", "react-dom"]
            .into_iter()
            .map(|name| (name.to_string(), DEFAULT_REACT_VERSION.to_string()))
            .collect();
        Self {
            cdn_base_url: DEFAULT_CDN.to_string(),
            packages,
            entry_candidates: [
                "/App.jsx",
                "/App.tsx",
                "/index.jsx",
                "/index.tsx",
                "/src/App.jsx",
                "/src/App.tsx",
            ]
            .map(String::from)
            .to_vec(),
            resolve_extensions: [".jsx", ".tsx", ".js", ".ts"].map(String::from).to_vec(),
            jsx_runtime: JsxRuntime::default(),
            cache: true,
        }
    }
}

impl PipelineConfig {
    pub fn with_cdn_base_url(mut self, url: impl Into<String>) -> Self {
        self.cdn_base_url = url.into();
        self
    }

    /// Pin a package version.
    pub fn with_package(mut self, name: impl Into<String>, version: impl Into<String>) -> Self {
        self.packages.insert(name.into(), version.into());
        self
    }

    pub fn with_entry_candidates<I, S>(mut self, candidates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.entry_candidates = candidates.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_jsx_runtime(mut self, runtime: JsxRuntime) -> Self {
        self.jsx_runtime = runtime;
        self
    }

    pub fn with_cache(mut self, enabled: bool) -> Self {
        self.cache = enabled;
        self
    }
}
