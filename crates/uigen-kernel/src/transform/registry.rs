//! Bare package specifier → external module URL.
//!
//! The pipeline does not own package versions. It asks a [`PackageRegistry`]
//! for the URL of every bare specifier it meets and records the answer in the
//! import map.

use std::collections::BTreeMap;

/// Package names whose instances must be shared across every CDN module.
const SHARED_PACKAGES: &[&str] = &["react", "react-dom"];

/// Maps bare specifiers to CDN URLs.
pub trait PackageRegistry: Send + Sync {
    /// Pinned version of `package`, if any.
    fn version(&self, package: &str) -> Option<&str>;

    /// URL for a bare specifier such as `react-dom/client`.
    fn url(&self, specifier: &str) -> String;
}

/// Split a bare specifier into package name and subpath.
///
/// `@scope/pkg/sub` → (`@scope/pkg`, `/sub`); `lodash` → (`lodash`, ``).
pub fn split_specifier(specifier: &str) -> (&str, &str) {
    let name_segments = if specifier.starts_with('@') { 2 } else { 1 };
    let mut slashes = specifier.match_indices('/').map(|(i, _)| i);
    match slashes.nth(name_segments - 1) {
        Some(i) => specifier.split_at(i),
        None => (specifier, ""),
    }
}

/// A registry backed by a fixed name → version table and one CDN base URL,
/// in the URL layout esm.sh serves.
#[derive(Debug, Clone)]
pub struct PinnedRegistry {
    base_url: String,
    versions: BTreeMap<String, String>,
}

impl PinnedRegistry {
    pub fn new(base_url: impl Into<String>, versions: BTreeMap<String, String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url, versions }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `deps=` pins for shared packages, so that a third-party component
    /// library and the app load the same React.
    fn shared_deps(&self, package: &str) -> Option<String> {
        let deps: Vec<String> = SHARED_PACKAGES
            .iter()
            .filter(|&&shared| shared != package)
            .filter_map(|&shared| Some(format!("{shared}@{}", self.versions.get(shared)?)))
            .collect();
        (!deps.is_empty()).then(|| deps.join(","))
    }
}

impl PackageRegistry for PinnedRegistry {
    fn version(&self, package: &str) -> Option<&str> {
        self.versions.get(package).map(String::as_str)
    }

    fn url(&self, specifier: &str) -> String {
        let (package, subpath) = split_specifier(specifier);
        let mut url = match self.version(package) {
            Some(version) => format!("{}/{package}@{version}{subpath}", self.base_url),
            None => format!("{}/{package}{subpath}", self.base_url),
        };
        if package != "react" && !subpath.ends_with(".css") {
            if let Some(deps) = self.shared_deps(package) {
                url.push_str("?deps=");
                url.push_str(&deps);
            }
        }
        url
    }
}
