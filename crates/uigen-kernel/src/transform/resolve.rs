//! Specifier resolution against a VFS snapshot.
//!
//! Local specifiers (`./x`, `../x`, `/x`, `@/x`) resolve to files in the
//! snapshot, case-sensitively: the exact path first, then each configured
//! extension, then `index` plus each extension inside a directory. Bare
//! specifiers belong to the package registry; URLs are left alone.

use crate::vfs::{VfsSnapshot, path};

/// Where a specifier points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// A file in the snapshot, by canonical path.
    Local(String),
    /// A package served from the CDN.
    Package,
    /// A full URL, loaded as written.
    External,
    /// A local specifier with no matching file.
    Unresolved,
}

/// Whether a specifier names a VFS path rather than a package.
pub fn is_local(specifier: &str) -> bool {
    specifier.starts_with("./")
        || specifier.starts_with("../")
        || specifier.starts_with('/')
        || specifier.starts_with("@/")
        || specifier == "."
        || specifier == ".."
}

fn is_url(specifier: &str) -> bool {
    ["http://", "https://", "data:", "blob:"]
        .iter()
        .any(|scheme| specifier.starts_with(scheme))
}

/// The path a local specifier names before extension inference.
fn base_path(specifier: &str, importer: &str) -> Option<String> {
    if let Some(rest) = specifier.strip_prefix("@/") {
        return path::resolve_relative(path::ROOT, rest);
    }
    let dir = path::parent(importer).unwrap_or(path::ROOT);
    path::resolve_relative(dir, specifier)
}

pub struct Resolver<'a> {
    snapshot: &'a VfsSnapshot,
    extensions: &'a [String],
}

impl<'a> Resolver<'a> {
    pub fn new(snapshot: &'a VfsSnapshot, extensions: &'a [String]) -> Self {
        Self {
            snapshot,
            extensions,
        }
    }

    /// Resolve `specifier` as written in the file at `importer`.
    pub fn resolve(&self, specifier: &str, importer: &str) -> Resolution {
        if is_url(specifier) {
            return Resolution::External;
        }
        if !is_local(specifier) {
            return Resolution::Package;
        }
        base_path(specifier, importer)
            .and_then(|base| self.find(&base))
            .map_or(Resolution::Unresolved, Resolution::Local)
    }

    /// The first existing candidate for `base`.
    pub fn find(&self, base: &str) -> Option<String> {
        if self.snapshot.is_file(base) {
            return Some(base.to_string());
        }
        let with_ext = self.extensions.iter().map(|ext| format!("{base}{ext}"));
        let index = self
            .extensions
            .iter()
            .map(|ext| path::join(base, &format!("index{ext}")));
        with_ext.chain(index).find(|p| self.snapshot.is_file(p))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exts() -> Vec<String> {
        [".jsx", ".tsx", ".js", ".ts"].map(String::from).to_vec()
    }

    fn snapshot() -> VfsSnapshot {
        VfsSnapshot::from_files([
            ("/App.jsx", ""),
            ("/Button.tsx", ""),
            ("/lib/utils.ts", ""),
            ("/lib/utils.js", ""),
            ("/components/index.jsx", ""),
            ("/data.json", "{}"),
        ])
    }

    #[test]
    fn test_extension_inference_order() {
        let snap = snapshot();
        let exts = exts();
        let r = Resolver::new(&snap, &exts);
        assert_eq!(r.resolve("./Button", "/App.jsx"), Resolution::Local("/Button.tsx".into()));
        assert_eq!(r.resolve("./lib/utils", "/App.jsx"), Resolution::Local("/lib/utils.js".into()));
        assert_eq!(r.resolve("./components", "/App.jsx"), Resolution::Local("/components/index.jsx".into()));
        assert_eq!(r.resolve("../data.json", "/lib/utils.ts"), Resolution::Local("/data.json".into()));
    }

    #[test]
    fn test_aliases_and_absolute() {
        let snap = snapshot();
        let exts = exts();
        let r = Resolver::new(&snap, &exts);
        assert_eq!(r.resolve("@/lib/utils.ts", "/components/index.jsx"), Resolution::Local("/lib/utils.ts".into()));
        assert_eq!(r.resolve("/Button", "/lib/utils.ts"), Resolution::Local("/Button.tsx".into()));
    }

    #[test]
    fn test_case_sensitive_and_missing() {
        let snap = snapshot();
        let exts = exts();
        let r = Resolver::new(&snap, &exts);
        assert_eq!(r.resolve("./button", "/App.jsx"), Resolution::Unresolved);
        assert_eq!(r.resolve("./Missing", "/App.jsx"), Resolution::Unresolved);
        assert_eq!(r.resolve("../../x", "/App.jsx"), Resolution::Unresolved);
    }

    #[test]
    fn test_non_local() {
        let snap = snapshot();
        let exts = exts();
        let r = Resolver::new(&snap, &exts);
        assert_eq!(r.resolve("react", "/App.jsx"), Resolution::Package);
        assert_eq!(r.resolve("@radix-ui/react-slot", "/App.jsx"), Resolution::Package);
        assert_eq!(r.resolve("https://esm.sh/x", "/App.jsx"), Resolution::External);
    }
}
