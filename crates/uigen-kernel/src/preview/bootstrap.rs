//! PreviewBootstrapper: one fresh loadable unit per render.
//!
//! Every materialization registers new module URLs and a new document; the
//! previous unit's URLs are revoked first, so nothing of an older generation
//! can be reached once a newer one exists.

use std::collections::BTreeMap;
use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use parking_lot::Mutex;
use tracing::{debug, info, warn};
use uigen_types::{ImportMap, PreviewId, PreviewManifest};

use crate::transform::{BundleFailure, ModuleSet, PackageRegistry};

use super::blob::{BlobStore, JAVASCRIPT_MIME};
use super::config::{ModuleUrls, PreviewConfig};
use super::html::{Document, bootstrap_module, render_document, render_error};

/// Packages the bootstrap module itself imports.
const BOOTSTRAP_PACKAGES: &[&str] = &["react", "react-dom/client"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewStatus {
    /// A runnable document.
    Ready,
    /// An error surface for a rejected build.
    Failed,
}

/// One materialized preview unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewHandle {
    id: PreviewId,
    revision: u64,
    status: PreviewStatus,
    html: String,
    import_map: ImportMap,
    entry_url: Option<String>,
    urls: Vec<String>,
}

impl PreviewHandle {
    pub fn id(&self) -> PreviewId {
        self.id
    }

    /// Snapshot revision the unit was built from.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn status(&self) -> PreviewStatus {
        self.status
    }

    pub fn is_ready(&self) -> bool {
        self.status == PreviewStatus::Ready
    }

    /// The document the sandboxed frame loads.
    pub fn html(&self) -> &str {
        &self.html
    }

    pub fn import_map(&self) -> &ImportMap {
        &self.import_map
    }

    /// URL of the entry module.
    pub fn entry_url(&self) -> Option<&str> {
        self.entry_url.as_deref()
    }

    /// Blob URLs owned by this unit.
    pub fn urls(&self) -> &[String] {
        &self.urls
    }
}

/// Live resources of the current unit.
struct Live {
    id: PreviewId,
    urls: Vec<String>,
}

/// Materializes module sets into preview units.
pub struct PreviewBootstrapper {
    config: PreviewConfig,
    registry: Arc<dyn PackageRegistry>,
    blobs: Arc<BlobStore>,
    current: Mutex<Option<Live>>,
}

impl PreviewBootstrapper {
    pub fn new(config: PreviewConfig, registry: Arc<dyn PackageRegistry>) -> Self {
        let blobs = Arc::new(BlobStore::new(config.blob_origin.clone()));
        Self::with_blob_store(config, registry, blobs)
    }

    /// Share a blob table with the surface that dereferences the URLs.
    pub fn with_blob_store(
        config: PreviewConfig,
        registry: Arc<dyn PackageRegistry>,
        blobs: Arc<BlobStore>,
    ) -> Self {
        Self {
            config,
            registry,
            blobs,
            current: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &PreviewConfig {
        &self.config
    }

    pub fn blob_store(&self) -> &Arc<BlobStore> {
        &self.blobs
    }

    /// Id of the unit currently holding resources.
    pub fn current(&self) -> Option<PreviewId> {
        self.current.lock().as_ref().map(|live| live.id)
    }

    fn module_url(&self, code: &str) -> (String, bool) {
        match self.config.module_urls {
            ModuleUrls::Blob => (self.blobs.create(code, JAVASCRIPT_MIME), true),
            ModuleUrls::Data => (
                format!("data:{JAVASCRIPT_MIME};base64,{}", STANDARD.encode(code)),
                false,
            ),
        }
    }

    /// Release the current unit's resources and install the new one.
    fn replace_current(&self, next: Live) {
        let mut current = self.current.lock();
        if let Some(previous) = current.take() {
            let released = self.revoke(&previous.urls);
            debug!(preview = %previous.id, released, "previous preview disposed");
        }
        *current = Some(next);
    }

    fn revoke(&self, urls: &[String]) -> usize {
        urls.iter().filter(|url| self.blobs.revoke(url)).count()
    }

    /// Build a runnable unit. Never fails; the previous unit is disposed
    /// before the new one is returned.
    #[tracing::instrument(skip(self, set), fields(revision = set.revision(), modules = set.len()))]
    pub fn materialize(&self, set: &ModuleSet) -> PreviewHandle {
        let manifest = set.manifest();
        let (import_map, entry_url, urls) = self.link(&manifest);

        let entry = entry_url.clone().unwrap_or_else(|| set.entry_path().to_string());
        let bootstrap = bootstrap_module(&entry, &self.config.root_element_id);
        let html = render_document(
            &self.config,
            &Document {
                import_map: &import_map,
                styles: set.styles(),
                bootstrap: &bootstrap,
            },
        );

        let id = PreviewId::new();
        self.replace_current(Live {
            id,
            urls: urls.clone(),
        });
        info!(preview = %id, urls = urls.len(), "preview materialized");

        PreviewHandle {
            id,
            revision: set.revision(),
            status: PreviewStatus::Ready,
            html,
            import_map,
            entry_url,
            urls,
        }
    }

    /// Assign a URL to every module and build the import map: local
    /// specifiers and packages, plus the packages the bootstrap needs.
    fn link(&self, manifest: &PreviewManifest) -> (ImportMap, Option<String>, Vec<String>) {
        let mut owned = Vec::new();
        let mut by_id = BTreeMap::new();
        for (id, code) in &manifest.modules {
            let (url, is_blob) = self.module_url(code);
            if is_blob {
                owned.push(url.clone());
            }
            by_id.insert(id.as_str(), url);
        }

        let mut import_map = ImportMap::new();
        for (specifier, id) in &manifest.local_specifiers {
            if let Some(url) = by_id.get(id.as_str()) {
                import_map.insert(specifier.clone(), url.clone());
            }
        }
        for (specifier, url) in &manifest.packages {
            import_map.insert(specifier.clone(), url.clone());
        }
        for specifier in BOOTSTRAP_PACKAGES {
            if import_map.get(specifier).is_none() {
                import_map.insert(*specifier, self.registry.url(specifier));
            }
        }

        let entry_url = by_id.get(manifest.entry.as_str()).cloned();
        (import_map, entry_url, owned)
    }

    /// Render a rejected build as an error surface. Disposes the previous
    /// unit like [`materialize`](Self::materialize).
    #[tracing::instrument(skip(self, failure), fields(revision = failure.revision, errors = failure.errors.len()))]
    pub fn materialize_failure(&self, failure: &BundleFailure) -> PreviewHandle {
        let id = PreviewId::new();
        self.replace_current(Live {
            id,
            urls: Vec::new(),
        });
        warn!(preview = %id, "showing build errors");

        PreviewHandle {
            id,
            revision: failure.revision,
            status: PreviewStatus::Failed,
            html: render_error(&self.config, failure),
            import_map: ImportMap::new(),
            entry_url: None,
            urls: Vec::new(),
        }
    }

    /// Release everything tied to `handle`. Returns whether anything was
    /// released; disposing twice is harmless.
    pub fn dispose(&self, handle: &PreviewHandle) -> bool {
        let mut current = self.current.lock();
        let was_current = current.as_ref().is_some_and(|live| live.id == handle.id);
        if was_current {
            *current = None;
        }
        let released = self.revoke(&handle.urls);
        debug!(preview = %handle.id, released, "preview disposed");
        released > 0 || was_current
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::{Pipeline, PipelineConfig, PipelineError, PinnedRegistry};
    use crate::vfs::VfsSnapshot;

    fn registry() -> Arc<dyn PackageRegistry> {
        let config = PipelineConfig::default();
        Arc::new(PinnedRegistry::new(config.cdn_base_url, config.packages))
    }

    fn module_set() -> ModuleSet {
        let snap = VfsSnapshot::from_files([
            ("/App.jsx", "import Button from './Button';\nexport default () => <Button />;"),
            ("/Button.jsx", "export default () => <button>hi</button>;"),
        ]);
        Pipeline::new(PipelineConfig::default()).run(&snap, None).unwrap()
    }

    #[test]
    fn test_materialize_registers_modules() {
        let boot = PreviewBootstrapper::new(PreviewConfig::default(), registry());
        let set = module_set();
        let handle = boot.materialize(&set);

        assert!(handle.is_ready());
        assert_eq!(handle.urls().len(), 2);
        assert_eq!(boot.blob_store().len(), 2);
        assert_eq!(boot.current(), Some(handle.id()));

        let button = handle.import_map().get("/Button.jsx").unwrap();
        assert_eq!(handle.import_map().get("/Button"), Some(button));
        let code = boot.blob_store().fetch(button).unwrap();
        assert!(code.content.contains("_jsx(\"button\""));

        assert!(handle.import_map().get("react-dom/client").is_some());
        assert!(handle.html().contains(handle.entry_url().unwrap()));
    }

    #[test]
    fn test_next_materialize_disposes_previous() {
        let boot = PreviewBootstrapper::new(PreviewConfig::default(), registry());
        let set = module_set();
        let first = boot.materialize(&set);
        let second = boot.materialize(&set);

        assert!(first.urls().iter().all(|u| !boot.blob_store().contains(u)));
        assert!(second.urls().iter().all(|u| boot.blob_store().contains(u)));
        assert_eq!(boot.blob_store().len(), 2);
        assert!(!boot.dispose(&first));
    }

    #[test]
    fn test_dispose_is_idempotent() {
        let boot = PreviewBootstrapper::new(PreviewConfig::default(), registry());
        let handle = boot.materialize(&module_set());
        assert!(boot.dispose(&handle));
        assert!(boot.blob_store().is_empty());
        assert_eq!(boot.current(), None);
        assert!(!boot.dispose(&handle));
    }

    #[test]
    fn test_data_urls_hold_no_blobs() {
        let config = PreviewConfig::default().with_module_urls(ModuleUrls::Data);
        let boot = PreviewBootstrapper::new(config, registry());
        let handle = boot.materialize(&module_set());
        assert!(handle.urls().is_empty());
        assert!(boot.blob_store().is_empty());
        let entry = handle.entry_url().unwrap();
        assert!(entry.starts_with("data:text/javascript;base64,"));
    }

    #[test]
    fn test_failure_surface() {
        let boot = PreviewBootstrapper::new(PreviewConfig::default(), registry());
        let ready = boot.materialize(&module_set());
        let failure = BundleFailure {
            revision: 9,
            entry: None,
            errors: vec![PipelineError::NoEntryPoint { requested: None }],
        };
        let handle = boot.materialize_failure(&failure);
        assert_eq!(handle.status(), PreviewStatus::Failed);
        assert_eq!(handle.revision(), 9);
        assert!(handle.html().contains("NoEntryPoint"));
        assert!(ready.urls().iter().all(|u| !boot.blob_store().contains(u)));
    }
}
