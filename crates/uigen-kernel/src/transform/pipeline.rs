//! The module transform pipeline.
//!
//! `run` walks the import graph breadth-first from the entry file. Each
//! reachable source file is transpiled (through the content-hash cache), its
//! imports are scanned and resolved, and local specifiers are rewritten to
//! canonical VFS paths. Bare specifiers stay in the code and are mapped to
//! CDN URLs through the import map. Stylesheet imports are lifted out of the
//! code into an ordered style list.
//!
//! Errors do not stop the walk: every problem in the reachable graph is
//! collected, and any error rejects the build as a whole. A file that fails
//! to transform still has its imports followed, found leniently in the raw
//! source.

use std::collections::{BTreeMap, HashSet, VecDeque};
use std::sync::Arc;

use indexmap::IndexMap;
use tracing::{debug, info, warn};
use uigen_types::PreviewManifest;

use crate::vfs::{VfsSnapshot, path};

use super::cache::{CacheStats, ContentHash, TranspileCache};
use super::config::PipelineConfig;
use super::error::{BundleFailure, PipelineError};
use super::imports::{Edit, ImportKind, ImportRef, apply_edits, quote, sniff_specifiers};
use super::scan_imports;
use super::registry::{PackageRegistry, PinnedRegistry};
use super::resolve::{Resolution, Resolver};
use super::transpile::{SourceKind, TranspileError, Transpiled, transpile};

/// Load-time identity of a module: file stem plus a short hash of its
/// canonical path. Stable across edits to the file's content.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModuleId(String);

impl ModuleId {
    pub fn for_path(source_path: &str) -> Self {
        let name = path::file_name(source_path);
        let stem = name.split('.').next().filter(|s| !s.is_empty()).unwrap_or("module");
        let digest = ContentHash::of_text(source_path);
        Self(format!("{stem}-{}", digest.short(8)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ModuleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One transformed module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleRecord {
    pub id: ModuleId,
    pub source_path: String,
    /// Executable code with local specifiers rewritten.
    pub code: String,
    /// Hash of the transform inputs, the cache key.
    pub content_hash: ContentHash,
    /// Specifier as written → canonical path (local) or URL (package).
    pub imports: BTreeMap<String, String>,
}

/// A complete, runnable build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleSet {
    revision: u64,
    entry: String,
    modules: IndexMap<String, ModuleRecord>,
    packages: BTreeMap<String, String>,
    styles: Vec<String>,
}

impl ModuleSet {
    /// Snapshot revision this build came from.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Canonical path of the entry file.
    pub fn entry_path(&self) -> &str {
        &self.entry
    }

    pub fn entry(&self) -> Option<&ModuleRecord> {
        self.modules.get(&self.entry)
    }

    pub fn get(&self, source_path: &str) -> Option<&ModuleRecord> {
        self.modules.get(source_path)
    }

    /// Modules in breadth-first order from the entry.
    pub fn modules(&self) -> impl Iterator<Item = &ModuleRecord> {
        self.modules.values()
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Bare specifier → CDN URL.
    pub fn packages(&self) -> &BTreeMap<String, String> {
        &self.packages
    }

    /// Stylesheet text in import order.
    pub fn styles(&self) -> &[String] {
        &self.styles
    }

    /// Specifiers a module may use for each local module: the canonical
    /// path and the path without its extension (`/components/index.jsx`
    /// also answers to `/components`). On collision the module met first
    /// keeps the alias.
    pub fn local_specifiers(&self) -> BTreeMap<String, ModuleId> {
        let mut out = BTreeMap::new();
        for record in self.modules.values() {
            out.insert(record.source_path.clone(), record.id.clone());
        }
        for record in self.modules.values() {
            for alias in aliases(&record.source_path) {
                out.entry(alias).or_insert_with(|| record.id.clone());
            }
        }
        out
    }

    /// The preview-boundary view of this build.
    pub fn manifest(&self) -> PreviewManifest {
        PreviewManifest {
            entry: self
                .entry()
                .map(|m| m.id.to_string())
                .unwrap_or_default(),
            modules: self
                .modules
                .values()
                .map(|m| (m.id.to_string(), m.code.clone()))
                .collect(),
            local_specifiers: self
                .local_specifiers()
                .into_iter()
                .map(|(spec, id)| (spec, id.to_string()))
                .collect(),
            packages: self.packages.clone(),
            styles: self.styles.clone(),
        }
    }
}

fn aliases(source_path: &str) -> Vec<String> {
    let mut out = Vec::new();
    if let Some(ext) = path::extension(source_path) {
        let stripped = &source_path[..source_path.len() - ext.len()];
        out.push(stripped.to_string());
        if path::file_name(stripped) == "index" {
            if let Some(dir) = path::parent(stripped).filter(|d| *d != path::ROOT) {
                out.push(dir.to_string());
            }
        }
    }
    out
}

/// What a resolved local file becomes.
enum Asset {
    Source(SourceKind),
    Json,
    Css,
    Text,
}

fn asset_kind(source_path: &str) -> Asset {
    if let Some(kind) = SourceKind::from_path(source_path) {
        return Asset::Source(kind);
    }
    match path::extension(source_path) {
        Some(".json") => Asset::Json,
        Some(".css") => Asset::Css,
        _ => Asset::Text,
    }
}

fn is_css(specifier: &str) -> bool {
    specifier
        .split(['?', '#'])
        .next()
        .is_some_and(|s| s.ends_with(".css"))
}

/// Code left in place of a stylesheet import.
fn css_placeholder(import: &ImportRef) -> &'static str {
    match import.kind {
        ImportKind::Dynamic => "Promise.resolve({})",
        ImportKind::Require => "{}",
        _ => "",
    }
}

/// Queue the dependencies of a file that failed to transform, so errors
/// further down the graph are still reported.
fn follow_raw_imports(build: &mut Build<'_>, source_path: &str, source: &str) {
    if SourceKind::from_path(source_path).is_none() {
        return;
    }
    for specifier in sniff_specifiers(source) {
        match build.resolver.resolve(&specifier, source_path) {
            Resolution::Local(target) if !matches!(asset_kind(&target), Asset::Css) => build.enqueue(&target),
            Resolution::Unresolved => build.errors.push(PipelineError::unresolved(&specifier, source_path)),
            _ => {}
        }
    }
}

/// Mutable state of one run.
struct Build<'a> {
    snapshot: &'a VfsSnapshot,
    resolver: Resolver<'a>,
    queue: VecDeque<String>,
    seen: HashSet<String>,
    modules: IndexMap<String, ModuleRecord>,
    packages: BTreeMap<String, String>,
    styles: Vec<String>,
    seen_styles: HashSet<String>,
    errors: Vec<PipelineError>,
}

impl Build<'_> {
    fn enqueue(&mut self, source_path: &str) {
        if self.seen.insert(source_path.to_string()) {
            self.queue.push_back(source_path.to_string());
        }
    }

    fn add_style(&mut self, key: &str, text: String) {
        if self.seen_styles.insert(key.to_string()) {
            self.styles.push(text);
        }
    }
}

/// Transforms VFS snapshots into runnable module sets.
pub struct Pipeline {
    config: PipelineConfig,
    registry: Arc<dyn PackageRegistry>,
    cache: TranspileCache,
}

impl Pipeline {
    /// A pipeline resolving packages through the configured pins and CDN.
    pub fn new(config: PipelineConfig) -> Self {
        let registry = PinnedRegistry::new(config.cdn_base_url.clone(), config.packages.clone());
        Self::with_registry(config, Arc::new(registry))
    }

    pub fn with_registry(config: PipelineConfig, registry: Arc<dyn PackageRegistry>) -> Self {
        Self {
            config,
            registry,
            cache: TranspileCache::new(),
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn registry(&self) -> &dyn PackageRegistry {
        self.registry.as_ref()
    }

    /// The registry, for components that map the same packages.
    pub fn shared_registry(&self) -> Arc<dyn PackageRegistry> {
        Arc::clone(&self.registry)
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// The entry file used when none is requested: the first configured
    /// candidate that exists, else the first source file in creation order.
    pub fn discover_entry(&self, snapshot: &VfsSnapshot) -> Option<String> {
        self.config
            .entry_candidates
            .iter()
            .find(|candidate| snapshot.is_file(candidate))
            .cloned()
            .or_else(|| {
                snapshot
                    .iter()
                    .map(|(p, _)| p)
                    .find(|p| SourceKind::from_path(p).is_some())
                    .map(str::to_string)
            })
    }

    /// Build the module graph reachable from `entry` (or the discovered
    /// entry). The result depends only on the snapshot's files and the
    /// entry.
    #[tracing::instrument(skip(self, snapshot), fields(revision = snapshot.revision(), files = snapshot.len()))]
    pub fn run(&self, snapshot: &VfsSnapshot, entry: Option<&str>) -> Result<ModuleSet, BundleFailure> {
        let requested = entry.map(path::normalize);
        let entry = match &requested {
            Some(p) => Some(p.clone()).filter(|p| snapshot.is_file(p)),
            None => self.discover_entry(snapshot),
        };
        let Some(entry) = entry else {
            warn!(requested = ?requested, "no entry point");
            return Err(BundleFailure {
                revision: snapshot.revision(),
                entry: None,
                errors: vec![PipelineError::NoEntryPoint { requested }],
            });
        };

        let mut build = Build {
            snapshot,
            resolver: Resolver::new(snapshot, &self.config.resolve_extensions),
            queue: VecDeque::new(),
            seen: HashSet::new(),
            modules: IndexMap::new(),
            packages: BTreeMap::new(),
            styles: Vec::new(),
            seen_styles: HashSet::new(),
            errors: Vec::new(),
        };
        build.enqueue(&entry);

        while let Some(source_path) = build.queue.pop_front() {
            let Some(source) = snapshot.get(&source_path) else {
                continue;
            };
            match self.module(&mut build, &source_path, source) {
                Ok(record) => {
                    debug!(path = %source_path, id = %record.id, imports = record.imports.len(), "module built");
                    build.modules.insert(source_path, record);
                }
                Err(error) => {
                    debug!(path = %source_path, error = %error, "module failed");
                    build.errors.push(PipelineError::transform(&source_path, error));
                    follow_raw_imports(&mut build, &source_path, source);
                }
            }
        }

        if self.config.cache {
            self.cache.prune();
        }

        if !build.errors.is_empty() {
            warn!(entry = %entry, errors = build.errors.len(), "build rejected");
            return Err(BundleFailure {
                revision: snapshot.revision(),
                entry: Some(entry),
                errors: build.errors,
            });
        }

        info!(entry = %entry, modules = build.modules.len(), packages = build.packages.len(), "build complete");
        Ok(ModuleSet {
            revision: snapshot.revision(),
            entry,
            modules: build.modules,
            packages: build.packages,
            styles: build.styles,
        })
    }

    fn transpile_cached(&self, kind: SourceKind, source: &str, key: &ContentHash) -> Result<Transpiled, TranspileError> {
        let compute = || transpile(source, kind, &self.config.jsx_runtime);
        if self.config.cache {
            self.cache.get_or_insert_with(key, compute)
        } else {
            compute()
        }
    }

    /// Transform one file and queue its local dependencies. Unresolved
    /// imports are recorded on the build; the module itself still succeeds.
    fn module(&self, build: &mut Build<'_>, source_path: &str, source: &str) -> Result<ModuleRecord, TranspileError> {
        let runtime = &self.config.jsx_runtime;
        let (code, content_hash) = match asset_kind(source_path) {
            Asset::Source(kind) => {
                let key = ContentHash::compute(kind, runtime, source);
                (self.transpile_cached(kind, source, &key)?.code, key)
            }
            Asset::Json => {
                let value: serde_json::Value = serde_json::from_str(source).map_err(|e| TranspileError {
                    message: format!("Invalid JSON: {e}"),
                    line: e.line(),
                    column: e.column(),
                })?;
                (format!("export default {value};\n"), ContentHash::of_text(source))
            }
            Asset::Css | Asset::Text => {
                (format!("export default {};\n", quote(source)), ContentHash::of_text(source))
            }
        };

        let found = scan_imports(&code)?;

        let mut edits = Vec::new();
        let mut imports = BTreeMap::new();
        for import in &found {
            match build.resolver.resolve(&import.specifier, source_path) {
                Resolution::Local(target) => {
                    if matches!(asset_kind(&target), Asset::Css) {
                        let text = build.snapshot.get(&target).unwrap_or_default().to_string();
                        build.add_style(&target, text);
                        edits.push(Edit::new(import.statement.clone(), css_placeholder(import)));
                        imports.insert(import.specifier.clone(), target);
                        continue;
                    }
                    edits.push(Edit::new(import.literal.clone(), quote(&target)));
                    imports.insert(import.specifier.clone(), target.clone());
                    build.enqueue(&target);
                }
                Resolution::Package if is_css(&import.specifier) => {
                    let url = self.registry.url(&import.specifier);
                    build.add_style(&url, format!("@import url({});", quote(&url)));
                    edits.push(Edit::new(import.statement.clone(), css_placeholder(import)));
                    imports.insert(import.specifier.clone(), url);
                }
                Resolution::Package => {
                    let url = self.registry.url(&import.specifier);
                    build.packages.insert(import.specifier.clone(), url.clone());
                    imports.insert(import.specifier.clone(), url);
                }
                Resolution::External => {}
                Resolution::Unresolved => {
                    build
                        .errors
                        .push(PipelineError::unresolved(&import.specifier, source_path));
                }
            }
        }

        Ok(ModuleRecord {
            id: ModuleId::for_path(source_path),
            source_path: source_path.to_string(),
            code: apply_edits(&code, &mut edits),
            content_hash,
            imports,
        })
    }
}
