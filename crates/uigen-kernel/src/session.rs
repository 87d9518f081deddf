//! ProjectSession: one project's VFS, tools, pipeline and preview.
//!
//! A session owns:
//! - The VFS (shared with the tool engines)
//! - The tool registry (`str_replace_editor`, `file_manager`)
//! - The transform pipeline and its content-hash cache
//! - The preview bootstrapper and the published [`PreviewState`]
//!
//! Tool calls apply one at a time. A VFS observer marks the session dirty;
//! [`ProjectSession::end_turn`] is the debounce point that snapshots the tree
//! and rebuilds on a blocking worker. A build is published only if no newer
//! one was requested meanwhile, so stale results are dropped rather than
//! queued.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use parking_lot::Mutex;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, info};
use uigen_types::{SerializedTree, ToolOutcome};

use crate::config::KernelConfig;
use crate::file_tools;
use crate::preview::{PreviewBootstrapper, PreviewHandle};
use crate::tools::{ToolInfo, ToolRegistry};
use crate::transform::{BundleFailure, ModuleSet, Pipeline};
use crate::vfs::{SharedVfs, SubscriptionId, VfsResult, VfsSnapshot, path, shared_vfs};

/// What the preview surface should show.
#[derive(Debug, Clone, Default)]
pub enum PreviewState {
    /// Nothing built yet.
    #[default]
    Empty,
    /// A runnable preview.
    Ready(Arc<PreviewHandle>),
    /// The last build was rejected; the handle renders the errors.
    Failed {
        handle: Arc<PreviewHandle>,
        failure: Arc<BundleFailure>,
    },
}

impl PreviewState {
    pub fn handle(&self) -> Option<&Arc<PreviewHandle>> {
        match self {
            PreviewState::Empty => None,
            PreviewState::Ready(handle) | PreviewState::Failed { handle, .. } => Some(handle),
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, PreviewState::Ready(_))
    }

    /// Revision of the snapshot the shown preview came from.
    pub fn revision(&self) -> Option<u64> {
        self.handle().map(|h| h.revision())
    }
}

/// Result of [`ProjectSession::end_turn`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildOutcome {
    /// Nothing changed since the last build.
    Clean,
    /// A preview for this revision was published.
    Published { revision: u64 },
    /// The build for this revision was discarded for a newer one.
    Superseded { revision: u64 },
}

#[derive(Debug, Error)]
pub enum SessionError {
    /// The build worker panicked or was cancelled.
    #[error("build worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

/// One project's live state.
pub struct ProjectSession {
    vfs: SharedVfs,
    tools: ToolRegistry,
    pipeline: Arc<Pipeline>,
    bootstrapper: Arc<PreviewBootstrapper>,
    entry: Mutex<Option<String>>,
    dirty: Arc<AtomicBool>,
    /// Generation of the most recently requested build.
    requested: AtomicU64,
    /// Serializes publication; holds the last published generation.
    published: Mutex<u64>,
    apply_lock: tokio::sync::Mutex<()>,
    state: watch::Sender<PreviewState>,
    subscription: SubscriptionId,
}

impl std::fmt::Debug for ProjectSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProjectSession")
            .field("revision", &self.vfs.read().revision())
            .field("dirty", &self.dirty.load(Ordering::SeqCst))
            .field("entry", &*self.entry.lock())
            .finish()
    }
}

impl ProjectSession {
    /// A session with an empty VFS.
    pub fn new(config: KernelConfig) -> Self {
        Self::with_vfs(config, shared_vfs())
    }

    /// A session over an existing VFS.
    pub fn with_vfs(config: KernelConfig, vfs: SharedVfs) -> Self {
        let KernelConfig { pipeline, preview } = config;
        let pipeline = Pipeline::new(pipeline);
        let registry = pipeline.shared_registry();
        let bootstrapper = PreviewBootstrapper::new(preview, registry);

        let dirty = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&dirty);
        let subscription = vfs.write().subscribe(Box::new(move |_| {
            flag.store(true, Ordering::SeqCst);
        }));

        let (state, _) = watch::channel(PreviewState::Empty);
        Self {
            tools: file_tools::registry(&vfs),
            vfs,
            pipeline: Arc::new(pipeline),
            bootstrapper: Arc::new(bootstrapper),
            entry: Mutex::new(None),
            dirty,
            requested: AtomicU64::new(0),
            published: Mutex::new(0),
            apply_lock: tokio::sync::Mutex::new(()),
            state,
            subscription,
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn vfs(&self) -> &SharedVfs {
        &self.vfs
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    pub fn bootstrapper(&self) -> &PreviewBootstrapper {
        &self.bootstrapper
    }

    /// Tool descriptions to advertise to the model.
    pub fn tools(&self) -> Vec<ToolInfo> {
        self.tools.list()
    }

    /// Pin the entry file; `None` restores discovery.
    pub fn set_entry(&self, entry: Option<&str>) {
        *self.entry.lock() = entry.map(path::normalize);
        self.dirty.store(true, Ordering::SeqCst);
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::SeqCst)
    }

    /// Current preview state.
    pub fn preview(&self) -> PreviewState {
        self.state.borrow().clone()
    }

    /// Receive every published preview state.
    pub fn subscribe_preview(&self) -> watch::Receiver<PreviewState> {
        self.state.subscribe()
    }

    // ========================================================================
    // Tool calls
    // ========================================================================

    /// Apply one tool call. Calls never interleave: a second call waits for
    /// the first to finish.
    pub async fn apply(&self, tool: &str, args: serde_json::Value) -> ToolOutcome {
        let _guard = self.apply_lock.lock().await;
        self.tools.dispatch(tool, args).await
    }

    // ========================================================================
    // Builds
    // ========================================================================

    /// Snapshot the tree and build, if anything changed since the last build.
    pub async fn end_turn(&self) -> Result<BuildOutcome, SessionError> {
        if !self.dirty.swap(false, Ordering::SeqCst) {
            return Ok(BuildOutcome::Clean);
        }
        self.rebuild().await
    }

    /// Snapshot the tree and build unconditionally.
    #[tracing::instrument(skip(self))]
    pub async fn rebuild(&self) -> Result<BuildOutcome, SessionError> {
        let (snapshot, generation) = self.begin_build();
        let revision = snapshot.revision();
        let entry = self.entry.lock().clone();

        let pipeline = Arc::clone(&self.pipeline);
        let result = tokio::task::spawn_blocking(move || pipeline.run(&snapshot, entry.as_deref())).await?;

        Ok(self.publish(generation, revision, result))
    }

    /// Snapshot the tree and claim a build generation under one read guard,
    /// so generations are ordered like the revisions they build.
    fn begin_build(&self) -> (VfsSnapshot, u64) {
        let vfs = self.vfs.read();
        let generation = self.requested.fetch_add(1, Ordering::SeqCst) + 1;
        (vfs.snapshot(), generation)
    }

    /// Run the pipeline on the calling thread against an explicit snapshot.
    pub fn build(&self, snapshot: &VfsSnapshot) -> Result<ModuleSet, BundleFailure> {
        let entry = self.entry.lock().clone();
        self.pipeline.run(snapshot, entry.as_deref())
    }

    fn publish(
        &self,
        generation: u64,
        revision: u64,
        result: Result<ModuleSet, BundleFailure>,
    ) -> BuildOutcome {
        let mut published = self.published.lock();
        if generation != self.requested.load(Ordering::SeqCst) || generation <= *published {
            debug!(revision, generation, "build superseded");
            return BuildOutcome::Superseded { revision };
        }
        *published = generation;

        let state = match result {
            Ok(set) => PreviewState::Ready(Arc::new(self.bootstrapper.materialize(&set))),
            Err(failure) => PreviewState::Failed {
                handle: Arc::new(self.bootstrapper.materialize_failure(&failure)),
                failure: Arc::new(failure),
            },
        };
        info!(revision, ready = state.is_ready(), "preview published");
        self.state.send_replace(state);
        BuildOutcome::Published { revision }
    }

    // ========================================================================
    // Persistence
    // ========================================================================

    /// Replace the tree with a persisted one. On error the tree is untouched.
    pub fn hydrate(&self, tree: &SerializedTree) -> VfsResult<()> {
        self.vfs.write().deserialize(tree)
    }

    /// The tree as a flat mapping for storage.
    pub fn persist(&self) -> SerializedTree {
        self.vfs.read().serialize()
    }
}

impl Drop for ProjectSession {
    fn drop(&mut self) {
        self.vfs.write().unsubscribe(self.subscription);
        if let Some(handle) = self.state.borrow().handle() {
            self.bootstrapper.dispose(handle);
        }
    }
}
