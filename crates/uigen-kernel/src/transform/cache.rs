//! Transpile cache keyed by content hash.
//!
//! Entries are keyed by the BLAKE3 hash of the dialect, the JSX runtime and
//! the source text, so a hit is always valid regardless of path. Each run
//! marks the keys it used; [`TranspileCache::prune`] drops the rest, which
//! bounds the cache by the size of the current project.

use std::collections::{HashMap, HashSet};

use parking_lot::Mutex;

use super::config::JsxRuntime;
use super::transpile::{SourceKind, TranspileError, Transpiled};

/// Hex BLAKE3 digest of a file's transform inputs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContentHash(String);

impl ContentHash {
    pub fn compute(kind: SourceKind, runtime: &JsxRuntime, source: &str) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(format!("{kind:?}\0{runtime:?}\0").as_bytes());
        hasher.update(source.as_bytes());
        Self(hex::encode(hasher.finalize().as_bytes()))
    }

    /// Hash of raw content with no transform inputs.
    pub fn of_text(text: &str) -> Self {
        Self(hex::encode(blake3::hash(text.as_bytes()).as_bytes()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First `n` hex digits.
    pub fn short(&self, n: usize) -> &str {
        &self.0[..n.min(self.0.len())]
    }
}

impl std::fmt::Display for ContentHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

type Entry = Result<Transpiled, TranspileError>;

#[derive(Default)]
struct Inner {
    entries: HashMap<ContentHash, Entry>,
    live: HashSet<ContentHash>,
    hits: u64,
    misses: u64,
}

/// Thread-safe memo of transpile results.
#[derive(Default)]
pub struct TranspileCache {
    inner: Mutex<Inner>,
}

/// Counters for observing cache effectiveness.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
}

impl TranspileCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached result for `key`, or compute and store it.
    ///
    /// The lock is not held while `compute` runs.
    pub fn get_or_insert_with(&self, key: &ContentHash, compute: impl FnOnce() -> Entry) -> Entry {
        {
            let mut inner = self.inner.lock();
            inner.live.insert(key.clone());
            if let Some(hit) = inner.entries.get(key).cloned() {
                inner.hits += 1;
                return hit;
            }
            inner.misses += 1;
        }
        let value = compute();
        self.inner.lock().entries.insert(key.clone(), value.clone());
        value
    }

    /// Drop entries not used since the last prune. Returns how many went.
    pub fn prune(&self) -> usize {
        let mut inner = self.inner.lock();
        let live = std::mem::take(&mut inner.live);
        let before = inner.entries.len();
        inner.entries.retain(|k, _| live.contains(k));
        before - inner.entries.len()
    }

    pub fn stats(&self) -> CacheStats {
        let inner = self.inner.lock();
        CacheStats {
            entries: inner.entries.len(),
            hits: inner.hits,
            misses: inner.misses,
        }
    }
}
