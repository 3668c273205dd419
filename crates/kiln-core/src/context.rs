//! Per-run dev server context.
//!
//! Everything the pipeline and the watch callbacks share lives here: the compiled
//! asset cache, the live-reload client registry, the watch service and the disk
//! runtime. One context is built per server run (and per test), never stored in a
//! global.

use crate::cache::AssetCache;
use crate::clients::{BroadcastReport, ClientRegistry};
use crate::runtime::Runtime;
use crate::watch::{Invalidation, WatchError, WatchEvent, WatchService};
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

/// Default SPA fallback document, relative to the serve root.
pub const DEFAULT_INDEX: &str = "index.html";

/// How the pipeline maps and serves URLs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServeSettings {
    /// Directory URLs are resolved against
    pub root: PathBuf,
    /// SPA fallback document, relative to `root`
    pub index: PathBuf,
    /// Return not-found instead of the index document for unknown URLs
    pub disable_spa_fallback: bool,
    /// Register file watches for served files and option documents
    pub watch_enabled: bool,
}

impl ServeSettings {
    /// Settings serving `root` with SPA fallback on and watching off.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            index: PathBuf::from(DEFAULT_INDEX),
            disable_spa_fallback: false,
            watch_enabled: false,
        }
    }

    /// Map a URL path onto a file under `root`.
    ///
    /// Returns `None` for URLs that would escape the root (`..` segments or
    /// prefixes), so they can never match a file.
    pub fn path_for(&self, url: &str) -> Option<PathBuf> {
        let relative = Path::new(url.trim_start_matches('/'));
        let mut path = self.root.clone();
        for component in relative.components() {
            match component {
                Component::Normal(part) => path.push(part),
                Component::CurDir => {}
                Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                    return None;
                }
            }
        }
        Some(path)
    }

    /// Full path of the SPA fallback document.
    pub fn index_path(&self) -> PathBuf {
        self.root.join(&self.index)
    }
}

/// Shared state for one server run.
#[derive(Debug)]
pub struct DevContext {
    pub settings: ServeSettings,
    pub cache: AssetCache,
    pub clients: ClientRegistry,
    pub watcher: Arc<dyn WatchService>,
    pub runtime: Arc<dyn Runtime>,
}

/// Shared context handle.
pub type SharedContext = Arc<DevContext>;

impl DevContext {
    /// Create a context with an empty cache and no clients.
    pub fn new(
        settings: ServeSettings,
        runtime: Arc<dyn Runtime>,
        watcher: Arc<dyn WatchService>,
    ) -> Self {
        Self {
            settings,
            cache: AssetCache::new(),
            clients: ClientRegistry::new(),
            watcher,
            runtime,
        }
    }

    /// Register a watch on `path`.
    ///
    /// Does nothing and returns `false` when watching is disabled for this run.
    pub fn register_watch(
        &self,
        path: &Path,
        invalidation: Invalidation,
    ) -> Result<bool, WatchError> {
        if !self.settings.watch_enabled {
            return Ok(false);
        }
        self.watcher.watch(path, invalidation)?;
        Ok(true)
    }

    /// Perform an invalidation, then tell every client to reload.
    pub fn apply(&self, invalidation: &Invalidation) -> BroadcastReport {
        match invalidation {
            Invalidation::Key(url) => {
                self.cache.invalidate(url);
                tracing::debug!(url = %url, "cache entry invalidated");
            }
            Invalidation::All => {
                let swept = self.cache.invalidate_all();
                tracing::debug!(swept, "all cache entries invalidated");
            }
        }
        self.clients.broadcast_reload()
    }

    /// Handle a fired watch.
    pub fn handle_event(&self, event: &WatchEvent) -> BroadcastReport {
        tracing::info!(path = %event.path.display(), "file changed");
        self.apply(&event.invalidation)
    }
}
