//! File watch registration.
//!
//! Served files are watched lazily, the first time they are compiled. A watch
//! carries the [`Invalidation`] to perform when it fires: either the single cache key
//! the file was served under, or a sweep of every key (used for shared option files
//! whose contents affect how any asset is compiled).

mod native;
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use native::NotifyWatchService;

use std::path::{Path, PathBuf};

/// What to invalidate when a watched path changes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Invalidation {
    /// Mark exactly this cache key as invalidated
    Key(String),
    /// Mark every cache key as invalidated
    All,
}

/// A fired watch, delivered to the invalidation loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchEvent {
    /// The file that changed
    pub path: PathBuf,
    /// The invalidation registered for it
    pub invalidation: Invalidation,
}

/// File watching errors
#[derive(Debug, thiserror::Error)]
pub enum WatchError {
    /// The underlying notify watcher failed
    #[error("File watcher error: {0}")]
    Notify(#[from] notify::Error),

    /// The path has no parent directory to watch
    #[error("Cannot watch {}: no parent directory", .0.display())]
    NoParent(PathBuf),
}

/// Something that can subscribe to changes of a path.
pub trait WatchService: Send + Sync + std::fmt::Debug {
    /// Subscribe to changes of `path`, performing `invalidation` when it fires.
    fn watch(&self, path: &Path, invalidation: Invalidation) -> Result<(), WatchError>;
}

/// A watch service that never subscribes to anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopWatchService;

impl WatchService for NoopWatchService {
    fn watch(&self, _path: &Path, _invalidation: Invalidation) -> Result<(), WatchError> {
        Ok(())
    }
}
