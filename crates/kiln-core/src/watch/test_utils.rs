//! Watch service that records registrations instead of subscribing.

use super::{Invalidation, WatchError, WatchService};
use parking_lot::Mutex;
use std::path::{Path, PathBuf};

#[derive(Debug, Default)]
pub struct RecordingWatchService {
    calls: Mutex<Vec<(PathBuf, Invalidation)>>,
}

impl RecordingWatchService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every registration in call order.
    pub fn calls(&self) -> Vec<(PathBuf, Invalidation)> {
        self.calls.lock().clone()
    }

    /// Number of registrations for `path`.
    pub fn count_for(&self, path: &Path) -> usize {
        self.calls.lock().iter().filter(|(p, _)| p == path).count()
    }
}

impl WatchService for RecordingWatchService {
    fn watch(&self, path: &Path, invalidation: Invalidation) -> Result<(), WatchError> {
        self.calls.lock().push((path.to_path_buf(), invalidation));
        Ok(())
    }
}

/// A watch service whose registrations always fail.
#[derive(Debug, Default)]
pub struct FailingWatchService;

impl WatchService for FailingWatchService {
    fn watch(&self, path: &Path, _invalidation: Invalidation) -> Result<(), WatchError> {
        Err(WatchError::NoParent(path.to_path_buf()))
    }
}
