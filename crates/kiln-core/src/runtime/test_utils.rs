//! In-memory runtime for tests.

use super::{Runtime, RuntimeError, RuntimeResult};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

/// A runtime serving files from a map, counting every read.
#[derive(Debug, Default)]
pub struct MemoryRuntime {
    files: Mutex<HashMap<PathBuf, Vec<u8>>>,
    reads: AtomicUsize,
}

impl MemoryRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a file.
    pub fn insert(&self, path: impl Into<PathBuf>, content: impl Into<Vec<u8>>) {
        self.files.lock().insert(path.into(), content.into());
    }

    /// Remove a file.
    pub fn remove(&self, path: &Path) {
        self.files.lock().remove(path);
    }

    /// Number of `read_file` calls so far.
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Runtime for MemoryRuntime {
    async fn read_file(&self, path: &Path) -> RuntimeResult<Vec<u8>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.files
            .lock()
            .get(path)
            .cloned()
            .ok_or_else(|| RuntimeError::FileNotFound(path.to_path_buf()))
    }

    async fn is_file(&self, path: &Path) -> bool {
        self.files.lock().contains_key(path)
    }
}
