//! Disk I/O abstraction for the dev server
//!
//! The pipeline and the options loader never touch the filesystem directly; they go
//! through the `Runtime` trait. The server uses [`NativeRuntime`], tests can swap in
//! the in-memory runtime from `test_utils`.

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Result type for runtime operations
pub type RuntimeResult<T> = Result<T, RuntimeError>;

/// Errors that can occur during runtime operations
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    /// File not found
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(String),
}

/// Platform runtime trait
#[async_trait]
pub trait Runtime: Send + Sync + std::fmt::Debug {
    /// Read a file's raw bytes
    async fn read_file(&self, path: &Path) -> RuntimeResult<Vec<u8>>;

    /// Check whether a regular file exists at `path`
    async fn is_file(&self, path: &Path) -> bool;
}

/// Runtime backed by `tokio::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeRuntime;

#[async_trait]
impl Runtime for NativeRuntime {
    async fn read_file(&self, path: &Path) -> RuntimeResult<Vec<u8>> {
        tokio::fs::read(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                RuntimeError::FileNotFound(path.to_path_buf())
            } else {
                RuntimeError::Io(format!("Failed to read {}: {}", path.display(), e))
            }
        })
    }

    async fn is_file(&self, path: &Path) -> bool {
        tokio::fs::metadata(path)
            .await
            .map(|metadata| metadata.is_file())
            .unwrap_or(false)
    }
}
