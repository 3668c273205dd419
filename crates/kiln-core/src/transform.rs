//! Source transformation seam.
//!
//! The pipeline treats compilation as opaque: it hands a transform the decoded
//! source text and stores whatever text comes back. Concrete transforms (TypeScript
//! stripping, AssemblyScript compilation) live in `kiln-transform`.

use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Errors raised by a transform. Fatal to the request that triggered it.
#[derive(Debug, thiserror::Error)]
pub enum TransformError {
    /// The source failed to parse or transform
    #[error("{} errors in {}:\n{}", .messages.len(), .path.display(), .messages.join("\n"))]
    Diagnostics {
        path: PathBuf,
        messages: Vec<String>,
    },

    /// An external compiler failed
    #[error("Compiler failed for {}: {message}", .path.display())]
    Compiler { path: PathBuf, message: String },

    /// I/O error while transforming
    #[error("I/O error during transform: {0}")]
    Io(String),
}

/// A text-to-text transform applied to files on a cache miss.
#[async_trait]
pub trait Transform: Send + Sync {
    /// Transform `source`, the contents of the file at `path` served as `url`.
    async fn transform(
        &self,
        url: &str,
        path: &Path,
        source: String,
    ) -> Result<String, TransformError>;
}
