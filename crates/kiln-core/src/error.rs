//! Error types for content resolution and option loading.
//!
//! Not-found is deliberately absent here: an unknown URL with SPA fallback disabled
//! is a normal [`Resolution::NotFound`](crate::pipeline::Resolution::NotFound)
//! result, not an error.

use crate::runtime::RuntimeError;
use crate::transform::TransformError;
use crate::watch::WatchError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors from resolving a URL to content.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// Reading the source file or the index document failed
    #[error(transparent)]
    Runtime(#[from] RuntimeError),

    /// A transform was supplied but the file is not valid UTF-8
    #[error("Cannot transform {url}: file is not valid UTF-8")]
    InvalidUtf8 { url: String },

    /// The transform failed; nothing was cached
    #[error("Transform failed for {url}: {source}")]
    Transform {
        url: String,
        #[source]
        source: TransformError,
    },

    /// The file was compiled but could not be watched
    #[error("Failed to watch {url}: {source}")]
    Watch {
        url: String,
        #[source]
        source: WatchError,
    },
}

/// Errors from loading an option document.
#[derive(Debug, Error)]
pub enum OptionsError {
    /// The document could not be read
    #[error("Failed to read options file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: RuntimeError,
    },

    /// The document is not valid JSON or has the wrong shape
    #[error("Invalid options file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The global watch on the document could not be registered
    #[error("Failed to watch options file {}: {source}", .path.display())]
    Watch {
        path: PathBuf,
        #[source]
        source: WatchError,
    },
}

impl OptionsError {
    /// Path of the document that failed.
    pub fn path(&self) -> &std::path::Path {
        match self {
            OptionsError::Read { path, .. }
            | OptionsError::Parse { path, .. }
            | OptionsError::Watch { path, .. } => path,
        }
    }
}
