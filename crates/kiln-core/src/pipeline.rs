//! Content resolution pipeline.
//!
//! Resolution order for a URL:
//! 1. A present cache entry is returned as-is. No disk access, no watch.
//! 2. A file at the URL's path is read, transformed, stored and watched.
//! 3. Otherwise the index document is served (read fresh every time), unless SPA
//!    fallback is disabled, in which case the result is [`Resolution::NotFound`].

use crate::context::DevContext;
use crate::error::ResolveError;
use crate::transform::Transform;
use crate::watch::Invalidation;
use bytes::Bytes;
use std::path::Path;

/// Where resolved content came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Served from a present cache entry
    Cache,
    /// Read and compiled on this request
    Compiled,
    /// The SPA index document
    SpaFallback,
}

/// Outcome of resolving a URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Bytes to serve
    Content { bytes: Bytes, origin: Origin },
    /// No file and SPA fallback disabled; callers map this to a 404
    NotFound,
}

impl Resolution {
    /// The resolved bytes, if any.
    pub fn bytes(&self) -> Option<&Bytes> {
        match self {
            Resolution::Content { bytes, .. } => Some(bytes),
            Resolution::NotFound => None,
        }
    }

    /// The origin of the resolved bytes, if any.
    pub fn origin(&self) -> Option<Origin> {
        match self {
            Resolution::Content { origin, .. } => Some(*origin),
            Resolution::NotFound => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Resolution::NotFound)
    }
}

/// Resolve `url` to content.
///
/// # Arguments
///
/// * `ctx` - Context holding the cache, settings, runtime and watch service
/// * `url` - Decoded URL path, also used as the cache key
/// * `transform` - Applied to the source text on a miss; `None` serves raw bytes
///
/// # Errors
///
/// Read failures, undecodable sources with a transform, transform failures and
/// watch registration failures. Never for a missing file.
pub async fn resolve(
    ctx: &DevContext,
    url: &str,
    transform: Option<&dyn Transform>,
) -> Result<Resolution, ResolveError> {
    if let Some(bytes) = ctx.cache.get(url) {
        tracing::trace!(url, "cache hit");
        return Ok(Resolution::Content {
            bytes,
            origin: Origin::Cache,
        });
    }

    if let Some(path) = ctx.settings.path_for(url) {
        if ctx.runtime.is_file(&path).await {
            let bytes = compile(ctx, url, &path, transform).await?;
            return Ok(Resolution::Content {
                bytes,
                origin: Origin::Compiled,
            });
        }
    }

    if ctx.settings.disable_spa_fallback {
        tracing::debug!(url, "not found");
        return Ok(Resolution::NotFound);
    }

    let index = ctx.runtime.read_file(&ctx.settings.index_path()).await?;
    tracing::debug!(url, "serving SPA fallback");
    Ok(Resolution::Content {
        bytes: Bytes::from(index),
        origin: Origin::SpaFallback,
    })
}

async fn compile(
    ctx: &DevContext,
    url: &str,
    path: &Path,
    transform: Option<&dyn Transform>,
) -> Result<Bytes, ResolveError> {
    let raw = ctx.runtime.read_file(path).await?;

    let bytes = match transform {
        None => Bytes::from(raw),
        Some(transform) => {
            let source = String::from_utf8(raw).map_err(|_| ResolveError::InvalidUtf8 {
                url: url.to_string(),
            })?;
            let output = transform
                .transform(url, path, source)
                .await
                .map_err(|source| ResolveError::Transform {
                    url: url.to_string(),
                    source,
                })?;
            Bytes::from(output)
        }
    };

    ctx.cache.store(url, bytes.clone());
    tracing::debug!(url, size = bytes.len(), "compiled");

    // an entry nobody watches must not be trusted
    if let Err(source) = ctx.register_watch(path, Invalidation::Key(url.to_string())) {
        ctx.cache.invalidate(url);
        return Err(ResolveError::Watch {
            url: url.to_string(),
            source,
        });
    }

    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheLookup;
    use crate::context::ServeSettings;
    use crate::runtime::test_utils::MemoryRuntime;
    use crate::watch::test_utils::FailingWatchService;
    use std::sync::Arc;

    #[test]
    fn test_resolution_accessors() {
        let content = Resolution::Content {
            bytes: Bytes::from_static(b"x"),
            origin: Origin::Compiled,
        };
        assert_eq!(content.bytes().map(|b| b.as_ref()), Some(&b"x"[..]));
        assert_eq!(content.origin(), Some(Origin::Compiled));
        assert!(!content.is_not_found());

        assert!(Resolution::NotFound.is_not_found());
        assert!(Resolution::NotFound.bytes().is_none());
    }

    #[tokio::test]
    async fn test_watch_failure_leaves_entry_invalidated() {
        let runtime = Arc::new(MemoryRuntime::new());
        runtime.insert("/srv/a.js", "export {}");
        let settings = ServeSettings {
            watch_enabled: true,
            ..ServeSettings::new("/srv")
        };
        let ctx = DevContext::new(settings, runtime, Arc::new(FailingWatchService));

        let err = resolve(&ctx, "/a.js", None).await.unwrap_err();

        assert!(matches!(err, ResolveError::Watch { ref url, .. } if url == "/a.js"));
        assert_eq!(ctx.cache.lookup("/a.js"), CacheLookup::Invalidated);
    }
}
