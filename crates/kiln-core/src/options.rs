//! Watched JSON option documents.
//!
//! Option files (custom headers, compiler options) are shared by every compiled
//! asset, so loading one registers a *global* watch: when the file changes, every
//! cache entry is invalidated and recompiled with the fresh options.

use crate::context::DevContext;
use crate::error::OptionsError;
use crate::watch::Invalidation;
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Load an option document.
///
/// With no `path` the `default` is returned without touching the filesystem or
/// registering a watch. Otherwise a global watch is registered on `path` and the file
/// is read and parsed as JSON. Malformed documents are returned as errors, never
/// replaced by the default.
pub async fn load_options<T: DeserializeOwned>(
    ctx: &DevContext,
    path: Option<&Path>,
    default: T,
) -> Result<T, OptionsError> {
    let Some(path) = path else {
        return Ok(default);
    };

    ctx.register_watch(path, Invalidation::All)
        .map_err(|source| OptionsError::Watch {
            path: path.to_path_buf(),
            source,
        })?;

    let raw = ctx
        .runtime
        .read_file(path)
        .await
        .map_err(|source| OptionsError::Read {
            path: path.to_path_buf(),
            source,
        })?;

    serde_json::from_slice(&raw).map_err(|source| OptionsError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

#[derive(Debug)]
struct Loaded<T> {
    generation: u64,
    value: Arc<T>,
}

/// A loaded option document, reloaded after every global invalidation.
///
/// The cell remembers the cache generation it was loaded at. Once a global sweep
/// bumps the generation (for instance because this very file changed), the next
/// [`get`](Self::get) reads the document again.
#[derive(Debug)]
pub struct OptionsCell<T> {
    path: Option<PathBuf>,
    default: T,
    loaded: RwLock<Option<Loaded<T>>>,
}

impl<T> OptionsCell<T>
where
    T: DeserializeOwned + Clone + Send + Sync,
{
    pub fn new(path: Option<PathBuf>, default: T) -> Self {
        Self {
            path,
            default,
            loaded: RwLock::new(None),
        }
    }

    /// The document path, if one was configured.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Current options, loading them if they are missing or stale.
    pub async fn get(&self, ctx: &DevContext) -> Result<Arc<T>, OptionsError> {
        let generation = ctx.cache.generation();
        if let Some(value) = self.current(generation) {
            return Ok(value);
        }

        let value = load_options(ctx, self.path.as_deref(), self.default.clone())
            .await
            .inspect_err(|err| tracing::error!(error = %err, "failed to load options"))?;
        let value = Arc::new(value);

        *self.loaded.write() = Some(Loaded {
            generation,
            value: Arc::clone(&value),
        });
        Ok(value)
    }

    fn current(&self, generation: u64) -> Option<Arc<T>> {
        self.loaded
            .read()
            .as_ref()
            .filter(|loaded| loaded.generation == generation)
            .map(|loaded| Arc::clone(&loaded.value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ServeSettings;
    use crate::runtime::test_utils::MemoryRuntime;
    use crate::watch::test_utils::RecordingWatchService;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Deserialize)]
    struct Compiler {
        target: String,
    }

    fn context(
        runtime: Arc<MemoryRuntime>,
        watch_enabled: bool,
    ) -> (DevContext, Arc<RecordingWatchService>) {
        let watcher = Arc::new(RecordingWatchService::new());
        let settings = ServeSettings {
            watch_enabled,
            ..ServeSettings::new("/srv")
        };
        (DevContext::new(settings, runtime, watcher.clone()), watcher)
    }

    #[tokio::test]
    async fn test_no_path_returns_default_without_io() {
        let runtime = Arc::new(MemoryRuntime::new());
        let (ctx, watcher) = context(runtime.clone(), true);
        let default = Compiler {
            target: "ES2015".into(),
        };

        let loaded = load_options(&ctx, None, default.clone()).await.unwrap();

        assert_eq!(loaded, default);
        assert_eq!(runtime.reads(), 0);
        assert!(watcher.calls().is_empty());
    }

    #[tokio::test]
    async fn test_loads_and_registers_global_watch() {
        let runtime = Arc::new(MemoryRuntime::new());
        runtime.insert("/srv/tsc.json", r#"{ "target": "ES2020" }"#);
        let (ctx, watcher) = context(runtime, true);

        let loaded = load_options(
            &ctx,
            Some(Path::new("/srv/tsc.json")),
            Compiler {
                target: "ES2015".into(),
            },
        )
        .await
        .unwrap();

        assert_eq!(loaded.target, "ES2020");
        assert_eq!(
            watcher.calls(),
            vec![(PathBuf::from("/srv/tsc.json"), Invalidation::All)]
        );
    }

    #[tokio::test]
    async fn test_watch_disabled_skips_registration() {
        let runtime = Arc::new(MemoryRuntime::new());
        runtime.insert("/srv/tsc.json", r#"{ "target": "ES2020" }"#);
        let (ctx, watcher) = context(runtime, false);

        let loaded: serde_json::Value = load_options(
            &ctx,
            Some(Path::new("/srv/tsc.json")),
            serde_json::Value::Null,
        )
        .await
        .unwrap();

        assert_eq!(loaded["target"], "ES2020");
        assert!(watcher.calls().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_document_is_an_error() {
        let runtime = Arc::new(MemoryRuntime::new());
        runtime.insert("/srv/tsc.json", "{ not json");
        let (ctx, _) = context(runtime, true);

        let err = load_options(&ctx, Some(Path::new("/srv/tsc.json")), serde_json::Value::Null)
            .await
            .unwrap_err();

        assert!(matches!(err, OptionsError::Parse { .. }));
    }

    #[tokio::test]
    async fn test_missing_document_is_an_error() {
        let runtime = Arc::new(MemoryRuntime::new());
        let (ctx, _) = context(runtime, true);

        let err = load_options(&ctx, Some(Path::new("/srv/nope.json")), serde_json::Value::Null)
            .await
            .unwrap_err();

        assert!(matches!(err, OptionsError::Read { .. }));
    }

    #[tokio::test]
    async fn test_cell_reloads_after_global_sweep() {
        let runtime = Arc::new(MemoryRuntime::new());
        runtime.insert("/srv/tsc.json", r#"{ "target": "ES2017" }"#);
        let (ctx, _) = context(runtime.clone(), true);
        let cell = OptionsCell::new(
            Some(PathBuf::from("/srv/tsc.json")),
            Compiler {
                target: "ES2015".into(),
            },
        );

        assert_eq!(cell.get(&ctx).await.unwrap().target, "ES2017");
        assert_eq!(cell.get(&ctx).await.unwrap().target, "ES2017");
        assert_eq!(runtime.reads(), 1);

        runtime.insert("/srv/tsc.json", r#"{ "target": "ES2022" }"#);
        ctx.apply(&Invalidation::All);

        assert_eq!(cell.get(&ctx).await.unwrap().target, "ES2022");
        assert_eq!(runtime.reads(), 2);
    }

    #[tokio::test]
    async fn test_cell_reload_failure_propagates() {
        let runtime = Arc::new(MemoryRuntime::new());
        runtime.insert("/srv/tsc.json", r#"{ "target": "ES2017" }"#);
        let (ctx, _) = context(runtime.clone(), true);
        let cell = OptionsCell::new(
            Some(PathBuf::from("/srv/tsc.json")),
            Compiler {
                target: "ES2015".into(),
            },
        );
        cell.get(&ctx).await.unwrap();

        runtime.insert("/srv/tsc.json", "{");
        ctx.apply(&Invalidation::All);

        assert!(matches!(
            cell.get(&ctx).await,
            Err(OptionsError::Parse { .. })
        ));
    }
}
