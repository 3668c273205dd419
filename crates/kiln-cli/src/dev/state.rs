//! Server state shared across request handlers.

use crate::config::ServeConfig;
use kiln_core::{
    DevContext, HeaderTable, OptionsCell, OptionsError, ServeSettings, SharedContext,
};
use kiln_transform::{
    AscOptions, AssemblyScriptTransformer, ImportResolver, ScriptTransformer, TscOptions,
    runtime_prelude,
};
use std::sync::Arc;

/// Everything a request handler needs.
///
/// Option documents are held in [`OptionsCell`]s, so they are re-read after any
/// global invalidation (including a change to the document itself).
#[derive(Debug)]
pub struct ServerState {
    pub ctx: SharedContext,
    pub headers: OptionsCell<HeaderTable>,
    pub tsc: OptionsCell<TscOptions>,
    pub asc: OptionsCell<AscOptions>,
    resolver: Arc<ImportResolver>,
    prelude: Arc<str>,
    asc_compiler: String,
}

/// Shared state handle.
pub type SharedState = Arc<ServerState>;

impl ServerState {
    pub fn new(ctx: SharedContext, config: &ServeConfig) -> Self {
        let resolver = Arc::new(ImportResolver::new(&ctx.settings.root));
        let prelude = runtime_prelude(config.ws_port, ctx.settings.watch_enabled);

        Self {
            headers: OptionsCell::new(config.headers_file.clone(), HeaderTable::default()),
            tsc: OptionsCell::new(config.tsc_options_file.clone(), TscOptions::default()),
            asc: OptionsCell::new(config.asc_options_file.clone(), AscOptions::default()),
            resolver,
            prelude: prelude.into(),
            asc_compiler: config.asc_compiler.clone(),
            ctx,
        }
    }

    /// Load every option document now, so malformed files fail at startup.
    pub async fn preload(&self) -> Result<(), OptionsError> {
        self.headers.get(&self.ctx).await?;
        self.tsc.get(&self.ctx).await?;
        self.asc.get(&self.ctx).await?;
        Ok(())
    }

    /// Transpiler configured with the current TypeScript options.
    pub async fn script_transformer(&self) -> Result<ScriptTransformer, OptionsError> {
        let options = self.tsc.get(&self.ctx).await?;
        Ok(ScriptTransformer::new(options)
            .with_resolver(Arc::clone(&self.resolver))
            .with_prelude(Arc::clone(&self.prelude)))
    }

    /// AssemblyScript compiler configured with the current flags.
    pub async fn assemblyscript_transformer(
        &self,
    ) -> Result<AssemblyScriptTransformer, OptionsError> {
        let options = self.asc.get(&self.ctx).await?;
        Ok(AssemblyScriptTransformer::new(&self.asc_compiler, options))
    }
}

/// Core serve settings for a configuration.
pub fn serve_settings(config: &ServeConfig) -> ServeSettings {
    ServeSettings {
        index: config.index.clone(),
        disable_spa_fallback: config.disable_spa,
        watch_enabled: config.watch_files,
        ..ServeSettings::new(&config.root)
    }
}

/// Build a context with `watcher`, reading from disk.
pub fn dev_context(
    config: &ServeConfig,
    watcher: Arc<dyn kiln_core::WatchService>,
) -> SharedContext {
    Arc::new(DevContext::new(
        serve_settings(config),
        Arc::new(kiln_core::NativeRuntime),
        watcher,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use kiln_core::watch::NoopWatchService;
    use std::fs;
    use tempfile::TempDir;

    fn config(root: &std::path::Path) -> ServeConfig {
        ServeConfig {
            root: root.to_path_buf(),
            ..ServeConfig::default()
        }
    }

    #[test]
    fn test_serve_settings_from_config() {
        let config = ServeConfig {
            disable_spa: true,
            watch_files: true,
            index: "app.html".into(),
            ..ServeConfig::default()
        };

        let settings = serve_settings(&config);

        assert!(settings.disable_spa_fallback);
        assert!(settings.watch_enabled);
        assert_eq!(settings.index_path(), std::path::Path::new("./app.html"));
    }

    #[tokio::test]
    async fn test_preload_defaults_without_files() {
        let temp = TempDir::new().unwrap();
        let config = config(temp.path());
        let state = ServerState::new(dev_context(&config, Arc::new(NoopWatchService)), &config);

        state.preload().await.unwrap();
        assert!(state.headers.get(&state.ctx).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_preload_reports_malformed_document() {
        let temp = TempDir::new().unwrap();
        let tsc = temp.path().join("tsc.json");
        fs::write(&tsc, "{ module: ").unwrap();
        let config = ServeConfig {
            tsc_options_file: Some(tsc.clone()),
            ..config(temp.path())
        };
        let state = ServerState::new(dev_context(&config, Arc::new(NoopWatchService)), &config);

        let err = state.preload().await.unwrap_err();
        assert_eq!(err.path(), tsc.as_path());
    }

    #[tokio::test]
    async fn test_transformers_pick_up_options() {
        let temp = TempDir::new().unwrap();
        let tsc = temp.path().join("tsc.json");
        fs::write(&tsc, r#"{ "target": "ES2020" }"#).unwrap();
        let config = ServeConfig {
            tsc_options_file: Some(tsc),
            asc_compiler: "npx asc".to_string(),
            ..config(temp.path())
        };
        let state = ServerState::new(dev_context(&config, Arc::new(NoopWatchService)), &config);

        let script = state.script_transformer().await.unwrap();
        assert_eq!(script.options().target, "ES2020");

        let asc = state.assemblyscript_transformer().await.unwrap();
        assert_eq!(asc.program(), "npx");
    }
}
