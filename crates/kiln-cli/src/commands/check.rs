//! Check command implementation.
//!
//! Loads configuration and every option document without starting a server.

use crate::cli::CheckArgs;
use crate::config::{ConfigOverrides, ServeConfig};
use crate::dev::ServerState;
use crate::dev::state::dev_context;
use crate::error::Result;
use crate::ui;
use kiln_core::watch::NoopWatchService;
use std::path::Path;
use std::sync::Arc;

/// Execute the check command.
///
/// # Errors
///
/// Returns the first configuration or option document error.
pub async fn execute(args: CheckArgs) -> Result<()> {
    ui::info("Checking configuration...");

    let config = ServeConfig::load(&ConfigOverrides::from(&args))?;
    config.validate()?;
    ui::success("Configuration is valid");

    let ctx = dev_context(
        &ServeConfig {
            watch_files: false,
            ..config.clone()
        },
        Arc::new(NoopWatchService),
    );
    let state = ServerState::new(ctx, &config);

    report("headers", state.headers.path());
    state.headers.get(&state.ctx).await?;
    report("TypeScript options", state.tsc.path());
    state.tsc.get(&state.ctx).await?;
    report("AssemblyScript options", state.asc.path());
    state.asc.get(&state.ctx).await?;

    if !config.root.join(&config.index).is_file() && !config.disable_spa {
        ui::warning(&format!(
            "SPA fallback is on but {} does not exist",
            config.root.join(&config.index).display()
        ));
    }

    ui::success("All option files are valid");
    Ok(())
}

fn report(name: &str, path: Option<&Path>) {
    match path {
        Some(path) => ui::info(&format!("Checking {} in {}", name, path.display())),
        None => ui::info(&format!("No {} file configured, using defaults", name)),
    }
}
