//! Serve command implementation.
//!
//! Orchestrates the dev server lifecycle:
//! - Configuration loading and option preloading
//! - Optional file watching feeding cache invalidation
//! - HTTP and live-reload servers
//! - Graceful shutdown on Ctrl+C

use crate::cli::ServeArgs;
use crate::config::{ConfigOverrides, ServeConfig};
use crate::dev::state::dev_context;
use crate::dev::{DevServer, ServerState};
use crate::error::Result;
use crate::ui;
use kiln_core::watch::{NoopWatchService, NotifyWatchService};
use kiln_core::{DevContext, WatchEvent, WatchService};
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tokio::sync::mpsc;

/// Execute the serve command.
///
/// # Errors
///
/// Returns errors for invalid configuration, malformed option files, watcher
/// setup failures and ports that cannot be bound.
pub async fn execute(args: ServeArgs) -> Result<()> {
    let config = ServeConfig::load(&ConfigOverrides::from(&args))?;
    config.validate()?;

    ui::info(&format!("Serving {}", config.root.display()));

    let mut events = None;
    let watcher: Arc<dyn WatchService> = if config.watch_files {
        let (service, rx) = NotifyWatchService::new(Duration::from_millis(config.debounce_ms))?;
        events = Some(rx);
        Arc::new(service)
    } else {
        Arc::new(NoopWatchService)
    };

    let ctx = dev_context(&config, watcher);
    let state = Arc::new(ServerState::new(Arc::clone(&ctx), &config));
    state.preload().await?;

    let server = DevServer::new(config.clone(), Arc::clone(&state));
    let mut server_handle = tokio::spawn(server.start());

    ui::info("Press Ctrl+C to stop");

    loop {
        tokio::select! {
            Some(event) = next_event(&mut events) => {
                handle_watch_event(&ctx, &event);
            }

            _ = signal::ctrl_c() => {
                ui::info("Shutting down development server...");
                break;
            }

            result = &mut server_handle => {
                match result {
                    Ok(Ok(())) => ui::warning("Server stopped unexpectedly"),
                    Ok(Err(err)) => return Err(err),
                    Err(err) => ui::error(&format!("Server task failed: {}", err)),
                }
                break;
            }
        }
    }

    server_handle.abort();
    ui::success("Development server stopped");
    Ok(())
}

async fn next_event(events: &mut Option<mpsc::Receiver<WatchEvent>>) -> Option<WatchEvent> {
    match events {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

/// Invalidate and notify clients for one fired watch.
pub fn handle_watch_event(ctx: &DevContext, event: &WatchEvent) {
    let report = ctx.handle_event(event);
    ui::info(&format!(
        "{} changed, reloaded {} of {} client(s)",
        event.path.display(),
        report.delivered,
        report.attempted
    ));
    if !report.failed.is_empty() {
        tracing::debug!(failed = ?report.failed, "Some clients missed the reload");
    }
}
