//! Development server module.
//!
//! - HTTP server resolving every request through the compile pipeline
//! - Live-reload WebSocket server on its own port
//! - Shared state holding the context, option documents and transforms

pub mod reload;
pub mod server;
pub mod state;

pub use reload::reload_router;
pub use server::{DevServer, build_router, serve_url};
pub use state::{ServerState, SharedState};
