//! Kiln CLI - a compile-on-request development server.
//!
//! Serves a directory over HTTP, compiling TypeScript, JSX and AssemblyScript the
//! first time each file is requested and caching the output until the file changes.
//! Pages loaded from the server reload themselves over a WebSocket whenever a
//! watched file changes.
//!
//! # Architecture
//!
//! - [`cli`] - Argument parsing with clap
//! - [`config`] - Layered configuration (defaults, `kiln.config.json`, `KILN_*`, flags)
//! - [`dev`] - HTTP and live-reload servers around a [`kiln_core::DevContext`]
//! - `commands` - `serve` and `check`
//! - [`error`] - Error types with actionable hints
//! - [`logger`] - `tracing` subscriber setup
//! - [`ui`] - Colored status lines
//!
//! # Example
//!
//! ```rust,no_run
//! use kiln_cli::{error::Result, logger};
//!
//! fn main() -> Result<()> {
//!     logger::init_logger(false, false, false);
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod dev;
pub mod error;
pub mod logger;
pub mod ui;

pub use error::{CliError, ConfigError, Result, ServeError};
