//! Kiln core - the compile cache and invalidation engine behind the dev server.
//!
//! A request URL is resolved against an in-memory cache of compiled assets. A miss
//! reads the file, runs it through a [`Transform`], stores the result and registers a
//! file watch. When a watched file changes, the cache entry is marked invalidated and
//! every live-reload client is told to refresh.
//!
//! # Architecture
//!
//! - [`cache`] - the URL → compiled bytes map with an explicit invalidated marker
//! - [`clients`] - live-reload client registry and best-effort broadcast
//! - [`watch`] - file watch registration and the notify-backed service
//! - [`pipeline`] - cache lookup, compile-on-miss and SPA fallback
//! - [`headers`] - regex-keyed custom response header overrides
//! - [`options`] - watched JSON option documents
//! - [`runtime`] - disk I/O seam
//! - [`transform`] - source transformation seam
//! - [`context`] - the per-run context tying everything together
//!
//! # Example
//!
//! ```rust,no_run
//! use kiln_core::{DevContext, NativeRuntime, Resolution, ServeSettings, resolve};
//! use kiln_core::watch::NoopWatchService;
//! use std::sync::Arc;
//!
//! # async fn run() -> Result<(), kiln_core::ResolveError> {
//! let ctx = DevContext::new(
//!     ServeSettings::new("."),
//!     Arc::new(NativeRuntime),
//!     Arc::new(NoopWatchService),
//! );
//!
//! match resolve(&ctx, "/index.html", None).await? {
//!     Resolution::Content { bytes, .. } => println!("{} bytes", bytes.len()),
//!     Resolution::NotFound => println!("404"),
//! }
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod clients;
pub mod context;
pub mod error;
pub mod headers;
pub mod options;
pub mod pipeline;
pub mod runtime;
pub mod transform;
pub mod watch;

pub use cache::{AssetCache, CacheEntry, CacheLookup, CacheStats};
pub use clients::{BroadcastReport, ClientId, ClientRegistry, RELOAD_MESSAGE};
pub use context::{DevContext, ServeSettings, SharedContext};
pub use error::{OptionsError, ResolveError};
pub use headers::{HeaderSet, HeaderTable, headers_for};
pub use options::{OptionsCell, load_options};
pub use pipeline::{Origin, Resolution, resolve};
pub use runtime::{NativeRuntime, Runtime, RuntimeError, RuntimeResult};
pub use transform::{Transform, TransformError};
pub use watch::{Invalidation, WatchError, WatchEvent, WatchService};
