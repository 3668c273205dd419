//! Kiln transforms - the compilers plugged into the dev server pipeline.
//!
//! - [`ScriptTransformer`] strips TypeScript/JSX and lowers syntax with oxc, after
//!   rewriting bare import specifiers (`import x from "lit"`) to URLs the browser
//!   can fetch from the dev server.
//! - [`AssemblyScriptTransformer`] compiles `.as` sources with an external `asc`
//!   and wraps the resulting WebAssembly in an ES module.
//! - [`runtime_prelude`] is the snippet prepended to served scripts: a
//!   `process.env.NODE_ENV` shim and the live-reload socket.

pub mod assemblyscript;
pub mod imports;
pub mod kind;
pub mod options;
pub mod prelude;
pub mod script;
pub mod wasm;

pub use assemblyscript::AssemblyScriptTransformer;
pub use imports::{ImportResolver, is_bare_specifier, rewrite_bare_imports};
pub use kind::AssetKind;
pub use options::{AscOptions, ModuleKind, TscOptions};
pub use prelude::runtime_prelude;
pub use script::ScriptTransformer;
pub use wasm::wrap_wasm_module;
