//! Command implementations for the Kiln CLI.
//!
//! - [`serve`] - Development server with live reload
//! - [`check`] - Configuration and option file validation

pub mod check;
pub mod serve;

pub use check::execute as check_execute;
pub use serve::execute as serve_execute;
