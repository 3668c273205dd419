//! Terminal status output.
//!
//! ```no_run
//! use kiln_cli::ui;
//!
//! ui::init_colors(false);
//! ui::success("Serving on http://127.0.0.1:5000");
//! ui::error("Failed to bind port 5000");
//! ```

mod messages;

pub use messages::{error, info, success, warning};

use std::sync::atomic::{AtomicBool, Ordering};

static COLORS: AtomicBool = AtomicBool::new(true);

/// Check if color output should be enabled.
///
/// Respects NO_COLOR and FORCE_COLOR, falls back to terminal detection.
pub fn should_use_color() -> bool {
    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }

    if std::env::var("FORCE_COLOR").is_ok() {
        return true;
    }

    console::user_attended_stderr()
}

/// Decide once whether status lines are colored.
pub fn init_colors(no_color: bool) {
    COLORS.store(!no_color && should_use_color(), Ordering::Relaxed);
}

pub(crate) fn colors_enabled() -> bool {
    COLORS.load(Ordering::Relaxed)
}
