//! Terminal output: status messages, per-package spinners and summaries.
//!
//! Everything is written to stderr except the output of `tandem graph`,
//! which goes to stdout so it can be piped.

mod format;
mod messages;
mod progress;

use std::sync::atomic::{AtomicBool, Ordering};

pub use format::{format_duration, format_generations, print_build_summary};
pub use messages::{error, info, success, warning};
pub use progress::TerminalSink;

static COLORS: AtomicBool = AtomicBool::new(true);

/// Check if color output should be enabled.
///
/// `NO_COLOR` wins over `FORCE_COLOR`; otherwise colors are used when
/// stderr is a terminal.
pub fn should_use_color() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    if std::env::var_os("FORCE_COLOR").is_some() {
        return true;
    }
    console::user_attended_stderr()
}

/// Decide once whether output is colored. Call early in `main`.
pub fn init_colors(no_color: bool) {
    let enabled = !no_color && should_use_color();
    COLORS.store(enabled, Ordering::Relaxed);
    console::set_colors_enabled_stderr(enabled);
}

pub(crate) fn colors_enabled() -> bool {
    COLORS.load(Ordering::Relaxed)
}

/// Apply `style` to `text` when colors are enabled.
pub(crate) fn styled(text: &str, style: impl FnOnce(&str) -> String) -> String {
    if colors_enabled() {
        style(text)
    } else {
        text.to_string()
    }
}

/// Spinners are pointless when nobody watches stderr.
pub fn show_progress(quiet: bool) -> bool {
    !quiet && console::user_attended_stderr()
}
