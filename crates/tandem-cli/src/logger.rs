//! Logging setup for the CLI.
//!
//! Library crates only emit `tracing` events; this installs the subscriber
//! that prints them.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const CRATES: &[&str] = &[
    "tandem_graph",
    "tandem_analysis",
    "tandem_link",
    "tandem_config",
    "tandem_build",
    "tandem_cli",
];

/// Filter directives for every tandem crate at `level`.
fn directives(level: &str) -> String {
    CRATES
        .iter()
        .map(|krate| format!("{krate}={level}"))
        .collect::<Vec<_>>()
        .join(",")
}

/// Pick the log filter.
///
/// 1. `--verbose`: debug for tandem crates
/// 2. `--quiet`: errors only
/// 3. `RUST_LOG`, when set
/// 4. warnings for tandem crates; per-package progress is shown by the
///    progress display instead
pub fn env_filter(verbose: bool, quiet: bool) -> EnvFilter {
    if verbose {
        EnvFilter::new(directives("debug"))
    } else if quiet {
        EnvFilter::new("error")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directives("warn")))
    }
}

/// Install the global subscriber. Call once, before anything logs.
pub fn init_logger(verbose: bool, quiet: bool, no_color: bool) {
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .with_ansi(!no_color && crate::ui::should_use_color())
        .compact();

    tracing_subscriber::registry()
        .with(env_filter(verbose, quiet))
        .with(fmt_layer)
        .init();
}
