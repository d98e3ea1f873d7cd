//! Status message functions for terminal output.

use owo_colors::OwoColorize;

use super::styled;

/// Print a success message to stderr.
pub fn success(message: &str) {
    eprintln!("{} {}", styled("✓", |t| t.green().bold().to_string()), message);
}

pub fn info(message: &str) {
    eprintln!("{} {}", styled("ℹ", |t| t.blue().bold().to_string()), message);
}

pub fn warning(message: &str) {
    eprintln!(
        "{} {}",
        styled("⚠", |t| t.yellow().bold().to_string()),
        styled(message, |t| t.yellow().to_string())
    );
}

/// Print an error message to stderr.
pub fn error(message: &str) {
    eprintln!(
        "{} {}",
        styled("✗", |t| t.red().bold().to_string()),
        styled(message, |t| t.red().to_string())
    );
}
