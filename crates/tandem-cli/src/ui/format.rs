//! Formatting for durations, build generations and build summaries.

use std::time::Duration;

use owo_colors::OwoColorize;
use tandem_build::{BuildSummary, PackageArtifact, PackageStatus, PublishLocation};

use super::styled;

/// Format a duration as `50ms`, `1.50s` or `1m 30s`.
pub fn format_duration(duration: Duration) -> String {
    let total_ms = duration.as_millis();

    if total_ms < 1000 {
        format!("{}ms", total_ms)
    } else if total_ms < 60_000 {
        format!("{:.2}s", duration.as_secs_f64())
    } else {
        let secs = duration.as_secs();
        format!("{}m {}s", secs / 60, secs % 60)
    }
}

/// One line per generation, leaves first.
pub fn format_generations(generations: &[Vec<String>]) -> String {
    generations
        .iter()
        .enumerate()
        .map(|(index, names)| format!("{index}: {}\n", names.join(", ")))
        .collect()
}

fn status_label(artifact: &PackageArtifact) -> String {
    match &artifact.status {
        PackageStatus::Published(PublishLocation::Directory(dir)) => {
            format!("published to {}", dir.display())
        }
        PackageStatus::Published(PublishLocation::Skipped) => "dry run".to_string(),
        PackageStatus::Unchanged => "unchanged".to_string(),
    }
}

/// The summary as plain lines: a headline, every built package, then every
/// failure.
pub(crate) fn summary_lines(summary: &BuildSummary, elapsed: Duration) -> Vec<String> {
    let mut lines = Vec::new();
    if summary.is_success() {
        lines.push(format!(
            "built {} package(s) in {}: {} published, {} unchanged",
            summary.succeeded.len(),
            format_duration(elapsed),
            summary.published().count(),
            summary.unchanged().count()
        ));
    } else {
        lines.push(format!(
            "{} succeeded, {} failed",
            summary.succeeded.len(),
            summary.failures.len()
        ));
    }

    for artifact in &summary.succeeded {
        lines.push(format!(
            "  ▸ {}@{} ({})",
            artifact.name,
            artifact.version,
            status_label(artifact)
        ));
    }
    for failure in &summary.failures {
        lines.push(format!("  ✗ {failure}"));
    }
    lines
}

/// Print the summary of a build to stderr.
pub fn print_build_summary(summary: &BuildSummary, elapsed: Duration) {
    let lines = summary_lines(summary, elapsed);
    let Some((headline, rest)) = lines.split_first() else {
        return;
    };

    eprintln!();
    if summary.is_success() {
        eprintln!("{}", styled(headline, |t| t.green().bold().to_string()));
    } else {
        eprintln!("{}", styled(headline, |t| t.red().bold().to_string()));
    }
    for line in rest {
        if line.trim_start().starts_with('✗') {
            eprintln!("{}", styled(line, |t| t.red().to_string()));
        } else {
            eprintln!("{line}");
        }
    }
}
