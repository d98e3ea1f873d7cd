//! One spinner per package, driven by build progress events.

use std::collections::HashMap;
use std::time::Duration;

use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use owo_colors::OwoColorize;
use parking_lot::Mutex;
use tandem_build::{ProgressEvent, ProgressSink};

use super::styled;

/// Renders [`ProgressEvent`]s as `indicatif` spinners.
///
/// A spinner is added when a package is scheduled and finished with a
/// status mark once the package is done, unchanged or failed.
pub struct TerminalSink {
    multi: MultiProgress,
    bars: Mutex<HashMap<String, ProgressBar>>,
}

impl TerminalSink {
    /// A sink drawing to stderr, or drawing nothing when `visible` is false.
    pub fn new(visible: bool) -> Self {
        let target = if visible {
            ProgressDrawTarget::stderr()
        } else {
            ProgressDrawTarget::hidden()
        };
        Self {
            multi: MultiProgress::with_draw_target(target),
            bars: Mutex::new(HashMap::new()),
        }
    }

    fn spinner(&self, package: &str) -> ProgressBar {
        let mut bars = self.bars.lock();
        bars.entry(package.to_string())
            .or_insert_with(|| {
                let bar = self.multi.add(ProgressBar::new_spinner());
                bar.set_style(spinner_style());
                bar.set_prefix(package.to_string());
                bar
            })
            .clone()
    }

    /// Clear every spinner that never finished.
    pub fn clear(&self) {
        for bar in self.bars.lock().values() {
            if !bar.is_finished() {
                bar.finish_and_clear();
            }
        }
    }
}

fn spinner_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
}

fn finished_style() -> ProgressStyle {
    ProgressStyle::with_template("{prefix:.bold} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
}

/// The mark a finished package is shown with.
pub(crate) fn status_mark(event: &ProgressEvent) -> Option<String> {
    match event {
        ProgressEvent::Done { .. } => Some(styled("✓", |t| t.green().bold().to_string())),
        ProgressEvent::Unchanged { .. } => Some(styled("=", |t| t.blue().bold().to_string())),
        ProgressEvent::Error { .. } => Some(styled("✗", |t| t.red().bold().to_string())),
        _ => None,
    }
}

impl ProgressSink for TerminalSink {
    fn emit(&self, event: &ProgressEvent) {
        let bar = self.spinner(event.package());
        match status_mark(event) {
            Some(mark) => {
                bar.set_style(finished_style());
                bar.set_prefix(format!("{mark} {}", event.package()));
                bar.finish_with_message(event.to_string());
            }
            None => {
                if matches!(event, ProgressEvent::Resolving { .. }) {
                    bar.enable_steady_tick(Duration::from_millis(100));
                }
                bar.set_message(event.to_string());
            }
        }
    }
}
