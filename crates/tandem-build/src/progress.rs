//! Progress events emitted while packages build.

use std::fmt;

/// Per-package milestones, in the order a successful build emits them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    /// The package was placed in a generation.
    Scheduled { package: String, generation: usize },
    Resolving { package: String },
    Linking { package: String, siblings: usize },
    Building { package: String, files: usize },
    Publishing { package: String, version: String },
    /// Content matches the lock file; nothing was published.
    Unchanged { package: String, version: String },
    Done { package: String, version: String },
    Error { package: String, message: String },
}

impl ProgressEvent {
    pub fn package(&self) -> &str {
        match self {
            ProgressEvent::Scheduled { package, .. }
            | ProgressEvent::Resolving { package }
            | ProgressEvent::Linking { package, .. }
            | ProgressEvent::Building { package, .. }
            | ProgressEvent::Publishing { package, .. }
            | ProgressEvent::Unchanged { package, .. }
            | ProgressEvent::Done { package, .. }
            | ProgressEvent::Error { package, .. } => package,
        }
    }
}

impl fmt::Display for ProgressEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProgressEvent::Scheduled { generation, .. } => {
                write!(f, "scheduled in generation {generation}")
            }
            ProgressEvent::Resolving { .. } => f.write_str("resolving modules"),
            ProgressEvent::Linking { siblings, .. } => {
                write!(f, "linking against {siblings} sibling(s)")
            }
            ProgressEvent::Building { files, .. } => write!(f, "building {files} file(s)"),
            ProgressEvent::Publishing { version, .. } => write!(f, "publishing {version}"),
            ProgressEvent::Unchanged { version, .. } => write!(f, "unchanged at {version}"),
            ProgressEvent::Done { version, .. } => write!(f, "done ({version})"),
            ProgressEvent::Error { message, .. } => write!(f, "failed: {message}"),
        }
    }
}

/// Receives progress events. Emission never waits on the sink.
pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: &ProgressEvent);
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

impl ProgressSink for NoopSink {
    fn emit(&self, _event: &ProgressEvent) {}
}

/// Mirror `event` to `tracing`, then hand it to `sink`.
pub(crate) fn report(sink: &dyn ProgressSink, event: ProgressEvent) {
    match &event {
        ProgressEvent::Error { package, message } => {
            tracing::error!(package = %package, "{message}");
        }
        ProgressEvent::Done { package, version }
        | ProgressEvent::Unchanged { package, version } => {
            tracing::info!(package = %package, version = %version, "{event}");
        }
        _ => tracing::debug!(package = %event.package(), "{event}"),
    }
    sink.emit(&event);
}

/// Keeps every event in memory.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: parking_lot::Mutex<Vec<ProgressEvent>>,
}

impl RecordingSink {
    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events.lock().clone()
    }

    pub fn for_package(&self, package: &str) -> Vec<ProgressEvent> {
        self.events()
            .into_iter()
            .filter(|event| event.package() == package)
            .collect()
    }
}

impl ProgressSink for RecordingSink {
    fn emit(&self, event: &ProgressEvent) {
        self.events.lock().push(event.clone());
    }
}
