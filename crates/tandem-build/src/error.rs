//! Build errors.

use std::fmt;
use std::path::PathBuf;

use tandem_analysis::AnalyzeError;
use tandem_config::ConfigError;
use tandem_graph::{GraphError, ManifestError, RuntimeError};
use tandem_link::LinkError;
use thiserror::Error;

use crate::scheduler::GraphIssue;

pub type Result<T> = std::result::Result<T, BuildError>;

#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("package graph is invalid:\n{}", render_issues(issues))]
    Schedule { issues: Vec<GraphIssue> },

    #[error(transparent)]
    Analyze(#[from] AnalyzeError),

    #[error(transparent)]
    Link(#[from] LinkError),

    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: RuntimeError,
    },

    #[error("lock file {} is invalid: {message}", path.display())]
    Lock { path: PathBuf, message: String },

    #[error("invalid version `{version}` for {package}: {message}")]
    Version {
        package: String,
        version: String,
        message: String,
    },

    #[error("target path `{target}` escapes the package directory of {package}")]
    EscapingPath { package: String, target: String },

    #[error("failed to publish {package}: {message}")]
    Publish { package: String, message: String },
}

fn render_issues(issues: &[GraphIssue]) -> String {
    issues
        .iter()
        .map(|issue| format!("  - {issue}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// A failed package, or a schedule that could not be run at all.
#[derive(Debug)]
pub struct PackageFailure {
    /// `None` when the failure is not tied to one package.
    pub package: Option<String>,
    pub error: BuildError,
}

impl PackageFailure {
    pub fn new(package: impl Into<String>, error: impl Into<BuildError>) -> Self {
        Self {
            package: Some(package.into()),
            error: error.into(),
        }
    }
}

impl fmt::Display for PackageFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.package {
            Some(package) => write!(f, "{package}: {}", self.error),
            None => write!(f, "{}", self.error),
        }
    }
}

impl std::error::Error for PackageFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

impl From<GraphError> for PackageFailure {
    fn from(error: GraphError) -> Self {
        Self {
            package: None,
            error: BuildError::Graph(error),
        }
    }
}
