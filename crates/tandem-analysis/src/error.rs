use std::path::PathBuf;

use tandem_graph::{GraphError, ManifestError, RuntimeError};

/// Errors raised while building a module graph or resolving a bundle.
#[derive(Debug, thiserror::Error)]
pub enum AnalyzeError {
    #[error("Cannot resolve '{specifier}' imported from {from}\n\nHint: check the path or add the package to the manifest")]
    UnresolvedImport { specifier: String, from: PathBuf },

    #[error("Cannot determine package name for vendored path {path}")]
    InvalidVendoredPath { path: PathBuf },

    #[error("{} compile error(s) in {path}:\n  {}", diagnostics.len(), diagnostics.join("\n  "))]
    CompileErrors {
        path: PathBuf,
        diagnostics: Vec<String>,
    },

    #[error("Failed to read file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: RuntimeError,
    },

    #[error("File {path} is outside the root {root}")]
    OutsideRoot { path: PathBuf, root: PathBuf },

    #[error("Entry point not found: {path}")]
    MissingEntry { path: PathBuf },

    #[error("Included file not found: {path}")]
    MissingInclude { path: PathBuf },

    #[error("File too large: {path} is {size} bytes (max: {max} bytes)")]
    FileTooLarge { path: PathBuf, size: u64, max: u64 },

    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error(transparent)]
    Graph(#[from] GraphError),
}

pub type Result<T> = std::result::Result<T, AnalyzeError>;
