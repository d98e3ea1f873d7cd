use std::path::PathBuf;

use tandem_graph::GraphError;

#[derive(Debug, thiserror::Error)]
pub enum LinkError {
    /// A file needs its imports rewritten but was never analyzed.
    #[error("Cannot rewrite imports of {path}: no analysis context\n\nHint: only scanned source files can be substituted")]
    MissingContext { path: PathBuf },

    #[error(transparent)]
    Graph(#[from] GraphError),
}

pub type Result<T> = std::result::Result<T, LinkError>;
