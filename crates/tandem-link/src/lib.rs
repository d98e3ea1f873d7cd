//! # tandem-link
//!
//! Cross-package substitution.
//!
//! Packages built from one shared tree often reach the same files. When a
//! file a package imports is already shipped by a sibling package built
//! earlier, the import is rewritten to `<sibling>/<target path>` and the
//! file is left out of this package.
//!
//! ```text
//! ResolvedBundle ──► ResourceGraph::from_bundle ──► substitute(siblings) ──► flatten ──► LinkedBundle
//! ```

mod error;
mod graph;
mod linked;
mod rewrite;
mod substitute;


pub use error::{LinkError, Result};
pub use graph::{ResourceGraph, ResourceNode};
pub use linked::{LinkedBundle, LinkedResource};
pub use rewrite::rewrite_specifiers;
pub use substitute::substitute;

/// Link `bundle` against already-linked `siblings` in one step.
pub fn link(
    bundle: &tandem_analysis::ResolvedBundle,
    version: &str,
    siblings: &[LinkedBundle],
) -> Result<LinkedBundle> {
    let graph = ResourceGraph::from_bundle(bundle, version)?;
    substitute(&graph, siblings)?.flatten()
}
