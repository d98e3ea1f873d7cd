//! # tandem-graph
//!
//! Foundation types shared by every tandem crate.
//!
//! - [`DirectedGraph`]: an arena-backed directed graph keyed by string ids,
//!   with breadth-first traversal, cycle detection and topological
//!   generations. Module graphs, resource graphs and the package graph are
//!   all instances of it.
//! - [`DependencyLedger`]: package references together with the files that
//!   made them.
//! - [`PackageManifest`]: the dependency sections of a project `package.json`.
//! - [`Runtime`]: the filesystem seam, with [`NativeRuntime`] for real builds.
//!
//! ## Example
//!
//! ```rust
//! use tandem_graph::DirectedGraph;
//!
//! # fn main() -> Result<(), tandem_graph::GraphError> {
//! let mut graph = DirectedGraph::new();
//! graph.add_node("app", ())?;
//! graph.add_node("core", ())?;
//! graph.connect("app", "core")?;
//!
//! let generations = graph.topological_generations()?;
//! assert_eq!(generations, vec![vec!["core".to_string()], vec!["app".to_string()]]);
//! # Ok(())
//! # }
//! ```

mod directed;
mod ledger;
pub mod manifest;
pub mod runtime;

pub use directed::{DirectedGraph, GraphError, Node};
pub use ledger::{DependencyLedger, DependencyRecord};
pub use manifest::{
    DependencyType, ManifestError, PackageManifest, is_vendored_path,
    package_name_from_vendored_path,
};
pub use runtime::native::NativeRuntime;
pub use runtime::{FileMetadata, Runtime, RuntimeError, RuntimeResult};

#[cfg(any(test, feature = "test-utils"))]
pub use runtime::test_utils::TestRuntime;
