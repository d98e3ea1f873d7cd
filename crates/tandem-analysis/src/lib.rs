//! # tandem-analysis
//!
//! Module graph construction for tandem packages.
//!
//! Starting from a package's entry points, [`scan`] discovers every local
//! file reachable through import statements, separates local files from
//! package references, and records which file referenced which package.
//! [`resolve_bundle`] merges the scans of all entry points into a
//! [`ResolvedBundle`] ready for linking.
//!
//! Parsing is done with oxc through the [`ProjectAnalyzer`] seam; the
//! shipped [`OxcAnalyzer`] resolves specifiers Node-style under either
//! [`ModuleResolution`] convention.
//!
//! ```rust,no_run
//! use std::path::Path;
//! use std::sync::Arc;
//! use tandem_analysis::{ModuleResolution, OxcAnalyzer, ScanOptions, scan};
//! use tandem_graph::{NativeRuntime, PackageManifest};
//!
//! # async fn example() -> Result<(), tandem_analysis::AnalyzeError> {
//! let runtime = Arc::new(NativeRuntime::new());
//! let analyzer = OxcAnalyzer::new("/repo", ModuleResolution::Static, runtime.clone());
//! let manifest = PackageManifest::default();
//!
//! let graph = scan(
//!     Path::new("build/index.js"),
//!     Path::new("/repo"),
//!     ScanOptions::default(),
//!     &analyzer,
//!     &manifest,
//!     runtime.as_ref(),
//! )
//! .await?;
//! let flat = graph.flatten(graph.entry())?;
//! println!("{} files", flat.files.len());
//! # Ok(())
//! # }
//! ```

mod analyzer;
mod bundle;
mod context;
mod error;
mod options;
mod parser;
pub mod resolver;
mod scan;
mod source_map;

#[cfg(test)]
mod tests;

pub use analyzer::{MAX_FILE_SIZE, OxcAnalyzer, ProjectAnalyzer};
pub use bundle::{BundleSpec, EntryPoint, ResolvedBundle, ResourceEntry, resolve_bundle, target_path};
pub use context::{LiteralSpan, ModuleSpecifier, Reference, Resolution, SourceContext, SpecifierKind};
pub use error::{AnalyzeError, Result};
pub use options::{ModuleResolution, ScanOptions};
pub use parser::{ParsedSource, RawSpecifier, extract_specifiers};
pub use scan::{FlatFile, FlattenedGraph, ModuleGraph, ModuleNode, Scanner, scan};
pub use source_map::{locate_source_map, source_map_directive};
