//! Resolved bundles: the flattened file set of one package.

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};
use path_clean::PathClean;
use serde::{Deserialize, Serialize};
use tandem_graph::{DependencyLedger, PackageManifest, Runtime};

use crate::analyzer::ProjectAnalyzer;
use crate::context::SourceContext;
use crate::error::{AnalyzeError, Result};
use crate::options::ScanOptions;
use crate::scan::Scanner;

/// Public surface of a package: an import target and an optional
/// type-declaration counterpart.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntryPoint {
    pub import: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub types: Option<PathBuf>,
}

impl EntryPoint {
    pub fn new(import: impl Into<PathBuf>) -> Self {
        Self {
            import: import.into(),
            types: None,
        }
    }

    pub fn with_types(mut self, types: impl Into<PathBuf>) -> Self {
        self.types = Some(types.into());
        self
    }
}

/// What to resolve for one package.
#[derive(Debug, Clone)]
pub struct BundleSpec {
    pub name: String,
    /// Local files must live under this folder.
    pub project_root: PathBuf,
    /// Target paths are relative to this folder.
    pub package_root: PathBuf,
    pub entries: Vec<EntryPoint>,
    /// Files shipped regardless of import traversal.
    pub include: Vec<PathBuf>,
    pub options: ScanOptions,
}

/// One file of a resolved bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceEntry {
    pub source_file_path: PathBuf,
    /// Path inside the published package, `/`-separated.
    pub target_file_path: String,
    pub direct_dependencies: IndexSet<PathBuf>,
    pub context: Option<Arc<SourceContext>>,
    /// Source path of the companion source map, itself a resource of the
    /// same bundle.
    pub source_map: Option<PathBuf>,
    pub is_explicitly_included: bool,
}

#[derive(Debug, Clone)]
pub struct ResolvedBundle {
    pub name: String,
    pub root: PathBuf,
    pub resources: Vec<ResourceEntry>,
    pub entry_points: Vec<EntryPoint>,
    pub external_dependencies: DependencyLedger,
}

impl ResolvedBundle {
    pub fn resource(&self, source: &Path) -> Option<&ResourceEntry> {
        self.resources
            .iter()
            .find(|entry| entry.source_file_path == source)
    }
}

/// `path` relative to `base`, `/`-separated.
///
/// Paths outside `base` keep their `..` segments; publishing rejects them.
pub fn target_path(path: &Path, base: &Path) -> String {
    let path_parts: Vec<Component> = path.components().collect();
    let base_parts: Vec<Component> = base.components().collect();
    let common = path_parts
        .iter()
        .zip(&base_parts)
        .take_while(|(a, b)| a == b)
        .count();

    let mut segments: Vec<String> = Vec::new();
    for _ in common..base_parts.len() {
        segments.push("..".to_string());
    }
    for part in &path_parts[common..] {
        segments.push(part.as_os_str().to_string_lossy().into_owned());
    }
    segments.join("/")
}

fn absolute(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.clean()
    } else {
        root.join(path).clean()
    }
}

/// Scan every entry point of `spec` and merge the results.
///
/// Import entries are scanned with the package's options, type entries
/// with declaration resolution. The first occurrence of a file wins.
/// Explicitly included files are appended last.
pub async fn resolve_bundle(
    spec: &BundleSpec,
    manifest: &PackageManifest,
    analyzer: &dyn ProjectAnalyzer,
    runtime: &dyn Runtime,
) -> Result<ResolvedBundle> {
    let project_root = spec.project_root.clean();
    let package_root = absolute(&project_root, &spec.package_root);

    let import_scanner = Scanner::new(&project_root, spec.options, analyzer, manifest, runtime);
    let types_scanner = Scanner::new(
        &project_root,
        spec.options.declarations(),
        analyzer,
        manifest,
        runtime,
    );

    let mut resources: IndexMap<PathBuf, ResourceEntry> = IndexMap::new();
    let mut external = DependencyLedger::new();
    let mut entry_points = Vec::with_capacity(spec.entries.len());

    let mut merge = |flat: crate::scan::FlattenedGraph| {
        for file in flat.files {
            resources
                .entry(file.path.clone())
                .or_insert_with(|| ResourceEntry {
                    target_file_path: target_path(&file.path, &package_root),
                    source_file_path: file.path,
                    direct_dependencies: file.dependencies,
                    context: file.context,
                    source_map: file.source_map,
                    is_explicitly_included: false,
                });
        }
        external.merge(&flat.external);
    };

    for entry in &spec.entries {
        let graph = import_scanner.scan(&entry.import).await?;
        let import = graph.entry().to_path_buf();
        merge(graph.flatten(&import)?);

        let types = match &entry.types {
            Some(types) => {
                let graph = types_scanner.scan(types).await?;
                let types = graph.entry().to_path_buf();
                merge(graph.flatten(&types)?);
                Some(types)
            }
            None => None,
        };

        entry_points.push(EntryPoint { import, types });
    }

    for include in &spec.include {
        let path = absolute(&project_root, include);
        if !runtime.is_readable(&path).await {
            return Err(AnalyzeError::MissingInclude { path });
        }
        resources
            .entry(path.clone())
            .and_modify(|entry| entry.is_explicitly_included = true)
            .or_insert_with(|| ResourceEntry {
                target_file_path: target_path(&path, &package_root),
                source_file_path: path,
                direct_dependencies: IndexSet::new(),
                context: None,
                source_map: None,
                is_explicitly_included: true,
            });
    }

    tracing::debug!(
        package = %spec.name,
        files = resources.len(),
        packages = external.len(),
        "bundle resolved"
    );

    Ok(ResolvedBundle {
        name: spec.name.clone(),
        root: package_root,
        resources: resources.into_values().collect(),
        entry_points,
        external_dependencies: external,
    })
}
