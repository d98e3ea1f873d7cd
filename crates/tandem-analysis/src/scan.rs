//! Module graph construction.
//!
//! A scan starts at one entry file and walks every local file it reaches,
//! depth-first on an explicit stack. Each file becomes one node; edges
//! point from a file to the local files it imports. Package references are
//! rolled up into a [`DependencyLedger`] with the importing files as
//! provenance.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};
use path_clean::PathClean;
use rustc_hash::FxHashSet;
use tandem_graph::{
    DependencyLedger, DirectedGraph, PackageManifest, Runtime, package_name_from_vendored_path,
};

use crate::analyzer::ProjectAnalyzer;
use crate::context::{Resolution, SourceContext};
use crate::error::{AnalyzeError, Result};
use crate::options::ScanOptions;
use crate::resolver::prefer_declaration;
use crate::source_map::locate_source_map;

/// One local source file.
#[derive(Debug, Clone)]
pub struct ModuleNode {
    pub path: PathBuf,
    /// Readable companion source map, when lookup was requested.
    pub source_map: Option<PathBuf>,
    /// Names of the packages this file imports.
    pub external: IndexSet<String>,
    pub context: Option<Arc<SourceContext>>,
}

/// Graph produced by a single [`scan`].
#[derive(Debug)]
pub struct ModuleGraph {
    entry: PathBuf,
    graph: DirectedGraph<ModuleNode>,
    external: DependencyLedger,
}

/// A visited file in flattened order.
#[derive(Debug, Clone)]
pub struct FlatFile {
    pub path: PathBuf,
    pub dependencies: IndexSet<PathBuf>,
    pub context: Option<Arc<SourceContext>>,
    /// Companion source map; it is also listed as its own file right after
    /// this one.
    pub source_map: Option<PathBuf>,
}

/// Result of [`ModuleGraph::flatten`].
#[derive(Debug, Clone, Default)]
pub struct FlattenedGraph {
    pub files: Vec<FlatFile>,
    pub external: DependencyLedger,
}

pub(crate) fn node_id(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

impl ModuleGraph {
    /// The file the scan started from.
    pub fn entry(&self) -> &Path {
        &self.entry
    }

    pub fn graph(&self) -> &DirectedGraph<ModuleNode> {
        &self.graph
    }

    pub fn node(&self, path: &Path) -> Option<&ModuleNode> {
        self.graph.node(&node_id(path))
    }

    /// Every package reference found during the scan.
    pub fn external(&self) -> &DependencyLedger {
        &self.external
    }

    pub fn len(&self) -> usize {
        self.graph.len()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.is_empty()
    }

    /// Local files reachable from `start` in breadth-first order, each
    /// followed by its source map, plus the package references made by
    /// exactly those files.
    pub fn flatten(&self, start: &Path) -> Result<FlattenedGraph> {
        let mut order: Vec<String> = Vec::new();
        self.graph
            .visit_breadth_first_search(&node_id(start), |id, _| order.push(id.to_string()))?;

        let mut files: IndexMap<PathBuf, FlatFile> = IndexMap::new();
        let mut visited: FxHashSet<PathBuf> = FxHashSet::default();

        for id in &order {
            let Some(node) = self.graph.node(id) else {
                continue;
            };
            visited.insert(node.path.clone());

            let dependencies = self
                .graph
                .adjacent_ids(id)?
                .into_iter()
                .filter_map(|dep| self.graph.node(dep))
                .map(|dep| dep.path.clone())
                .collect();

            files.entry(node.path.clone()).or_insert_with(|| FlatFile {
                path: node.path.clone(),
                dependencies,
                context: node.context.clone(),
                source_map: node.source_map.clone(),
            });

            if let Some(map) = &node.source_map {
                files.entry(map.clone()).or_insert_with(|| FlatFile {
                    path: map.clone(),
                    dependencies: IndexSet::new(),
                    context: None,
                    source_map: None,
                });
            }
        }

        Ok(FlattenedGraph {
            files: files.into_values().collect(),
            external: self.external.retain_importers(|file| visited.contains(file)),
        })
    }
}

struct Frame {
    id: String,
    locals: Vec<PathBuf>,
    cursor: usize,
}

/// Scans module graphs for one project.
pub struct Scanner<'a> {
    root: PathBuf,
    options: ScanOptions,
    analyzer: &'a dyn ProjectAnalyzer,
    manifest: &'a PackageManifest,
    runtime: &'a dyn Runtime,
}

impl<'a> Scanner<'a> {
    pub fn new(
        root: impl Into<PathBuf>,
        options: ScanOptions,
        analyzer: &'a dyn ProjectAnalyzer,
        manifest: &'a PackageManifest,
        runtime: &'a dyn Runtime,
    ) -> Self {
        Self {
            root: root.into().clean(),
            options,
            analyzer,
            manifest,
            runtime,
        }
    }

    fn absolute(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.clean()
        } else {
            self.root.join(path).clean()
        }
    }

    fn ensure_inside_root(&self, path: &Path) -> Result<()> {
        if path.starts_with(&self.root) {
            Ok(())
        } else {
            Err(AnalyzeError::OutsideRoot {
                path: path.to_path_buf(),
                root: self.root.clone(),
            })
        }
    }

    /// Build the module graph reachable from `entry`.
    pub async fn scan(&self, entry: &Path) -> Result<ModuleGraph> {
        let mut entry = self.absolute(entry);
        if !self.runtime.is_readable(&entry).await {
            return Err(AnalyzeError::MissingEntry { path: entry });
        }
        if self.options.resolve_declaration_files {
            entry = prefer_declaration(entry, self.runtime).await;
        }
        self.ensure_inside_root(&entry)?;

        tracing::debug!(entry = %entry.display(), "scanning module graph");

        let mut graph = DirectedGraph::new();
        let mut external = DependencyLedger::new();

        let locals = self.visit(&entry, &mut graph, &mut external).await?;
        let mut stack = vec![Frame {
            id: node_id(&entry),
            locals,
            cursor: 0,
        }];

        while let Some(frame) = stack.last_mut() {
            if frame.cursor == frame.locals.len() {
                let Some(done) = stack.pop() else { break };
                if let Some(parent) = stack.last() {
                    if !graph.has_connection(&parent.id, &done.id) {
                        graph.connect(&parent.id, &done.id)?;
                    }
                }
                continue;
            }

            let target = frame.locals[frame.cursor].clone();
            frame.cursor += 1;
            let from = frame.id.clone();
            let target_id = node_id(&target);

            if graph.has_node(&target_id) {
                if !graph.has_connection(&from, &target_id) {
                    graph.connect(&from, &target_id)?;
                }
                continue;
            }

            let locals = self.visit(&target, &mut graph, &mut external).await?;
            stack.push(Frame {
                id: target_id,
                locals,
                cursor: 0,
            });
        }

        tracing::debug!(
            entry = %entry.display(),
            files = graph.len(),
            packages = external.len(),
            "module graph complete"
        );

        Ok(ModuleGraph {
            entry,
            graph,
            external,
        })
    }

    /// Add the node for `path` and return its local references in order.
    async fn visit(
        &self,
        path: &Path,
        graph: &mut DirectedGraph<ModuleNode>,
        external: &mut DependencyLedger,
    ) -> Result<Vec<PathBuf>> {
        let context = self.analyzer.context(path).await?;

        if !context.diagnostics.is_empty() {
            if self.options.fail_on_compile_errors {
                return Err(AnalyzeError::CompileErrors {
                    path: path.to_path_buf(),
                    diagnostics: context.diagnostics.clone(),
                });
            }
            for diagnostic in &context.diagnostics {
                tracing::warn!(file = %path.display(), "{}", diagnostic);
            }
        }

        let mut locals: Vec<PathBuf> = Vec::new();
        let mut packages: IndexSet<String> = IndexSet::new();

        for reference in self.analyzer.references(path).await? {
            match reference.resolution {
                Resolution::Local(target) => {
                    let target = if self.options.resolve_declaration_files {
                        prefer_declaration(target, self.runtime).await
                    } else {
                        target
                    };
                    self.ensure_inside_root(&target)?;
                    if !locals.contains(&target) {
                        locals.push(target);
                    }
                }
                Resolution::Vendored(target) => {
                    let name = package_name_from_vendored_path(&target)
                        .ok_or(AnalyzeError::InvalidVendoredPath { path: target })?;
                    match self
                        .manifest
                        .pinned_version(&name, self.options.include_dev_dependencies)
                    {
                        Some(version) => {
                            external.record(&name, version, path);
                            packages.insert(name);
                        }
                        None => {
                            tracing::debug!(
                                package = %name,
                                file = %path.display(),
                                "package not pinned in manifest, assuming transitive"
                            );
                        }
                    }
                }
                Resolution::Builtin => {}
                Resolution::Unresolved => {
                    return Err(AnalyzeError::UnresolvedImport {
                        specifier: reference.specifier,
                        from: path.to_path_buf(),
                    });
                }
            }
        }

        let source_map = if self.options.include_source_map_files {
            locate_source_map(path, &context.source, self.runtime).await
        } else {
            None
        };

        graph.add_node(
            node_id(path),
            ModuleNode {
                path: path.to_path_buf(),
                source_map,
                external: packages,
                context: Some(context),
            },
        )?;

        Ok(locals)
    }
}

/// Scan the module graph reachable from `entry` inside `root`.
pub async fn scan(
    entry: &Path,
    root: &Path,
    options: ScanOptions,
    analyzer: &dyn ProjectAnalyzer,
    manifest: &PackageManifest,
    runtime: &dyn Runtime,
) -> Result<ModuleGraph> {
    Scanner::new(root, options, analyzer, manifest, runtime)
        .scan(entry)
        .await
}
