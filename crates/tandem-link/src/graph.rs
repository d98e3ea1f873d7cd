//! Resource graph: a resolved bundle as a directed graph of files.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use tandem_analysis::{EntryPoint, ResolvedBundle, ResourceEntry};
use tandem_graph::{DependencyLedger, DirectedGraph};

use crate::error::Result;

/// One file of a package under linking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceNode {
    pub entry: ResourceEntry,
    pub is_substituted: bool,
    pub substituted_content: Option<String>,
    /// Dependency source path mapped to the sibling specifier replacing it.
    pub rewrites: IndexMap<PathBuf, String>,
}

impl ResourceNode {
    fn new(entry: ResourceEntry) -> Self {
        Self {
            entry,
            is_substituted: false,
            substituted_content: None,
            rewrites: IndexMap::new(),
        }
    }

    pub fn source_file_path(&self) -> &Path {
        &self.entry.source_file_path
    }
}

pub(crate) fn resource_id(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

#[derive(Debug, Clone)]
pub struct ResourceGraph {
    pub(crate) name: String,
    pub(crate) version: String,
    pub(crate) graph: DirectedGraph<ResourceNode>,
    pub(crate) entry_points: Vec<EntryPoint>,
    pub(crate) bundle_dependencies: DependencyLedger,
    pub(crate) external_dependencies: DependencyLedger,
}

impl ResourceGraph {
    /// Build the graph of `bundle`, one node per resource with an edge to
    /// each of its direct dependencies.
    pub fn from_bundle(bundle: &ResolvedBundle, version: impl Into<String>) -> Result<Self> {
        let mut graph = DirectedGraph::new();
        for resource in &bundle.resources {
            graph.add_node(
                resource_id(&resource.source_file_path),
                ResourceNode::new(resource.clone()),
            )?;
        }

        for resource in &bundle.resources {
            let from = resource_id(&resource.source_file_path);
            for dependency in &resource.direct_dependencies {
                graph.connect(&from, &resource_id(dependency))?;
            }
        }

        Ok(Self {
            name: bundle.name.clone(),
            version: version.into(),
            graph,
            entry_points: bundle.entry_points.clone(),
            bundle_dependencies: DependencyLedger::new(),
            external_dependencies: bundle.external_dependencies.clone(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn graph(&self) -> &DirectedGraph<ResourceNode> {
        &self.graph
    }

    pub fn node(&self, source: &Path) -> Option<&ResourceNode> {
        self.graph.node(&resource_id(source))
    }

    pub fn entry_points(&self) -> &[EntryPoint] {
        &self.entry_points
    }

    /// Sibling packages used as rewrite targets so far.
    pub fn bundle_dependencies(&self) -> &DependencyLedger {
        &self.bundle_dependencies
    }

    pub fn external_dependencies(&self) -> &DependencyLedger {
        &self.external_dependencies
    }

    pub fn len(&self) -> usize {
        self.graph.len()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.is_empty()
    }
}
