//! Linked bundles: the final file list of a package.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};
use tandem_analysis::{EntryPoint, SourceContext};
use tandem_graph::{DependencyLedger, GraphError};

use crate::error::Result;
use crate::graph::{ResourceGraph, resource_id};

/// One file of a linked bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkedResource {
    pub source_file_path: PathBuf,
    pub target_file_path: String,
    pub direct_dependencies: IndexSet<PathBuf>,
    pub context: Option<Arc<SourceContext>>,
    /// Content was rewritten to import from a sibling package.
    pub is_substituted: bool,
    /// Shipped because it was listed, not because something imports it.
    pub is_explicitly_included: bool,
    pub substituted_content: Option<String>,
}

impl LinkedResource {
    /// Text content when known without touching the filesystem.
    pub fn inline_content(&self) -> Option<&str> {
        self.substituted_content
            .as_deref()
            .or_else(|| self.context.as_ref().map(|context| context.source.as_str()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkedBundle {
    pub name: String,
    pub version: String,
    pub contents: Vec<LinkedResource>,
    pub entry_points: Vec<EntryPoint>,
    /// Sibling packages the contents now import from.
    pub bundle_dependencies: DependencyLedger,
    /// Third-party packages the contents import.
    pub external_dependencies: DependencyLedger,
}

impl LinkedBundle {
    pub fn resource(&self, source: &Path) -> Option<&LinkedResource> {
        self.contents
            .iter()
            .find(|resource| resource.source_file_path == source)
    }

    pub fn substituted(&self) -> impl Iterator<Item = &LinkedResource> {
        self.contents.iter().filter(|resource| resource.is_substituted)
    }
}

impl ResourceGraph {
    /// Collect the final file list.
    ///
    /// Walks breadth-first from every entry point (import and types) and
    /// then from every explicitly included file; the first visit of a file
    /// wins. A file's source map is emitted right after it. Ledgers keep
    /// only references made by files that are still shipped.
    pub fn flatten(&self) -> Result<LinkedBundle> {
        let mut starts: Vec<String> = Vec::new();
        for entry in &self.entry_points {
            starts.push(resource_id(&entry.import));
            if let Some(types) = &entry.types {
                starts.push(resource_id(types));
            }
        }
        starts.extend(
            self.graph
                .nodes()
                .filter(|node| node.data().entry.is_explicitly_included)
                .map(|node| node.id().to_string()),
        );

        let mut order: IndexMap<String, ()> = IndexMap::new();
        for start in &starts {
            if !self.graph.has_node(start) {
                return Err(GraphError::NodeNotFound(start.clone()).into());
            }
            if order.contains_key(start) {
                continue;
            }
            self.graph.visit_breadth_first_search(start, |id, _| {
                order.entry(id.to_string()).or_insert(());
            })?;
        }

        // Source maps follow their owner, and go with it.
        let mut emitted: IndexSet<String> = IndexSet::new();
        for id in order.keys() {
            emitted.insert(id.clone());
            let map = self
                .graph
                .node(id)
                .and_then(|node| node.entry.source_map.as_deref())
                .map(resource_id)
                .filter(|map| self.graph.has_node(map));
            if let Some(map) = map {
                emitted.insert(map);
            }
        }

        let contents: Vec<LinkedResource> = emitted
            .iter()
            .filter_map(|id| self.graph.node(id))
            .map(|node| LinkedResource {
                source_file_path: node.entry.source_file_path.clone(),
                target_file_path: node.entry.target_file_path.clone(),
                direct_dependencies: node.entry.direct_dependencies.clone(),
                context: node.entry.context.clone(),
                is_substituted: node.is_substituted,
                is_explicitly_included: node.entry.is_explicitly_included,
                substituted_content: node.substituted_content.clone(),
            })
            .collect();

        let present: IndexSet<&Path> = contents
            .iter()
            .map(|resource| resource.source_file_path.as_path())
            .collect();

        let bundle_dependencies = self
            .bundle_dependencies
            .retain_importers(|file| present.contains(file));
        let external_dependencies = self
            .external_dependencies
            .retain_importers(|file| present.contains(file));

        tracing::debug!(
            package = %self.name,
            files = contents.len(),
            siblings = bundle_dependencies.len(),
            packages = external_dependencies.len(),
            "bundle linked"
        );

        Ok(LinkedBundle {
            name: self.name.clone(),
            version: self.version.clone(),
            contents,
            entry_points: self.entry_points.clone(),
            bundle_dependencies,
            external_dependencies,
        })
    }
}
