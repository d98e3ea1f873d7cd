//! Substitution: import already-shipped files from sibling packages.

use std::path::PathBuf;

use indexmap::IndexMap;
use tandem_graph::DirectedGraph;

use crate::error::{LinkError, Result};
use crate::graph::{ResourceGraph, ResourceNode};
use crate::linked::{LinkedBundle, LinkedResource};
use crate::rewrite::rewrite_specifiers;

/// First sibling content entry with exactly this source path.
fn find_in_siblings<'b>(
    source: &std::path::Path,
    siblings: &'b [LinkedBundle],
) -> Option<(&'b LinkedBundle, &'b LinkedResource)> {
    siblings.iter().find_map(|bundle| {
        bundle
            .contents
            .iter()
            .find(|resource| resource.source_file_path == source)
            .map(|resource| (bundle, resource))
    })
}

/// Rewrite every file whose direct dependency is already shipped by one of
/// `siblings`.
///
/// Siblings are searched in order and the first match wins. A match
/// replaces the edge with a rewritten specifier
/// `"<sibling name>/<sibling target path>"`; unmatched edges are kept.
/// Siblings must already be fully linked.
pub fn substitute(graph: &ResourceGraph, siblings: &[LinkedBundle]) -> Result<ResourceGraph> {
    let mut output: DirectedGraph<ResourceNode> = DirectedGraph::new();
    for node in graph.graph.nodes() {
        output.add_node(node.id(), node.data().clone())?;
    }

    let mut bundle_dependencies = graph.bundle_dependencies.clone();

    for node in graph.graph.nodes() {
        let id = node.id();
        let mut rewrites: IndexMap<PathBuf, String> = IndexMap::new();

        for dependency_id in graph.graph.adjacent_ids(id)? {
            let Some(dependency) = graph.graph.node(dependency_id) else {
                continue;
            };
            let source = dependency.source_file_path();

            match find_in_siblings(source, siblings) {
                Some((sibling, resource)) => {
                    rewrites.insert(
                        source.to_path_buf(),
                        format!("{}/{}", sibling.name, resource.target_file_path),
                    );
                    bundle_dependencies.record(
                        &sibling.name,
                        &sibling.version,
                        node.data().source_file_path(),
                    );
                }
                None => output.connect(id, dependency_id)?,
            }
        }

        if rewrites.is_empty() {
            continue;
        }

        let data = node.data();
        let context = data
            .entry
            .context
            .as_ref()
            .ok_or_else(|| LinkError::MissingContext {
                path: data.source_file_path().to_path_buf(),
            })?;

        let Some(target) = output.node_mut(id) else {
            continue;
        };
        target.rewrites.extend(rewrites);
        target.substituted_content = Some(rewrite_specifiers(context, &target.rewrites));
        target.is_substituted = true;
        let rewritten = &target.rewrites;
        target
            .entry
            .direct_dependencies
            .retain(|dependency| !rewritten.contains_key(dependency));

        tracing::debug!(
            package = %graph.name,
            file = %target.entry.source_file_path.display(),
            rewrites = target.rewrites.len(),
            "substituted imports"
        );
    }

    Ok(ResourceGraph {
        name: graph.name.clone(),
        version: graph.version.clone(),
        graph: output,
        entry_points: graph.entry_points.clone(),
        bundle_dependencies,
        external_dependencies: graph.external_dependencies.clone(),
    })
}
