//! Generic directed graph keyed by string ids.
//!
//! Nodes live in an index-addressed arena. Adjacency is an insertion-ordered
//! set of arena indices, so every traversal is deterministic: neighbours are
//! always visited in the order they were connected.

use std::collections::VecDeque;

use indexmap::IndexSet;
use rustc_hash::{FxHashMap, FxHashSet};

/// Errors raised by graph mutations and queries.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    #[error("node '{0}' already exists")]
    NodeExists(String),

    #[error("node '{0}' does not exist")]
    NodeNotFound(String),

    #[error("connection '{from}' -> '{to}' already exists")]
    ConnectionExists { from: String, to: String },

    #[error("connection '{from}' -> '{to}' does not exist")]
    ConnectionNotFound { from: String, to: String },

    /// Topological ordering was requested on a graph that still has cycles.
    #[error("graph contains a cycle through: {}", .0.join(", "))]
    Cyclic(Vec<String>),
}

/// A single node in the arena.
#[derive(Debug, Clone)]
pub struct Node<T> {
    id: String,
    data: T,
    adjacent: IndexSet<usize>,
}

impl<T> Node<T> {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn data(&self) -> &T {
        &self.data
    }
}

/// Directed graph with string ids and arbitrary node payloads.
#[derive(Debug, Clone)]
pub struct DirectedGraph<T> {
    nodes: Vec<Node<T>>,
    index: FxHashMap<String, usize>,
}

impl<T> Default for DirectedGraph<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> DirectedGraph<T> {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            index: FxHashMap::default(),
        }
    }

    /// Add a node. Ids are unique for the lifetime of the graph.
    pub fn add_node(&mut self, id: impl Into<String>, data: T) -> Result<(), GraphError> {
        let id = id.into();
        if self.index.contains_key(&id) {
            return Err(GraphError::NodeExists(id));
        }

        self.index.insert(id.clone(), self.nodes.len());
        self.nodes.push(Node {
            id,
            data,
            adjacent: IndexSet::new(),
        });
        Ok(())
    }

    pub fn has_node(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn node(&self, id: &str) -> Option<&T> {
        self.index.get(id).map(|&idx| &self.nodes[idx].data)
    }

    pub fn node_mut(&mut self, id: &str) -> Option<&mut T> {
        match self.index.get(id) {
            Some(&idx) => Some(&mut self.nodes[idx].data),
            None => None,
        }
    }

    /// Connect `from` to `to`. Both nodes must exist and the edge must be new.
    pub fn connect(&mut self, from: &str, to: &str) -> Result<(), GraphError> {
        let (from_idx, to_idx) = self.endpoints(from, to)?;
        if !self.nodes[from_idx].adjacent.insert(to_idx) {
            return Err(GraphError::ConnectionExists {
                from: from.to_string(),
                to: to.to_string(),
            });
        }
        Ok(())
    }

    /// Remove the edge `from` -> `to`. The edge must exist.
    pub fn disconnect(&mut self, from: &str, to: &str) -> Result<(), GraphError> {
        let (from_idx, to_idx) = self.endpoints(from, to)?;
        // shift_remove keeps the remaining neighbours in insertion order
        if !self.nodes[from_idx].adjacent.shift_remove(&to_idx) {
            return Err(GraphError::ConnectionNotFound {
                from: from.to_string(),
                to: to.to_string(),
            });
        }
        Ok(())
    }

    pub fn has_connection(&self, from: &str, to: &str) -> bool {
        match (self.index.get(from), self.index.get(to)) {
            (Some(&f), Some(&t)) => self.nodes[f].adjacent.contains(&t),
            _ => false,
        }
    }

    /// Ids directly reachable from `id`, in connection order.
    pub fn adjacent_ids(&self, id: &str) -> Result<Vec<&str>, GraphError> {
        let idx = self.lookup(id)?;
        Ok(self.nodes[idx]
            .adjacent
            .iter()
            .map(|&n| self.nodes[n].id.as_str())
            .collect())
    }

    /// All ids in insertion order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(|n| n.id.as_str())
    }

    /// All nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node<T>> {
        self.nodes.iter()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Breadth-first traversal from `start`.
    ///
    /// The start node is visited first, then every not-yet-visited neighbour
    /// in connection order. Each id is visited exactly once, including in the
    /// presence of cycles and self-loops.
    pub fn visit_breadth_first_search<F>(&self, start: &str, mut visitor: F) -> Result<(), GraphError>
    where
        F: FnMut(&str, &T),
    {
        let start_idx = self.lookup(start)?;
        let mut seen = FxHashSet::default();
        let mut queue = VecDeque::new();

        seen.insert(start_idx);
        queue.push_back(start_idx);

        while let Some(idx) = queue.pop_front() {
            let node = &self.nodes[idx];
            visitor(&node.id, &node.data);

            for &next in &node.adjacent {
                if seen.insert(next) {
                    queue.push_back(next);
                }
            }
        }

        Ok(())
    }

    /// Every cycle found as a back-edge to an ancestor on the current
    /// depth-first path, searching from each node in turn.
    ///
    /// Each cycle is the ordered id path; the closing id is implied. A cycle
    /// already reported from another starting node is not repeated.
    ///
    /// Nodes are re-entered on every distinct path, so each simple cycle is
    /// found even when it shares nodes with one reported earlier. The search
    /// is exponential in the worst case and meant for package-sized graphs.
    pub fn detect_cycles(&self) -> Vec<Vec<String>> {
        let mut cycles: Vec<Vec<usize>> = Vec::new();
        let mut reported: FxHashSet<Vec<usize>> = FxHashSet::default();

        for start in 0..self.nodes.len() {
            // (node, next neighbour position)
            let mut stack: Vec<(usize, usize)> = vec![(start, 0)];
            let mut on_path: Vec<usize> = vec![start];

            while let Some(frame) = stack.last_mut() {
                let (idx, cursor) = *frame;
                let Some(&next) = self.nodes[idx].adjacent.get_index(cursor) else {
                    stack.pop();
                    on_path.pop();
                    continue;
                };
                frame.1 += 1;

                if let Some(pos) = on_path.iter().position(|&n| n == next) {
                    let cycle = on_path[pos..].to_vec();
                    if reported.insert(canonical_rotation(&cycle)) {
                        cycles.push(cycle);
                    }
                } else {
                    stack.push((next, 0));
                    on_path.push(next);
                }
            }
        }

        cycles
            .into_iter()
            .map(|cycle| cycle.into_iter().map(|i| self.nodes[i].id.clone()).collect())
            .collect()
    }

    /// Batches of ids in dependency order, leaves first.
    ///
    /// Generation `k` holds exactly the nodes whose out-edges all point into
    /// generations `< k`. Members of a generation keep insertion order.
    pub fn topological_generations(&self) -> Result<Vec<Vec<String>>, GraphError> {
        let mut remaining: Vec<usize> = self.nodes.iter().map(|n| n.adjacent.len()).collect();
        let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); self.nodes.len()];
        for (idx, node) in self.nodes.iter().enumerate() {
            for &target in &node.adjacent {
                dependents[target].push(idx);
            }
        }

        let mut resolved = vec![false; self.nodes.len()];
        let mut current: Vec<usize> = (0..self.nodes.len())
            .filter(|&idx| remaining[idx] == 0)
            .collect();
        let mut generations = Vec::new();
        let mut resolved_count = 0;

        while !current.is_empty() {
            for &idx in &current {
                resolved[idx] = true;
            }
            resolved_count += current.len();

            let mut next = Vec::new();
            for &idx in &current {
                for &dependent in &dependents[idx] {
                    remaining[dependent] -= 1;
                    if remaining[dependent] == 0 && !resolved[dependent] {
                        next.push(dependent);
                    }
                }
            }
            next.sort_unstable();
            next.dedup();

            generations.push(current.iter().map(|&i| self.nodes[i].id.clone()).collect());
            current = next;
        }

        if resolved_count != self.nodes.len() {
            let stuck = (0..self.nodes.len())
                .filter(|&idx| !resolved[idx])
                .map(|idx| self.nodes[idx].id.clone())
                .collect();
            return Err(GraphError::Cyclic(stuck));
        }

        Ok(generations)
    }

    fn lookup(&self, id: &str) -> Result<usize, GraphError> {
        self.index
            .get(id)
            .copied()
            .ok_or_else(|| GraphError::NodeNotFound(id.to_string()))
    }

    fn endpoints(&self, from: &str, to: &str) -> Result<(usize, usize), GraphError> {
        Ok((self.lookup(from)?, self.lookup(to)?))
    }
}

/// Rotate a cycle so that its smallest index comes first.
fn canonical_rotation(cycle: &[usize]) -> Vec<usize> {
    let pivot = cycle
        .iter()
        .enumerate()
        .min_by_key(|(_, idx)| **idx)
        .map(|(pos, _)| pos)
        .unwrap_or(0);
    cycle[pivot..].iter().chain(&cycle[..pivot]).copied().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn graph(ids: &[&str], edges: &[(&str, &str)]) -> DirectedGraph<()> {
        let mut graph = DirectedGraph::new();
        for id in ids {
            graph.add_node(*id, ()).unwrap();
        }
        for (from, to) in edges {
            graph.connect(from, to).unwrap();
        }
        graph
    }

    fn bfs(graph: &DirectedGraph<()>, start: &str) -> Vec<String> {
        let mut order = Vec::new();
        graph
            .visit_breadth_first_search(start, |id, _| order.push(id.to_string()))
            .unwrap();
        order
    }

    #[test]
    fn add_node_rejects_duplicates() {
        let mut graph = DirectedGraph::new();
        graph.add_node("a", 1).unwrap();
        assert_eq!(
            graph.add_node("a", 2),
            Err(GraphError::NodeExists("a".to_string()))
        );
        assert_eq!(graph.node("a"), Some(&1));
    }

    #[test]
    fn connect_requires_known_endpoints() {
        let mut graph = graph(&["a"], &[]);
        assert_eq!(
            graph.connect("a", "missing"),
            Err(GraphError::NodeNotFound("missing".to_string()))
        );
        assert_eq!(
            graph.connect("missing", "a"),
            Err(GraphError::NodeNotFound("missing".to_string()))
        );
    }

    #[test]
    fn connect_rejects_duplicate_edges() {
        let mut graph = graph(&["a", "b"], &[("a", "b")]);
        assert!(matches!(
            graph.connect("a", "b"),
            Err(GraphError::ConnectionExists { .. })
        ));
        assert!(graph.has_connection("a", "b"));
        assert!(!graph.has_connection("b", "a"));
    }

    #[test]
    fn disconnect_requires_existing_edge() {
        let mut graph = graph(&["a", "b", "c"], &[("a", "b"), ("a", "c")]);
        assert!(matches!(
            graph.disconnect("b", "a"),
            Err(GraphError::ConnectionNotFound { .. })
        ));

        graph.disconnect("a", "b").unwrap();
        assert!(!graph.has_connection("a", "b"));
        assert_eq!(graph.adjacent_ids("a").unwrap(), vec!["c"]);
    }

    #[test]
    fn bfs_visits_in_connection_order() {
        let graph = graph(
            &["entry", "a", "b", "c"],
            &[("entry", "a"), ("entry", "b"), ("a", "c"), ("b", "c")],
        );
        assert_eq!(bfs(&graph, "entry"), vec!["entry", "a", "b", "c"]);
    }

    #[test]
    fn bfs_survives_cycles_and_self_loops() {
        let graph = graph(&["a", "b"], &[("a", "a"), ("a", "b"), ("b", "a")]);
        assert_eq!(bfs(&graph, "a"), vec!["a", "b"]);
    }

    #[test]
    fn bfs_unknown_start_fails() {
        let graph = graph(&["a"], &[]);
        assert!(graph.visit_breadth_first_search("nope", |_, _| {}).is_err());
    }

    #[test]
    fn generations_are_leaves_first() {
        let graph = graph(&["a", "b", "c"], &[("a", "b"), ("b", "c")]);
        assert_eq!(
            graph.topological_generations().unwrap(),
            vec![vec!["c"], vec!["b"], vec!["a"]]
        );
    }

    #[test]
    fn generations_batch_independent_nodes() {
        let graph = graph(
            &["app", "ui", "core", "utils"],
            &[("app", "ui"), ("app", "core"), ("ui", "core"), ("core", "utils")],
        );
        assert_eq!(
            graph.topological_generations().unwrap(),
            vec![vec!["utils"], vec!["core"], vec!["ui"], vec!["app"]]
        );

        let graph = graph_with_isolated();
        assert_eq!(
            graph.topological_generations().unwrap(),
            vec![vec!["x", "y"], vec!["z"]]
        );
    }

    fn graph_with_isolated() -> DirectedGraph<()> {
        graph(&["x", "y", "z"], &[("z", "x"), ("z", "y")])
    }

    #[test]
    fn generations_reject_cycles() {
        let graph = graph(&["a", "b", "c"], &[("a", "b"), ("b", "a")]);
        assert_eq!(
            graph.topological_generations(),
            Err(GraphError::Cyclic(vec!["a".to_string(), "b".to_string()]))
        );
    }

    #[test]
    fn detect_cycles_reports_each_cycle_once() {
        let graph = graph(&["a", "b", "c"], &[("a", "b"), ("b", "a"), ("b", "c")]);
        assert_eq!(graph.detect_cycles(), vec![vec!["a", "b"]]);
    }

    #[test]
    fn detect_cycles_reports_cycles_sharing_nodes() {
        let graph = graph(
            &["x", "y", "z", "w"],
            &[("x", "y"), ("y", "z"), ("z", "x"), ("x", "w"), ("w", "z")],
        );
        assert_eq!(
            graph.detect_cycles(),
            vec![vec!["x", "y", "z"], vec!["x", "w", "z"]]
        );
    }

    #[test]
    fn detect_cycles_reports_self_loops() {
        let graph = graph(&["a", "b"], &[("a", "b"), ("b", "b")]);
        assert_eq!(graph.detect_cycles(), vec![vec!["b"]]);
    }

    #[test]
    fn detect_cycles_on_acyclic_graph_is_empty() {
        let graph = graph(&["a", "b", "c"], &[("a", "b"), ("a", "c"), ("b", "c")]);
        assert!(graph.detect_cycles().is_empty());
    }
}
