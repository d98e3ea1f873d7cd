//! Package scheduling.
//!
//! Packages form a directed graph, from each package to the sibling packages
//! it embeds. Builds run one generation at a time, leaves first; members of
//! a generation run concurrently and all of them settle before the next
//! generation starts.

use std::fmt;
use std::future::Future;

use futures::future::join_all;
use tandem_config::PackageConfig;
use tandem_graph::{DirectedGraph, GraphError};

/// A problem that prevents scheduling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphIssue {
    DuplicatePackage { package: String },
    SelfLoop { package: String },
    UnknownDependency { package: String, dependency: String },
    /// Ordered path with the first package repeated at the end.
    Cycle { path: Vec<String> },
}

impl fmt::Display for GraphIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GraphIssue::DuplicatePackage { package } => {
                write!(f, "package `{package}` is configured more than once")
            }
            GraphIssue::SelfLoop { package } => write!(f, "package `{package}` depends on itself"),
            GraphIssue::UnknownDependency {
                package,
                dependency,
            } => write!(
                f,
                "package `{package}` depends on `{dependency}`, which is not configured"
            ),
            GraphIssue::Cycle { path } => write!(f, "dependency cycle: {}", path.join(" → ")),
        }
    }
}

/// The configured packages as a dependency graph.
#[derive(Debug, Clone)]
pub struct PackageGraph {
    graph: DirectedGraph<PackageConfig>,
}

impl PackageGraph {
    /// Build the graph, reporting every issue found.
    pub fn from_packages(packages: &[PackageConfig]) -> Result<Self, Vec<GraphIssue>> {
        let mut graph = DirectedGraph::new();
        let mut issues = Vec::new();

        for package in packages {
            if graph.add_node(&package.name, package.clone()).is_err() {
                issues.push(GraphIssue::DuplicatePackage {
                    package: package.name.clone(),
                });
            }
        }

        for package in packages {
            for dependency in package.embedded() {
                if dependency == package.name {
                    issues.push(GraphIssue::SelfLoop {
                        package: package.name.clone(),
                    });
                } else if !graph.has_node(dependency) {
                    issues.push(GraphIssue::UnknownDependency {
                        package: package.name.clone(),
                        dependency: dependency.to_string(),
                    });
                } else if !graph.has_connection(&package.name, dependency) {
                    // Both endpoints exist and the edge is new.
                    if let Err(e) = graph.connect(&package.name, dependency) {
                        tracing::warn!(error = %e, "unexpected graph error");
                    }
                }
            }
        }

        for mut cycle in graph.detect_cycles() {
            if let Some(first) = cycle.first().cloned() {
                cycle.push(first);
            }
            issues.push(GraphIssue::Cycle { path: cycle });
        }

        if issues.is_empty() {
            Ok(Self { graph })
        } else {
            Err(issues)
        }
    }

    pub fn graph(&self) -> &DirectedGraph<PackageConfig> {
        &self.graph
    }

    pub fn package(&self, name: &str) -> Option<&PackageConfig> {
        self.graph.node(name)
    }

    /// Package names grouped into build generations, leaves first.
    pub fn generations(&self) -> Result<Vec<Vec<String>>, GraphError> {
        self.graph.topological_generations()
    }
}

/// Outcome of a run that stopped after a generation with failures.
#[derive(Debug)]
pub struct PartialFailure<R, E> {
    /// Results of every package that succeeded, in generation order.
    pub succeeded: Vec<R>,
    pub failures: Vec<E>,
}

impl<R, E: fmt::Display> fmt::Display for PartialFailure<R, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} package(s) succeeded, {} failed",
            self.succeeded.len(),
            self.failures.len()
        )?;
        for failure in &self.failures {
            write!(f, "\n  - {failure}")?;
        }
        Ok(())
    }
}

impl<R: fmt::Debug, E: std::error::Error> std::error::Error for PartialFailure<R, E> {}

/// Run `execute` for every node of `graph` in dependency order.
///
/// For each generation, `create_options` receives the node and a snapshot of
/// the artifacts selected (via `select_next`) from every package that
/// succeeded in earlier generations. All members of a generation are
/// awaited together; if any of them failed the run stops there, returning
/// what succeeded so far alongside the failures. Packages of generations
/// never started appear in neither list.
pub async fn run_for_each_scheduled_package<T, O, R, E, A, C, X, F, S>(
    graph: &DirectedGraph<T>,
    mut create_options: C,
    execute: X,
    mut select_next: S,
) -> Result<Vec<R>, PartialFailure<R, E>>
where
    C: FnMut(&str, &T, &[A]) -> O,
    X: Fn(O) -> F,
    F: Future<Output = Result<R, E>>,
    S: FnMut(&R) -> A,
    E: From<GraphError>,
{
    let generations = match graph.topological_generations() {
        Ok(generations) => generations,
        Err(e) => {
            return Err(PartialFailure {
                succeeded: Vec::new(),
                failures: vec![e.into()],
            });
        }
    };

    let mut artifacts: Vec<A> = Vec::new();
    let mut succeeded: Vec<R> = Vec::new();

    for (index, generation) in generations.iter().enumerate() {
        let mut pending = Vec::with_capacity(generation.len());
        for id in generation {
            match graph.node(id) {
                Some(data) => pending.push(execute(create_options(id, data, &artifacts))),
                None => {
                    return Err(PartialFailure {
                        succeeded,
                        failures: vec![GraphError::NodeNotFound(id.clone()).into()],
                    });
                }
            }
        }

        tracing::debug!(generation = index, members = pending.len(), "running generation");

        let mut failures = Vec::new();
        for result in join_all(pending).await {
            match result {
                Ok(result) => {
                    artifacts.push(select_next(&result));
                    succeeded.push(result);
                }
                Err(e) => failures.push(e),
            }
        }

        if !failures.is_empty() {
            return Err(PartialFailure {
                succeeded,
                failures,
            });
        }
    }

    Ok(succeeded)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use parking_lot::Mutex;
    use pretty_assertions::assert_eq;
    use tandem_analysis::EntryPoint;

    use super::*;

    fn package(name: &str, deps: &[&str]) -> PackageConfig {
        let mut package = PackageConfig::new(name, "1.0.0", "build")
            .with_entry(EntryPoint::new(format!("build/{name}.js")));
        package.dependencies = deps.iter().map(|d| d.to_string()).collect();
        package
    }

    #[derive(Debug, PartialEq)]
    struct Failed(String);

    impl From<GraphError> for Failed {
        fn from(error: GraphError) -> Self {
            Failed(error.to_string())
        }
    }

    #[test]
    fn generations_put_leaves_first() {
        let graph =
            PackageGraph::from_packages(&[package("a", &["b"]), package("b", &["c"]), package("c", &[])])
                .unwrap();
        assert_eq!(
            graph.generations().unwrap(),
            vec![vec!["c".to_string()], vec!["b".to_string()], vec!["a".to_string()]]
        );
    }

    #[test]
    fn cycles_are_rejected_with_their_path() {
        let issues =
            PackageGraph::from_packages(&[package("a", &["b"]), package("b", &["a"])]).unwrap_err();
        assert_eq!(
            issues,
            vec![GraphIssue::Cycle {
                path: vec!["a".to_string(), "b".to_string(), "a".to_string()]
            }]
        );
        assert_eq!(issues[0].to_string(), "dependency cycle: a → b → a");
    }

    #[test]
    fn every_issue_is_collected() {
        let mut peer = package("p", &[]);
        peer.peer_dependencies.push("p".to_string());
        let issues = PackageGraph::from_packages(&[
            package("a", &["ghost"]),
            package("a", &[]),
            peer,
        ])
        .unwrap_err();
        assert_eq!(
            issues,
            vec![
                GraphIssue::DuplicatePackage {
                    package: "a".to_string()
                },
                GraphIssue::UnknownDependency {
                    package: "a".to_string(),
                    dependency: "ghost".to_string()
                },
                GraphIssue::SelfLoop {
                    package: "p".to_string()
                },
            ]
        );
    }

    #[test]
    fn direct_and_peer_edges_are_merged() {
        let mut app = package("app", &["core"]);
        app.peer_dependencies.push("core".to_string());
        let graph = PackageGraph::from_packages(&[package("core", &[]), app]).unwrap();
        assert_eq!(graph.graph().adjacent_ids("app").unwrap(), vec!["core"]);
    }

    #[tokio::test]
    async fn artifacts_flow_between_generations() {
        let graph =
            PackageGraph::from_packages(&[package("a", &["b"]), package("b", &["c"]), package("c", &[])])
                .unwrap();
        let seen: Arc<Mutex<Vec<(String, Vec<String>)>>> = Arc::default();

        let result = run_for_each_scheduled_package(
            graph.graph(),
            |id, _, prior: &[String]| {
                seen.lock().push((id.to_string(), prior.to_vec()));
                id.to_string()
            },
            |id| async move { Ok::<_, Failed>(id) },
            |built| format!("{built}@1"),
        )
        .await
        .unwrap();

        assert_eq!(result, vec!["c", "b", "a"]);
        assert_eq!(
            *seen.lock(),
            vec![
                ("c".to_string(), vec![]),
                ("b".to_string(), vec!["c@1".to_string()]),
                ("a".to_string(), vec!["c@1".to_string(), "b@1".to_string()]),
            ]
        );
    }

    #[tokio::test]
    async fn middle_failure_keeps_completed_work() {
        let graph =
            PackageGraph::from_packages(&[package("a", &["b"]), package("b", &["c"]), package("c", &[])])
                .unwrap();

        let err = run_for_each_scheduled_package(
            graph.graph(),
            |id, _, _: &[String]| id.to_string(),
            |id| async move {
                if id == "b" {
                    Err(Failed(format!("{id} broke")))
                } else {
                    Ok(id)
                }
            },
            |built| built.clone(),
        )
        .await
        .unwrap_err();

        assert_eq!(err.succeeded, vec!["c"]);
        assert_eq!(err.failures, vec![Failed("b broke".to_string())]);
    }

    #[tokio::test]
    async fn siblings_in_a_generation_are_isolated() {
        let graph = PackageGraph::from_packages(&[
            package("x", &[]),
            package("y", &[]),
            package("top", &["x", "y"]),
        ])
        .unwrap();

        let err = run_for_each_scheduled_package(
            graph.graph(),
            |id, _, _: &[()]| id.to_string(),
            |id| async move {
                if id == "x" {
                    Err(Failed("x broke".to_string()))
                } else {
                    Ok(id)
                }
            },
            |_| (),
        )
        .await
        .unwrap_err();

        assert_eq!(err.succeeded, vec!["y"]);
        assert_eq!(err.failures.len(), 1);
    }

    #[tokio::test]
    async fn cyclic_graph_fails_before_running() {
        let mut graph: DirectedGraph<()> = DirectedGraph::new();
        graph.add_node("a", ()).unwrap();
        graph.add_node("b", ()).unwrap();
        graph.connect("a", "b").unwrap();
        graph.connect("b", "a").unwrap();

        let ran = Arc::new(Mutex::new(0));
        let err = run_for_each_scheduled_package(
            &graph,
            |id, _, _: &[()]| id.to_string(),
            |id| {
                let ran = Arc::clone(&ran);
                async move {
                    *ran.lock() += 1;
                    Ok::<_, Failed>(id)
                }
            },
            |_| (),
        )
        .await
        .unwrap_err();

        assert!(err.succeeded.is_empty());
        assert_eq!(err.failures.len(), 1);
        assert_eq!(*ran.lock(), 0);
    }
}
