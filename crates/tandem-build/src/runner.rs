//! Building every configured package.

use std::sync::Arc;

use tandem_config::{PackageConfig, TandemConfig};
use tandem_graph::Runtime;
use tandem_link::LinkedBundle;

use crate::error::{BuildError, PackageFailure, Result};
use crate::lock::PublishLock;
use crate::pipeline::{BuildContext, PackageArtifact, PackageJob, PackageStatus, build_package};
use crate::progress::{ProgressEvent, ProgressSink, report};
use crate::publish::Publisher;
use crate::scheduler::{PackageGraph, PartialFailure, run_for_each_scheduled_package};

#[derive(Debug, Clone, Copy, Default)]
pub struct BuildOptions {
    /// Publish packages even when their content is unchanged.
    pub force: bool,
    /// Rewrite the lock file after the run.
    pub write_lock: bool,
}

/// What a run produced.
#[derive(Debug, Default)]
pub struct BuildSummary {
    /// Built packages in generation order.
    pub succeeded: Vec<PackageArtifact>,
    pub failures: Vec<PackageFailure>,
}

impl BuildSummary {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn published(&self) -> impl Iterator<Item = &PackageArtifact> {
        self.succeeded
            .iter()
            .filter(|artifact| matches!(artifact.status, PackageStatus::Published(_)))
    }

    pub fn unchanged(&self) -> impl Iterator<Item = &PackageArtifact> {
        self.succeeded
            .iter()
            .filter(|artifact| artifact.status == PackageStatus::Unchanged)
    }
}

impl From<std::result::Result<Vec<PackageArtifact>, PartialFailure<PackageArtifact, PackageFailure>>>
    for BuildSummary
{
    fn from(
        outcome: std::result::Result<Vec<PackageArtifact>, PartialFailure<PackageArtifact, PackageFailure>>,
    ) -> Self {
        match outcome {
            Ok(succeeded) => Self {
                succeeded,
                failures: Vec::new(),
            },
            Err(PartialFailure {
                succeeded,
                failures,
            }) => Self {
                succeeded,
                failures,
            },
        }
    }
}

/// Validate `config`, then build and publish every package in dependency
/// order.
///
/// Configuration and graph problems fail the whole run before any package
/// starts. Package failures do not: they are collected in the summary next
/// to everything that succeeded.
pub async fn build_all(
    config: TandemConfig,
    runtime: Arc<dyn Runtime>,
    publisher: Arc<dyn Publisher>,
    sink: Arc<dyn ProgressSink>,
    options: BuildOptions,
) -> Result<BuildSummary> {
    config.validate()?;
    let graph = PackageGraph::from_packages(&config.packages)
        .map_err(|issues| BuildError::Schedule { issues })?;

    for (generation, names) in graph.generations()?.iter().enumerate() {
        for package in names {
            report(
                sink.as_ref(),
                ProgressEvent::Scheduled {
                    package: package.clone(),
                    generation,
                },
            );
        }
    }

    let lock_path = config.lock_file();
    let lock = PublishLock::load(&lock_path, runtime.as_ref()).await?;

    tracing::info!(packages = config.packages.len(), "build started");

    let ctx = BuildContext {
        config: Arc::new(config),
        runtime,
        publisher,
        sink,
        lock,
        force: options.force,
    };
    let ctx = &ctx;

    let outcome = run_for_each_scheduled_package(
        graph.graph(),
        |_, package: &PackageConfig, prior: &[LinkedBundle]| PackageJob::new(package.clone(), prior),
        |job| build_package(ctx, job),
        |artifact: &PackageArtifact| artifact.linked.clone(),
    )
    .await;
    let summary = BuildSummary::from(outcome);

    if options.write_lock && !summary.succeeded.is_empty() {
        let mut lock = ctx.lock.clone();
        for artifact in &summary.succeeded {
            lock.set(&artifact.name, &artifact.version, artifact.digest.clone());
        }
        lock.save(&lock_path, ctx.runtime.as_ref()).await?;
    }

    tracing::info!(
        succeeded = summary.succeeded.len(),
        failed = summary.failures.len(),
        "build finished"
    );
    Ok(summary)
}
