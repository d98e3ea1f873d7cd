//! Building one package: resolve, link, detect changes, publish.

use std::sync::Arc;

use serde_json::Value;
use tandem_analysis::{BundleSpec, OxcAnalyzer, resolve_bundle};
use tandem_config::{DEFAULT_MANIFEST, PackageConfig, TandemConfig};
use tandem_graph::{PackageManifest, Runtime};
use tandem_link::LinkedBundle;

use crate::digest::{ContentDigest, content_digest};
use crate::error::{PackageFailure, Result};
use crate::files::collect_files;
use crate::lock::{PublishLock, VersionDecision};
use crate::manifest::build_manifest;
use crate::progress::{ProgressEvent, ProgressSink, report};
use crate::publish::{PublishLocation, PublishRequest, Publisher};

/// Shared state for every package of one run.
pub struct BuildContext {
    pub config: Arc<TandemConfig>,
    pub runtime: Arc<dyn Runtime>,
    pub publisher: Arc<dyn Publisher>,
    pub sink: Arc<dyn ProgressSink>,
    /// Lock as read at the start of the run.
    pub lock: PublishLock,
    /// Publish packages whose content is unchanged.
    pub force: bool,
}

/// One package to build and the already-built siblings it embeds.
#[derive(Debug, Clone)]
pub struct PackageJob {
    pub package: PackageConfig,
    /// In the order the package declares them, direct before peer.
    pub siblings: Vec<LinkedBundle>,
}

impl PackageJob {
    pub fn new(package: PackageConfig, prior: &[LinkedBundle]) -> Self {
        let siblings = package
            .embedded()
            .filter_map(|name| prior.iter().find(|bundle| bundle.name == name))
            .cloned()
            .collect();
        Self { package, siblings }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackageStatus {
    Published(PublishLocation),
    Unchanged,
}

/// A successfully built package.
#[derive(Debug, Clone)]
pub struct PackageArtifact {
    pub name: String,
    pub version: String,
    pub digest: ContentDigest,
    pub status: PackageStatus,
    pub manifest: Value,
    pub linked: LinkedBundle,
}

/// Build `job`, reporting progress and wrapping any error with the package
/// name.
pub async fn build_package(
    ctx: &BuildContext,
    job: PackageJob,
) -> std::result::Result<PackageArtifact, PackageFailure> {
    let name = job.package.name.clone();
    match run_package(ctx, &job).await {
        Ok(artifact) => {
            report(
                ctx.sink.as_ref(),
                ProgressEvent::Done {
                    package: name,
                    version: artifact.version.clone(),
                },
            );
            Ok(artifact)
        }
        Err(error) => {
            report(
                ctx.sink.as_ref(),
                ProgressEvent::Error {
                    package: name.clone(),
                    message: error.to_string(),
                },
            );
            Err(PackageFailure::new(name, error))
        }
    }
}

async fn run_package(ctx: &BuildContext, job: &PackageJob) -> Result<PackageArtifact> {
    let package = &job.package;
    let config = ctx.config.as_ref();
    let runtime = ctx.runtime.as_ref();
    let sink = ctx.sink.as_ref();
    let name = package.name.clone();

    report(sink, ProgressEvent::Resolving { package: name.clone() });
    let project_manifest = load_project_manifest(config, package, runtime).await?;
    let options = package.options(&config.defaults);
    let analyzer = OxcAnalyzer::new(
        &config.base_dir,
        options.module_resolution,
        Arc::clone(&ctx.runtime),
    );
    let spec = BundleSpec {
        name: name.clone(),
        project_root: config.base_dir.clone(),
        package_root: config.resolve(&package.root),
        entries: package.entries.clone(),
        include: package.include.clone(),
        options,
    };
    let bundle = resolve_bundle(&spec, &project_manifest, &analyzer, runtime).await?;

    report(
        sink,
        ProgressEvent::Linking {
            package: name.clone(),
            siblings: job.siblings.len(),
        },
    );
    let mut linked = tandem_link::link(&bundle, &package.version, &job.siblings)?;
    tracing::debug!(
        package = %name,
        files = linked.contents.len(),
        substituted = linked.substituted().count(),
        "linked against siblings"
    );

    report(
        sink,
        ProgressEvent::Building {
            package: name.clone(),
            files: linked.contents.len(),
        },
    );
    let files = collect_files(&linked, runtime).await?;
    let digest = content_digest(&build_manifest(&linked, package), &files);
    let decision = ctx.lock.decide(&name, &package.version, &digest)?;
    linked.version = decision.version().to_string();
    let manifest = build_manifest(&linked, package);

    let status = match decision {
        VersionDecision::Unchanged { version } if !ctx.force => {
            report(
                sink,
                ProgressEvent::Unchanged {
                    package: name.clone(),
                    version,
                },
            );
            PackageStatus::Unchanged
        }
        decision => {
            report(
                sink,
                ProgressEvent::Publishing {
                    package: name.clone(),
                    version: decision.version().to_string(),
                },
            );
            let request = PublishRequest {
                name: name.clone(),
                version: linked.version.clone(),
                manifest: manifest.clone(),
                files,
            };
            PackageStatus::Published(ctx.publisher.publish(&request).await?)
        }
    };

    Ok(PackageArtifact {
        name,
        version: linked.version.clone(),
        digest,
        status,
        manifest,
        linked,
    })
}

/// The package's project manifest; a missing default `package.json` counts
/// as empty.
async fn load_project_manifest(
    config: &TandemConfig,
    package: &PackageConfig,
    runtime: &dyn Runtime,
) -> Result<PackageManifest> {
    let path = config.resolve(&package.manifest);
    if !runtime.exists(&path) && package.manifest.as_os_str() == DEFAULT_MANIFEST {
        tracing::debug!(package = %package.name, path = %path.display(), "no project manifest");
        return Ok(PackageManifest::default());
    }
    Ok(PackageManifest::from_path(runtime, &path).await?)
}
