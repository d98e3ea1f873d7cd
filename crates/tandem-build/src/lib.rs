//! # tandem-build
//!
//! Builds and publishes the configured packages in dependency order.
//!
//! ```text
//! TandemConfig ──► PackageGraph ──► generations ──► per package:
//!     resolve_bundle ──► link (siblings) ──► manifest ──► digest ──► lock ──► Publisher
//! ```
//!
//! Packages of one generation build concurrently. When a package fails,
//! the generation still settles, nothing later starts, and the run reports
//! what succeeded next to what failed.

mod digest;
mod error;
mod files;
mod lock;
mod manifest;
mod pipeline;
mod progress;
mod publish;
mod runner;
pub mod scheduler;

pub use digest::{ContentDigest, content_digest};
pub use error::{BuildError, PackageFailure, Result};
pub use files::{PackageFile, collect_files, is_contained};
pub use lock::{LockedPackage, PublishLock, VersionDecision};
pub use manifest::{build_manifest, dependency_sections};
pub use pipeline::{BuildContext, PackageArtifact, PackageJob, PackageStatus, build_package};
pub use progress::{NoopSink, ProgressEvent, ProgressSink, RecordingSink};
pub use publish::{DirectoryPublisher, DryRunPublisher, PublishLocation, PublishRequest, Publisher};
pub use runner::{BuildOptions, BuildSummary, build_all};
pub use scheduler::{GraphIssue, PackageGraph, PartialFailure, run_for_each_scheduled_package};
