//! Publishing seam.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tandem_graph::Runtime;

use crate::error::{BuildError, Result};
use crate::files::{PackageFile, is_contained};

/// Everything needed to publish one package version.
#[derive(Debug, Clone)]
pub struct PublishRequest {
    pub name: String,
    pub version: String,
    /// The generated `package.json`.
    pub manifest: Value,
    pub files: Vec<PackageFile>,
}

impl PublishRequest {
    /// First target path that would land outside the package directory.
    pub fn escaping_target(&self) -> Option<&str> {
        self.files
            .iter()
            .map(|file| file.target.as_str())
            .find(|target| !is_contained(target))
    }
}

/// Where a published package ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishLocation {
    Directory(PathBuf),
    Skipped,
}

#[async_trait]
pub trait Publisher: Send + Sync {
    async fn publish(&self, request: &PublishRequest) -> Result<PublishLocation>;
}

/// Writes each package to `<out_dir>/<package name>/`.
#[derive(Debug, Clone)]
pub struct DirectoryPublisher {
    out_dir: PathBuf,
    runtime: Arc<dyn Runtime>,
}

impl DirectoryPublisher {
    pub fn new(out_dir: impl Into<PathBuf>, runtime: Arc<dyn Runtime>) -> Self {
        Self {
            out_dir: out_dir.into(),
            runtime,
        }
    }

    pub fn package_dir(&self, name: &str) -> PathBuf {
        name.split('/')
            .fold(self.out_dir.clone(), |dir, segment| dir.join(segment))
    }

    async fn write(&self, path: PathBuf, contents: &[u8]) -> Result<()> {
        let io = |source| BuildError::Io {
            path: path.clone(),
            source,
        };
        if let Some(parent) = path.parent() {
            self.runtime.create_dir(parent, true).await.map_err(io)?;
        }
        self.runtime.write_file(&path, contents).await.map_err(io)
    }
}

#[async_trait]
impl Publisher for DirectoryPublisher {
    async fn publish(&self, request: &PublishRequest) -> Result<PublishLocation> {
        if let Some(target) = request.escaping_target() {
            return Err(BuildError::EscapingPath {
                package: request.name.clone(),
                target: target.to_string(),
            });
        }
        if !is_contained(&request.name.replace('@', "")) {
            return Err(BuildError::Publish {
                package: request.name.clone(),
                message: "package name is not a valid directory name".to_string(),
            });
        }

        let dir = self.package_dir(&request.name);
        for file in &request.files {
            let path = file
                .target
                .split('/')
                .fold(dir.clone(), |path, segment| path.join(segment));
            self.write(path, &file.contents).await?;
        }

        let mut manifest =
            serde_json::to_string_pretty(&request.manifest).map_err(|e| BuildError::Publish {
                package: request.name.clone(),
                message: e.to_string(),
            })?;
        manifest.push('\n');
        self.write(dir.join("package.json"), manifest.as_bytes()).await?;

        tracing::info!(
            package = %request.name,
            version = %request.version,
            files = request.files.len(),
            dir = %dir.display(),
            "package written"
        );
        Ok(PublishLocation::Directory(dir))
    }
}

/// Logs what would be published and writes nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct DryRunPublisher;

#[async_trait]
impl Publisher for DryRunPublisher {
    async fn publish(&self, request: &PublishRequest) -> Result<PublishLocation> {
        if let Some(target) = request.escaping_target() {
            return Err(BuildError::EscapingPath {
                package: request.name.clone(),
                target: target.to_string(),
            });
        }
        for file in &request.files {
            tracing::debug!(package = %request.name, target = %file.target, bytes = file.contents.len(), "would write");
        }
        tracing::info!(
            package = %request.name,
            version = %request.version,
            files = request.files.len(),
            "dry run: package not written"
        );
        Ok(PublishLocation::Skipped)
    }
}
