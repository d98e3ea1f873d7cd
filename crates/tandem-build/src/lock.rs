//! Publish lock file (`tandem.lock.json`).
//!
//! Records the version and content digest of every package last published,
//! so unchanged packages are skipped and changed ones get a fresh version.

use std::path::Path;

use indexmap::IndexMap;
use semver::Version;
use serde::{Deserialize, Serialize};
use tandem_graph::Runtime;

use crate::digest::ContentDigest;
use crate::error::{BuildError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockedPackage {
    pub version: String,
    pub digest: ContentDigest,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishLock {
    /// Lock file format version.
    pub format: u32,
    #[serde(default)]
    pub packages: IndexMap<String, LockedPackage>,
}

impl Default for PublishLock {
    fn default() -> Self {
        Self {
            format: Self::FORMAT,
            packages: IndexMap::new(),
        }
    }
}

/// What to do with a package given its digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionDecision {
    /// Content matches the lock; keep the locked version.
    Unchanged { version: String },
    Publish { version: String },
}

impl VersionDecision {
    pub fn version(&self) -> &str {
        match self {
            VersionDecision::Unchanged { version } | VersionDecision::Publish { version } => version,
        }
    }
}

impl PublishLock {
    pub const FORMAT: u32 = 1;

    /// Read the lock at `path`; a missing file is an empty lock.
    pub async fn load(path: &Path, runtime: &dyn Runtime) -> Result<Self> {
        if !runtime.exists(path) {
            tracing::debug!(path = %path.display(), "no lock file, starting empty");
            return Ok(Self::default());
        }
        let content = runtime
            .read_to_string(path)
            .await
            .map_err(|source| BuildError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        let lock: Self = serde_json::from_str(&content).map_err(|e| BuildError::Lock {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        if lock.format > Self::FORMAT {
            return Err(BuildError::Lock {
                path: path.to_path_buf(),
                message: format!(
                    "format {} is newer than supported format {}",
                    lock.format,
                    Self::FORMAT
                ),
            });
        }
        Ok(lock)
    }

    pub async fn save(&self, path: &Path, runtime: &dyn Runtime) -> Result<()> {
        let mut content = serde_json::to_string_pretty(self).map_err(|e| BuildError::Lock {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        content.push('\n');

        let io = |source| BuildError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                runtime.create_dir(parent, true).await.map_err(io)?;
            }
        }
        runtime.write_file(path, content.as_bytes()).await.map_err(io)?;
        tracing::debug!(path = %path.display(), packages = self.packages.len(), "lock file written");
        Ok(())
    }

    pub fn get(&self, package: &str) -> Option<&LockedPackage> {
        self.packages.get(package)
    }

    /// Record a package, keeping the lock sorted by name.
    pub fn set(&mut self, package: impl Into<String>, version: impl Into<String>, digest: ContentDigest) {
        self.packages.insert(
            package.into(),
            LockedPackage {
                version: version.into(),
                digest,
            },
        );
        self.packages.sort_keys();
    }

    /// Decide the version of `package`.
    ///
    /// A digest equal to the locked one means `Unchanged` at the locked
    /// version. Otherwise the configured version is used when it is greater
    /// than the locked one, and the locked version with its patch bumped
    /// when it is not.
    pub fn decide(&self, package: &str, configured: &str, digest: &ContentDigest) -> Result<VersionDecision> {
        let Some(locked) = self.get(package) else {
            return Ok(VersionDecision::Publish {
                version: configured.to_string(),
            });
        };

        if &locked.digest == digest {
            return Ok(VersionDecision::Unchanged {
                version: locked.version.clone(),
            });
        }

        let parse = |version: &str| {
            Version::parse(version).map_err(|e| BuildError::Version {
                package: package.to_string(),
                version: version.to_string(),
                message: e.to_string(),
            })
        };
        let configured_version = parse(configured)?;
        let locked_version = parse(&locked.version)?;

        let version = if configured_version > locked_version {
            configured_version
        } else {
            Version::new(
                locked_version.major,
                locked_version.minor,
                locked_version.patch + 1,
            )
        };
        Ok(VersionDecision::Publish {
            version: version.to_string(),
        })
    }
}
