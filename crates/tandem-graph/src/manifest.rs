//! Project manifest (`package.json`) parsing.
//!
//! Only the dependency sections are modelled; scripts, engines and the rest
//! of the manifest are ignored.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};

use crate::runtime::Runtime;

/// Maximum allowed size for package.json files (10MB)
const MAX_MANIFEST_SIZE: u64 = 10 * 1024 * 1024;

/// Errors produced while loading a project manifest.
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("Cannot read manifest {path}: {message}")]
    Read { path: PathBuf, message: String },

    #[error("Manifest {path} exceeds maximum size of {}MB", MAX_MANIFEST_SIZE / 1024 / 1024)]
    TooLarge { path: PathBuf },

    #[error("Invalid manifest format in {path}: {message}")]
    Parse { path: PathBuf, message: String },
}

/// Parsed package.json structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PackageManifest {
    pub name: Option<String>,
    pub version: Option<String>,
    #[serde(default)]
    pub dependencies: IndexMap<String, String>,
    #[serde(default, rename = "devDependencies")]
    pub dev_dependencies: IndexMap<String, String>,
    #[serde(default, rename = "peerDependencies")]
    pub peer_dependencies: IndexMap<String, String>,
    #[serde(default, rename = "optionalDependencies")]
    pub optional_dependencies: IndexMap<String, String>,
    /// File path this was loaded from
    #[serde(skip)]
    pub path: PathBuf,
}

impl PackageManifest {
    /// Load a manifest from `path` using the provided runtime.
    pub async fn from_path<R: Runtime + ?Sized>(
        runtime: &R,
        path: &Path,
    ) -> Result<Self, ManifestError> {
        let metadata = runtime
            .metadata(path)
            .await
            .map_err(|e| ManifestError::Read {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;

        if metadata.size > MAX_MANIFEST_SIZE {
            return Err(ManifestError::TooLarge {
                path: path.to_path_buf(),
            });
        }

        let content = runtime
            .read_to_string(path)
            .await
            .map_err(|e| ManifestError::Read {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;

        let mut manifest = Self::from_json(&content).map_err(|e| ManifestError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        manifest.path = path.to_path_buf();
        Ok(manifest)
    }

    pub fn from_json(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }

    /// Get all dependencies of a specific type.
    pub fn get_dependencies(&self, dep_type: DependencyType) -> &IndexMap<String, String> {
        match dep_type {
            DependencyType::Production => &self.dependencies,
            DependencyType::Development => &self.dev_dependencies,
            DependencyType::Peer => &self.peer_dependencies,
            DependencyType::Optional => &self.optional_dependencies,
        }
    }

    /// Version pin for `name`.
    ///
    /// Lookup order is `dependencies`, then `devDependencies` when
    /// `include_dev` is set. Peer and optional sections are never consulted.
    pub fn pinned_version(&self, name: &str, include_dev: bool) -> Option<&str> {
        let mut sections = vec![DependencyType::Production];
        if include_dev {
            sections.push(DependencyType::Development);
        }

        sections
            .into_iter()
            .find_map(|section| self.get_dependencies(section).get(name))
            .map(String::as_str)
    }
}

/// Type of dependency in package.json.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DependencyType {
    Production,
    Development,
    Peer,
    Optional,
}

/// Extract the top-level package name from a path inside a `node_modules`
/// tree.
///
/// The innermost `node_modules` segment wins, so nested installs resolve to
/// the package that actually owns the file. Scoped packages yield
/// `@scope/name`. Returns `None` when the path does not contain a package
/// segment after `node_modules`.
pub fn package_name_from_vendored_path(path: &Path) -> Option<String> {
    let segments: Vec<&str> = path
        .components()
        .filter_map(|component| match component {
            Component::Normal(segment) => segment.to_str(),
            _ => None,
        })
        .collect();

    let position = segments.iter().rposition(|segment| *segment == "node_modules")?;
    let rest = &segments[position + 1..];

    let first = rest.first()?;
    if first.starts_with('@') {
        let name = rest.get(1)?;
        if first.len() == 1 || name.is_empty() {
            return None;
        }
        return Some(format!("{}/{}", first, name));
    }

    if first.is_empty() || first.starts_with('.') {
        return None;
    }
    Some((*first).to_string())
}

/// Whether `path` lies inside a `node_modules` tree.
pub fn is_vendored_path(path: &Path) -> bool {
    path.components()
        .any(|component| component.as_os_str() == "node_modules")
}
