//! Configuration model.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tandem_analysis::{EntryPoint, ModuleResolution, ScanOptions};

pub const DEFAULT_OUT_DIR: &str = "dist/packages";
pub const DEFAULT_LOCK_FILE: &str = "tandem.lock.json";
pub const DEFAULT_MANIFEST: &str = "package.json";

fn default_out_dir() -> PathBuf {
    PathBuf::from(DEFAULT_OUT_DIR)
}

fn default_lock_file() -> PathBuf {
    PathBuf::from(DEFAULT_LOCK_FILE)
}

fn default_manifest() -> PathBuf {
    PathBuf::from(DEFAULT_MANIFEST)
}

/// Top-level configuration: where output goes and which packages to build.
///
/// Relative paths are resolved against [`TandemConfig::base_dir`], the
/// directory of the file the configuration was loaded from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TandemConfig {
    /// Directory the directory publisher writes packages into.
    #[serde(default = "default_out_dir")]
    pub out_dir: PathBuf,

    #[serde(default = "default_lock_file")]
    pub lock_file: PathBuf,

    /// Scan options applied to every package unless overridden.
    #[serde(default)]
    pub defaults: ScanOptions,

    #[serde(default)]
    pub packages: Vec<PackageConfig>,

    #[serde(skip)]
    pub base_dir: PathBuf,
}

impl Default for TandemConfig {
    fn default() -> Self {
        Self {
            out_dir: default_out_dir(),
            lock_file: default_lock_file(),
            defaults: ScanOptions::default(),
            packages: Vec::new(),
            base_dir: PathBuf::new(),
        }
    }
}

impl TandemConfig {
    /// Resolve a configured path against the configuration directory.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }

    pub fn package(&self, name: &str) -> Option<&PackageConfig> {
        self.packages.iter().find(|package| package.name == name)
    }

    pub fn out_dir(&self) -> PathBuf {
        self.resolve(&self.out_dir)
    }

    pub fn lock_file(&self) -> PathBuf {
        self.resolve(&self.lock_file)
    }
}

/// One package to build.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackageConfig {
    pub name: String,
    pub version: String,

    /// Package root folder; target paths are relative to it.
    pub root: PathBuf,

    /// Project manifest supplying third-party version pins.
    #[serde(default = "default_manifest")]
    pub manifest: PathBuf,

    #[serde(default)]
    pub entries: Vec<EntryPoint>,

    /// Files shipped whether or not anything imports them.
    #[serde(default)]
    pub include: Vec<PathBuf>,

    /// Sibling packages embedded as direct dependencies.
    #[serde(default)]
    pub dependencies: Vec<String>,

    /// Sibling packages embedded as peer dependencies.
    #[serde(default)]
    pub peer_dependencies: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module_resolution: Option<ModuleResolution>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_source_map_files: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolve_declaration_files: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_dev_dependencies: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fail_on_compile_errors: Option<bool>,
}

impl PackageConfig {
    pub fn new(name: impl Into<String>, version: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            root: root.into(),
            manifest: default_manifest(),
            entries: Vec::new(),
            include: Vec::new(),
            dependencies: Vec::new(),
            peer_dependencies: Vec::new(),
            module_resolution: None,
            include_source_map_files: None,
            resolve_declaration_files: None,
            include_dev_dependencies: None,
            fail_on_compile_errors: None,
        }
    }

    pub fn with_entry(mut self, entry: EntryPoint) -> Self {
        self.entries.push(entry);
        self
    }

    pub fn with_dependency(mut self, name: impl Into<String>) -> Self {
        self.dependencies.push(name.into());
        self
    }

    pub fn with_peer_dependency(mut self, name: impl Into<String>) -> Self {
        self.peer_dependencies.push(name.into());
        self
    }

    /// Scan options for this package: `defaults` with package overrides.
    pub fn options(&self, defaults: &ScanOptions) -> ScanOptions {
        ScanOptions {
            module_resolution: self.module_resolution.unwrap_or(defaults.module_resolution),
            include_source_map_files: self
                .include_source_map_files
                .unwrap_or(defaults.include_source_map_files),
            resolve_declaration_files: self
                .resolve_declaration_files
                .unwrap_or(defaults.resolve_declaration_files),
            include_dev_dependencies: self
                .include_dev_dependencies
                .unwrap_or(defaults.include_dev_dependencies),
            fail_on_compile_errors: self
                .fail_on_compile_errors
                .unwrap_or(defaults.fail_on_compile_errors),
        }
    }

    /// Sibling packages this package embeds, direct first, then peers.
    pub fn embedded(&self) -> impl Iterator<Item = &str> {
        self.dependencies
            .iter()
            .chain(&self.peer_dependencies)
            .map(String::as_str)
    }

    pub fn is_peer(&self, name: &str) -> bool {
        self.peer_dependencies.iter().any(|peer| peer == name)
    }
}
