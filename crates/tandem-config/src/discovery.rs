//! File-based config discovery.
//!
//! Finds and loads a tandem configuration, layering built-in defaults, the
//! configuration file and `TANDEM_*` environment variables.

use std::fs;
use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde_json::Value;

use crate::config::TandemConfig;
use crate::error::{ConfigError, Result};

pub const CONFIG_FILE: &str = "tandem.toml";
pub const PACKAGE_JSON_FIELD: &str = "tandem";

/// Environment variable prefix; nested keys are separated by `__`,
/// e.g. `TANDEM_DEFAULTS__MODULE_RESOLUTION=dynamic`.
pub const ENV_PREFIX: &str = "TANDEM_";

/// Searches a directory for a tandem configuration and loads it.
///
/// # Example
///
/// ```no_run
/// use tandem_config::ConfigDiscovery;
///
/// let config = ConfigDiscovery::new(".").load().unwrap();
/// config.validate().unwrap();
/// ```
pub struct ConfigDiscovery {
    root: PathBuf,
}

impl ConfigDiscovery {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Find a config file in the root directory.
    ///
    /// Searches in this order:
    /// 1. `tandem.toml`
    /// 2. `package.json` with a non-null `tandem` field
    pub fn find(&self) -> Option<PathBuf> {
        let toml_path = self.root.join(CONFIG_FILE);
        if toml_path.is_file() {
            return Some(toml_path);
        }

        let pkg_path = self.root.join("package.json");
        let content = fs::read_to_string(&pkg_path).ok()?;
        let parsed: Value = serde_json::from_str(&content).ok()?;
        match parsed.get(PACKAGE_JSON_FIELD) {
            Some(field) if !field.is_null() => Some(pkg_path),
            _ => None,
        }
    }

    /// Load the discovered configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NotFound` if no config file is found.
    pub fn load(&self) -> Result<TandemConfig> {
        let path = self.find().ok_or_else(|| ConfigError::NotFound {
            dir: self.root.clone(),
        })?;
        load_from(&path)
    }
}

/// Load configuration from a specific file.
///
/// `package.json` files contribute their `tandem` field; anything else is
/// read as TOML. Relative paths in the result resolve against the file's
/// directory. The result is not validated.
pub fn load_from(path: &Path) -> Result<TandemConfig> {
    let path = &std::path::absolute(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let mut figment = Figment::from(Serialized::defaults(TandemConfig::default()));

    if path.file_name() == Some(std::ffi::OsStr::new("package.json")) {
        figment = figment.merge(Serialized::defaults(package_json_field(path)?));
    } else {
        if !path.is_file() {
            return Err(ConfigError::Read {
                path: path.to_path_buf(),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            });
        }
        figment = figment.merge(Toml::file(path));
    }

    figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));

    let mut config: TandemConfig = figment.extract()?;
    config.base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();

    tracing::debug!(
        path = %path.display(),
        packages = config.packages.len(),
        "configuration loaded"
    );
    Ok(config)
}

fn package_json_field(path: &Path) -> Result<Value> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let mut parsed: Value = serde_json::from_str(&content).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    match parsed.get_mut(PACKAGE_JSON_FIELD).map(Value::take) {
        Some(field) if field.is_object() => Ok(field),
        Some(Value::Null) | None => Err(ConfigError::Parse {
            path: path.to_path_buf(),
            message: format!("add a \"{PACKAGE_JSON_FIELD}\" object to package.json"),
        }),
        Some(_) => Err(ConfigError::Parse {
            path: path.to_path_buf(),
            message: format!("the \"{PACKAGE_JSON_FIELD}\" field must be an object"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn find_returns_none_when_no_config() {
        let dir = TempDir::new().unwrap();
        assert!(ConfigDiscovery::new(dir.path()).find().is_none());
    }

    #[test]
    fn find_prefers_toml_over_package_json() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("package.json"), r#"{"tandem": {}}"#).unwrap();
        fs::write(dir.path().join(CONFIG_FILE), "").unwrap();

        assert_eq!(
            ConfigDiscovery::new(dir.path()).find().unwrap(),
            dir.path().join(CONFIG_FILE)
        );
    }

    #[test]
    fn find_ignores_package_json_without_field() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("package.json"), r#"{"name": "x", "tandem": null}"#).unwrap();
        assert!(ConfigDiscovery::new(dir.path()).find().is_none());
    }

    #[test]
    fn load_reports_not_found() {
        let dir = TempDir::new().unwrap();
        let err = ConfigDiscovery::new(dir.path()).load().unwrap_err();
        assert!(matches!(err, ConfigError::NotFound { .. }));
    }

    #[test]
    fn non_object_field_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("package.json");
        fs::write(&path, r#"{"tandem": []}"#).unwrap();
        assert!(matches!(load_from(&path), Err(ConfigError::Parse { .. })));
    }
}
