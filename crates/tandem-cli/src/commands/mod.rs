//! Command implementations.

pub mod build;
pub mod check;
pub mod graph;

use std::path::Path;

use tandem_config::{ConfigDiscovery, TandemConfig, load_from};

use crate::cli::ConfigArgs;
use crate::error::{CliError, Result};

/// Load the configuration named by `--config`, or discover one in the
/// current directory.
pub fn load_config(args: &ConfigArgs) -> Result<TandemConfig> {
    let config = match &args.config {
        Some(path) => load_from(path)?,
        None => ConfigDiscovery::new(current_dir()?).load()?,
    };
    tracing::debug!(
        base_dir = %config.base_dir.display(),
        packages = config.packages.len(),
        "configuration loaded"
    );
    Ok(config)
}

fn current_dir() -> Result<std::path::PathBuf> {
    std::env::current_dir().map_err(|source| CliError::Io {
        path: Path::new(".").to_path_buf(),
        source,
    })
}

/// Make a path given on the command line absolute against the current
/// directory.
pub(crate) fn absolute(path: &Path) -> Result<std::path::PathBuf> {
    std::path::absolute(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })
}
