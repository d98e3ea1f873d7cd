//! `tandem graph`: print the generations packages build in.

use tandem_build::{BuildError, PackageGraph};

use crate::cli::ConfigArgs;
use crate::commands::load_config;
use crate::error::Result;
use crate::ui;

/// Print one line per generation to stdout, leaves first. Packages on the
/// same line build concurrently.
pub fn execute(args: ConfigArgs) -> Result<()> {
    let config = load_config(&args)?;
    config.validate()?;

    let graph = PackageGraph::from_packages(&config.packages)
        .map_err(|issues| BuildError::Schedule { issues })?;
    let generations = graph.generations().map_err(BuildError::from)?;

    print!("{}", ui::format_generations(&generations));
    Ok(())
}
