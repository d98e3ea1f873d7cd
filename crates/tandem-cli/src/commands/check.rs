//! `tandem check`: validate the configuration without building.

use tandem_build::PackageGraph;

use crate::cli::ConfigArgs;
use crate::commands::load_config;
use crate::error::{CliError, Result};
use crate::ui;

/// Print every configuration and package graph issue.
///
/// Graph issues are only looked for once the configuration itself is valid.
pub fn execute(args: ConfigArgs) -> Result<()> {
    let config = load_config(&args)?;

    let mut issues: Vec<String> = config.issues().iter().map(ToString::to_string).collect();
    if issues.is_empty() {
        if let Err(graph_issues) = PackageGraph::from_packages(&config.packages) {
            issues.extend(graph_issues.iter().map(ToString::to_string));
        }
    }

    if issues.is_empty() {
        ui::success(&format!(
            "configuration is valid: {} package(s)",
            config.packages.len()
        ));
        return Ok(());
    }

    for issue in &issues {
        ui::error(issue);
    }
    Err(CliError::CheckFailed {
        issues: issues.len(),
    })
}
