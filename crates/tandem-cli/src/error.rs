//! CLI errors and their conversion to `miette` reports.

use std::path::PathBuf;

use miette::Report;
use tandem_build::BuildError;
use tandem_config::ConfigError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Build(#[from] BuildError),

    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Some packages failed; the rest were built.
    #[error("{failed} package(s) failed, {succeeded} succeeded")]
    PartialFailure { succeeded: usize, failed: usize },

    /// `check` found problems; they have already been printed.
    #[error("configuration has {issues} issue(s)")]
    CheckFailed { issues: usize },
}

/// Convert a CLI error into a report, adding a hint where one helps.
pub fn cli_error_to_miette(err: CliError) -> Report {
    match err {
        CliError::Config(ConfigError::NotFound { dir }) => miette::miette!(
            help = "create a tandem.toml there or pass --config <FILE>",
            "no tandem configuration found in {}",
            dir.display()
        ),
        CliError::Config(e @ ConfigError::Invalid { .. })
        | CliError::Build(BuildError::Config(e @ ConfigError::Invalid { .. })) => {
            miette::miette!(help = "run `tandem check` to list the issues again", "{e}")
        }
        CliError::Build(e @ BuildError::Schedule { .. }) => miette::miette!(
            help = "a package cannot embed itself or a package that embeds it",
            "{e}"
        ),
        CliError::Build(e @ BuildError::Lock { .. }) => miette::miette!(
            help = "delete the lock file to publish every package at its configured version",
            "{e}"
        ),
        err => miette::miette!("{err}"),
    }
}
