//! Command-line interface definition.
//!
//! - `tandem build` - build and publish every configured package
//! - `tandem graph` - print the build generations
//! - `tandem check` - validate the configuration without building

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// tandem - build and publish interdependent packages from one source tree
#[derive(Parser, Debug)]
#[command(
    name = "tandem",
    version,
    about = "Build and publish interdependent packages from one source tree",
    long_about = "tandem builds every configured package in dependency order.\n\
                  Files a package shares with a package it depends on are not copied:\n\
                  imports of them are rewritten to import the sibling package instead."
)]
pub struct Cli {
    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build and publish every configured package
    ///
    /// Packages build in generations: a package starts once every package
    /// it embeds has been built. Packages whose content matches the lock
    /// file are skipped.
    Build(BuildArgs),

    /// Print the order packages build in
    Graph(ConfigArgs),

    /// Validate the configuration and report every issue
    Check(ConfigArgs),
}

/// Where to find the configuration.
#[derive(Args, Debug, Clone, Default)]
pub struct ConfigArgs {
    /// Configuration file (tandem.toml or a package.json with a "tandem" field)
    ///
    /// Searched for in the current directory when omitted.
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct BuildArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Directory packages are written to, overriding `out_dir`
    #[arg(short = 'd', long, value_name = "DIR")]
    pub out_dir: Option<PathBuf>,

    /// Build everything but write neither packages nor the lock file
    #[arg(long)]
    pub dry_run: bool,

    /// Publish packages even when their content is unchanged
    #[arg(long)]
    pub force: bool,
}
