//! `tandem build`: build and publish every configured package.

use std::sync::Arc;
use std::time::Instant;

use tandem_build::{BuildOptions, DirectoryPublisher, DryRunPublisher, Publisher, build_all};
use tandem_graph::{NativeRuntime, Runtime};

use crate::cli::BuildArgs;
use crate::commands::{absolute, load_config};
use crate::error::{CliError, Result};
use crate::ui;

/// Execute the build command.
///
/// # Errors
///
/// Configuration and package graph problems fail before anything is built.
/// When some packages fail, the others are still built and published, the
/// summary lists both, and `CliError::PartialFailure` is returned.
pub async fn execute(args: BuildArgs, quiet: bool) -> Result<()> {
    let start = Instant::now();
    let mut config = load_config(&args.config)?;
    if let Some(out_dir) = &args.out_dir {
        config.out_dir = absolute(out_dir)?;
    }

    let runtime: Arc<dyn Runtime> = Arc::new(NativeRuntime::new());
    let publisher: Arc<dyn Publisher> = if args.dry_run {
        Arc::new(DryRunPublisher)
    } else {
        Arc::new(DirectoryPublisher::new(config.out_dir(), Arc::clone(&runtime)))
    };
    let sink = Arc::new(ui::TerminalSink::new(ui::show_progress(quiet)));
    let options = BuildOptions {
        force: args.force,
        write_lock: !args.dry_run,
    };

    let result = build_all(config, runtime, publisher, sink.clone(), options).await;
    sink.clear();
    let summary = result?;

    if !quiet || !summary.is_success() {
        ui::print_build_summary(&summary, start.elapsed());
    }
    if args.dry_run && !quiet {
        ui::info("dry run: no packages or lock file were written");
    }

    if summary.is_success() {
        Ok(())
    } else {
        Err(CliError::PartialFailure {
            succeeded: summary.succeeded.len(),
            failed: summary.failures.len(),
        })
    }
}
