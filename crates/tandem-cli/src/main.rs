use clap::Parser;
use tandem_cli::cli::{Cli, Command};
use tandem_cli::{commands, error, logger, ui};

#[tokio::main]
async fn main() -> miette::Result<()> {
    let cli = Cli::parse();

    logger::init_logger(cli.verbose, cli.quiet, cli.no_color);
    ui::init_colors(cli.no_color);

    let result = match cli.command {
        Command::Build(args) => commands::build::execute(args, cli.quiet).await,
        Command::Graph(args) => commands::graph::execute(args),
        Command::Check(args) => commands::check::execute(args),
    };

    result.map_err(error::cli_error_to_miette)
}
