//! lkml-lint CLI - static checks for LookML projects

use clap::Parser;

mod cli;
mod commands;
mod discovery;
mod output;

use cli::Cli;
use commands::common::ExitCode;
use commands::{lint, rules};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match &cli.command {
        cli::Commands::Lint(args) => lint::execute(args, &cli.global).await,
        cli::Commands::Rules(args) => rules::execute(args, &cli.global).await,
    };

    if let Err(err) = result {
        if let Some(code) = err.downcast_ref::<ExitCode>() {
            std::process::exit(code.0);
        }
        eprintln!("Error: {err:#}");
        std::process::exit(2);
    }
}
