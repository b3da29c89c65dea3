//! goingenv - pack environment files into encrypted, committable archives.

mod cli;
mod commands;
mod error;
mod output;
mod password;
mod project;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    let formatter = output::create_formatter(cli.json, cli.verbose, cli.quiet);

    match &cli.command {
        cli::Commands::Init(args) => commands::init::execute(args, &*formatter),
        cli::Commands::Pack(args) => commands::pack::execute(args, &*formatter),
        cli::Commands::Unpack(args) => commands::unpack::execute(args, &*formatter),
        cli::Commands::List(args) => commands::list::execute(args, &*formatter),
        cli::Commands::Status(args) => commands::status::execute(args, &*formatter),
    }
}
