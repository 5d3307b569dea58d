use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Command};

fn main() -> Result<()> {
    // stdout carries command output; logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("bplib=info".parse()?)
                .add_directive("bplib_cli=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Inspect {
            pack,
            limit,
            decode,
        } => commands::inspect::run(&pack, limit, decode),
        Command::Search {
            pack,
            name,
            id,
            description,
            kinds,
            limit,
            json,
            loader,
        } => {
            let queries = commands::search::Queries {
                name,
                id,
                description,
            };
            commands::search::run(&pack, &queries, &kinds, limit, json, &loader)
        }
        Command::Build { input, output } => commands::build::run(&input, &output),
    }
}
