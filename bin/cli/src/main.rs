//! Entrypoint for the `chainpack` binary.

pub mod cli;
pub mod commands;

use clap::Parser;

fn main() -> anyhow::Result<()> {
    cli::Cli::parse().run()
}
