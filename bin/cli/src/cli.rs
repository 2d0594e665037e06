//! Contains the chainpack CLI.

use crate::commands;
use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// Subcommands for the CLI.
#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Print the header and a structural summary of an archive file.
    Inspect(commands::InspectCommand),
    /// Fully decode an archive file and re-check its invariants.
    Verify(commands::VerifyCommand),
}

/// The chainpack CLI.
#[derive(Parser, Clone, Debug)]
#[command(author, version, about = "Block-archive container tooling", long_about = None)]
pub struct Cli {
    /// Verbosity level (0-2)
    #[arg(long, short, action = ArgAction::Count)]
    pub v: u8,
    /// The subcommand to run.
    #[clap(subcommand)]
    pub subcommand: Commands,
}

impl Cli {
    /// Runs the CLI.
    pub fn run(self) -> Result<()> {
        init_tracing(self.v)?;
        match self.subcommand {
            Commands::Inspect(cmd) => cmd.run(),
            Commands::Verify(cmd) => cmd.run(),
        }
    }
}

/// Initializes the fmt subscriber; `-v` counts raise the default filter,
/// `RUST_LOG` overrides it entirely.
fn init_tracing(verbosity: u8) -> Result<()> {
    let default = match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|err| anyhow::anyhow!(err))?;
    Ok(())
}
