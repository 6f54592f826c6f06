//! note-voyeur - extract, filter, mark, and analyze notes from the
//! macOS Notes app.

pub mod analyze;
pub mod cli;
pub mod domain;
pub mod engine;
pub mod export;
pub mod marker;
pub mod store;

use anyhow::Result;
use clap::Parser;

use cli::{
    Cli, Command,
    handlers::{handle_analyze, handle_completions, handle_extract},
};

/// Main entry point for the CLI application.
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let verbose = cli.verbose > 0;

    match &cli.command {
        Command::Extract(args) => handle_extract(args, verbose),
        Command::Analyze(args) => handle_analyze(args, verbose),
        Command::Completions(args) => handle_completions(args),
    }
}
