//! CLI command definitions and handlers.

pub mod config;
pub mod date_bound;
pub mod handlers;
pub mod output;

use clap::{ArgAction, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// note-voyeur - extract, filter, and analyze notes from the macOS Notes app
#[derive(Parser, Debug)]
#[command(name = "note-voyeur", version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Extract notes matching date and text filters to a JSON file
    Extract(ExtractArgs),

    /// Run concept extraction and link summaries over an exported file
    Analyze(AnalyzeArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Arguments for the `extract` command
#[derive(Parser, Debug)]
pub struct ExtractArgs {
    /// Maximum number of notes to extract
    #[arg(short = 'n', long = "number", default_value_t = 5)]
    pub number: usize,

    /// Only notes modified on/after this date (YYYY-MM-DD, DD/MM/YYYY,
    /// or an integer meaning days ago)
    #[arg(short = 'd', long = "from-date")]
    pub from_date: Option<String>,

    /// Only notes modified on/before this date (same formats)
    #[arg(short = 't', long = "to-date")]
    pub to_date: Option<String>,

    /// Only notes containing this text in title or body (case-insensitive)
    #[arg(long = "filter-tag")]
    pub filter_tag: Option<String>,

    /// Mark extracted notes in the Notes app so they are skipped next time
    #[arg(long)]
    pub mark: bool,

    /// Print match statistics alongside the extraction
    #[arg(short = 'c', long)]
    pub count: bool,

    /// Print match statistics only; no extraction or export
    #[arg(long)]
    pub stats_only: bool,

    /// Explicit output filename (overrides the derived name)
    #[arg(short = 'o', long)]
    pub output: Option<PathBuf>,
}

/// Arguments for the `analyze` command
#[derive(Parser, Debug)]
pub struct AnalyzeArgs {
    /// Input JSON file produced by `extract`
    pub input: PathBuf,

    /// Output JSON file (default: {input}_ai_analyzed.json)
    #[arg(short = 'o', long)]
    pub output: Option<PathBuf>,

    /// API key (overrides OPENAI_API_KEY and .env)
    #[arg(long)]
    pub api_key: Option<String>,
}

/// Arguments for the `completions` command
#[derive(Parser, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: Shell,
}
