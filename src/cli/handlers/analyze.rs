//! Analyze command handler.

use anyhow::{Result, bail};

use crate::analyze::{AnalysisClient, AnalyzeError, analyze_file};
use crate::cli::AnalyzeArgs;
use crate::cli::config::{Config, resolve_api_key};

pub fn handle_analyze(args: &AnalyzeArgs, verbose: bool) -> Result<()> {
    if !args.input.exists() {
        bail!("input file not found: {}", args.input.display());
    }

    let config = Config::load()?;
    let api_key = resolve_api_key(args.api_key.as_deref()).ok_or(AnalyzeError::MissingApiKey)?;
    let client = AnalysisClient::new(api_key, config.model, config.api_base)?;

    let (path, summary) = analyze_file(&client, &args.input, args.output.as_deref(), verbose)?;

    println!("Analysis complete.");
    println!("  Notes processed: {}", summary.notes);
    println!("  Concepts extracted: {}", summary.concepts);
    println!("  Links found: {}", summary.links);
    println!("  Content explanations: {}", summary.explanations);
    println!("Results saved to {}", path.display());
    Ok(())
}
