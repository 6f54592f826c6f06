//! Extract command handler.

use anyhow::{Context, Result};

use crate::cli::ExtractArgs;
use crate::cli::config::Config;
use crate::cli::date_bound::{BoundRole, parse_bound};
use crate::cli::output;
use crate::domain::{FilterError, FilterSpec};
use crate::engine::FilterEngine;
use crate::export;
use crate::marker;
use crate::store::AppleScriptStore;

pub fn handle_extract(args: &ExtractArgs, verbose: bool) -> Result<()> {
    // Spec validation happens entirely before the first store access.
    let spec = build_spec(args)?;
    let config = Config::load()?;
    let mut store = AppleScriptStore::new(verbose);

    if args.stats_only {
        let total = FilterEngine::new(&store)
            .count(&spec)
            .context("failed to query the notes store")?;
        println!("Matching notes: {total}");
        return Ok(());
    }

    let engine = FilterEngine::new(&store);
    let notes = engine
        .select(&spec)
        .context("failed to query the notes store")?;
    output::print_notes(&notes);

    if args.count {
        let total = engine
            .count(&spec)
            .context("failed to count matching notes")?;
        output::print_stats(total, notes.len(), spec.limit());
    }

    let path = export::export(
        &notes,
        &spec,
        args.mark,
        args.output.as_deref(),
        config.output_dir.as_deref(),
    )
    .context("failed to write export file")?;
    println!();
    println!("Notes saved to {}", path.display());

    // Marking runs last: the export is already on disk and the cleaned
    // copies are unaffected by the store mutation.
    if args.mark {
        let summary = marker::mark_all(&mut store, &notes)
            .context("failed to mark notes in the store")?;
        output::print_mark_summary(&summary);
    }

    Ok(())
}

/// Builds the validated filter specification from CLI arguments.
///
/// `--mark` implies excluding already-marked notes, so repeated marking
/// runs never reprocess the same notes.
fn build_spec(args: &ExtractArgs) -> Result<FilterSpec> {
    let from = args
        .from_date
        .as_deref()
        .map(|s| parse_bound(s, BoundRole::From))
        .transpose()
        .map_err(FilterError::InvalidDate)?;
    let to = args
        .to_date
        .as_deref()
        .map(|s| parse_bound(s, BoundRole::To))
        .transpose()
        .map_err(FilterError::InvalidDate)?;

    let spec = FilterSpec::new(args.number, from, to, args.filter_tag.clone(), args.mark)?;
    Ok(spec)
}
