//! Second pipeline: concept extraction and link summaries over an
//! exported notes file.
//!
//! Reads a JSON export, asks the analysis service for the concepts each
//! note discusses, fetches and summarizes any linked pages, and writes
//! the input shape plus an `ai_analysis` array per note. The input file
//! is never modified. One failed link fetch never aborts sibling
//! concepts or other notes; failures become empty `explain` fields and
//! a stderr warning.

pub mod category;
mod client;
pub mod links;

pub use category::Category;
pub use client::{AnalysisClient, ConceptHit};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::export;

/// Errors from the analysis pipeline.
#[derive(Debug, Error)]
pub enum AnalyzeError {
    #[error(
        "no API key found: pass --api-key, set OPENAI_API_KEY, or add it to a .env file"
    )]
    MissingApiKey,

    #[error("analysis service rejected the credential")]
    AuthRejected,

    #[error("analysis service unreachable: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unusable analysis response: {0}")]
    BadResponse(String),

    #[error("failed to read input file {path}: {source}")]
    Input {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("input file {path} is not a JSON array of notes: {source}")]
    InputShape {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to write analysis output: {0}")]
    Output(#[from] export::ExportError),
}

/// One analysis entry appended to a note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisEntry {
    pub concept: String,
    pub link: String,
    pub explain: String,
    pub category: Category,
}

/// Totals printed after a run.
#[derive(Debug, Default, Clone, Copy)]
pub struct AnalysisSummary {
    pub notes: usize,
    pub concepts: usize,
    pub links: usize,
    pub explanations: usize,
}

/// Default output path: `{stem}_ai_analyzed.json` next to the input.
pub fn derive_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "notes".to_string());
    input.with_file_name(format!("{stem}_ai_analyzed.json"))
}

/// Analyzes every note in an exported JSON file.
///
/// Returns the output path and run totals. Credential rejection and an
/// unreadable input file are fatal; everything below the per-note level
/// is recovered locally.
pub fn analyze_file(
    client: &AnalysisClient,
    input: &Path,
    output: Option<&Path>,
    verbose: bool,
) -> Result<(PathBuf, AnalysisSummary), AnalyzeError> {
    let text = std::fs::read_to_string(input).map_err(|source| AnalyzeError::Input {
        path: input.to_path_buf(),
        source,
    })?;
    let mut notes: Vec<Value> =
        serde_json::from_str(&text).map_err(|source| AnalyzeError::InputShape {
            path: input.to_path_buf(),
            source,
        })?;

    let mut summary = AnalysisSummary {
        notes: notes.len(),
        ..AnalysisSummary::default()
    };

    let total = notes.len();
    for (i, note) in notes.iter_mut().enumerate() {
        let title = field(note, "title");
        let body = field(note, "body");
        if verbose {
            eprintln!("[{}/{total}] analyzing {:?}", i + 1, preview(&title));
        }

        let entries = analyze_note(client, &title, &body, verbose)?;
        summary.concepts += entries.len();
        summary.links += entries.iter().filter(|e| !e.link.is_empty()).count();
        summary.explanations += entries.iter().filter(|e| !e.explain.is_empty()).count();

        if let Some(obj) = note.as_object_mut() {
            obj.insert(
                "ai_analysis".to_string(),
                serde_json::to_value(&entries).map_err(|e| {
                    AnalyzeError::BadResponse(format!("failed to encode analysis: {e}"))
                })?,
            );
        }
    }

    let out_path = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| derive_output_path(input));
    export::write_json(&out_path, &notes)?;
    Ok((out_path, summary))
}

/// Analyzes one note, recovering per-link failures as empty `explain`
/// strings.
fn analyze_note(
    client: &AnalysisClient,
    title: &str,
    body: &str,
    verbose: bool,
) -> Result<Vec<AnalysisEntry>, AnalyzeError> {
    let hits = match client.extract_concepts(title, body) {
        Ok(hits) => hits,
        // A rejected credential can never succeed for later notes.
        Err(AnalyzeError::AuthRejected) => return Err(AnalyzeError::AuthRejected),
        Err(e) => {
            eprintln!("warning: concept extraction failed for {:?}: {e}", preview(title));
            return Ok(Vec::new());
        }
    };

    let mut entries = Vec::with_capacity(hits.len());
    for hit in hits {
        let explain = if links::is_fetchable(&hit.link) {
            explain_link(client, &hit, verbose)
        } else {
            String::new()
        };
        entries.push(AnalysisEntry {
            concept: hit.concept,
            link: hit.link,
            explain,
            category: hit.category,
        });
    }
    Ok(entries)
}

/// Fetch-and-summarize for one link; any failure yields an empty
/// string and a warning rather than an error.
fn explain_link(client: &AnalysisClient, hit: &ConceptHit, verbose: bool) -> String {
    if verbose {
        eprintln!("  fetching {}", hit.link);
    }
    let content = match client.fetch_page(&hit.link) {
        Ok(content) => content,
        Err(e) => {
            eprintln!("warning: failed to fetch {}: {e}", hit.link);
            return String::new();
        }
    };
    if content.is_empty() {
        return String::new();
    }
    match client.summarize(&hit.concept, &hit.link, &content) {
        Ok(summary) => summary,
        Err(e) => {
            eprintln!("warning: failed to summarize {}: {e}", hit.link);
            String::new()
        }
    }
}

fn field(note: &Value, key: &str) -> String {
    note.get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn preview(s: &str) -> String {
    s.chars().take(50).collect()
}
