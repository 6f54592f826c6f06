//! Export writer: deterministic filenames, record cleaning, and atomic
//! JSON serialization.

use chrono::{DateTime, Local, Utc};
use regex::Regex;
use std::io::{self, Write as IoWrite};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;

use crate::domain::{FilterSpec, Note, QueryMode};
use crate::marker::MARKER;

/// Errors during export serialization.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to serialize notes: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("atomic write failed for {path}: {source}")]
    AtomicWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Derives the output filename from the active filter specification.
///
/// Pure and deterministic: the same spec always yields the same name.
/// Encodes the query mode, compact date tokens for the bounds, the
/// sanitized text-filter token, and a `_marked` suffix when marking was
/// requested for the run.
pub fn derive_filename(spec: &FilterSpec, marked: bool) -> String {
    let mut name = match spec.mode() {
        QueryMode::Latest => format!("notes_export_last_{}", spec.limit()),
        QueryMode::Forward(from) => format!("notes_export_from_{}", date_token(from)),
        QueryMode::Backward(to) => format!("notes_export_before_{}", date_token(to)),
        QueryMode::Range(from, to) => {
            format!("notes_export_{}_to_{}", date_token(from), date_token(to))
        }
    };
    if let Some(token) = spec.text_filter() {
        name.push_str("_tag_");
        name.push_str(&sanitize_token(token));
    }
    if marked {
        name.push_str("_marked");
    }
    name.push_str(".json");
    name
}

/// Compact date token in the store's local calendar, so a bound entered
/// as 2025-04-01 renders as 20250401 regardless of UTC offset.
fn date_token(bound: DateTime<Utc>) -> String {
    bound.with_timezone(&Local).format("%Y%m%d").to_string()
}

/// Lowercases a filter token and folds anything outside `[a-z0-9]` to
/// underscores for filename use.
fn sanitize_token(token: &str) -> String {
    token
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

/// Produces the cleaned copy of a note for serialization.
///
/// Strips the marker prefix from the title and from the body's first
/// line when present, and removes occurrences of the active text-filter
/// token (case-insensitively) from the copy. The underlying store
/// record is never touched.
pub fn clean_note(note: &Note, text_filter: Option<&str>) -> Note {
    let mut title = note.title().to_string();
    let mut body = note.body().to_string();

    if let Some(stripped) = title.strip_prefix(MARKER) {
        // The marked body carries the full marked title as its first
        // line; drop that line along with the title prefix.
        if let Some(rest) = body.strip_prefix(note.title()) {
            body = rest.strip_prefix('\n').unwrap_or(rest).to_string();
        }
        title = stripped.trim_start().to_string();
    }

    if let Some(token) = text_filter {
        title = remove_ignore_case(&title, token);
        body = remove_ignore_case(&body, token);
    }

    note.with_content(title, body)
}

/// Removes every case-insensitive occurrence of `token` from `s`.
fn remove_ignore_case(s: &str, token: &str) -> String {
    match Regex::new(&format!("(?i){}", regex::escape(token))) {
        Ok(re) => re.replace_all(s, "").into_owned(),
        // Unreachable with an escaped literal pattern.
        Err(_) => s.to_string(),
    }
}

/// Writes cleaned notes to `path` as a pretty-printed JSON array.
///
/// An empty result set still produces a valid `[]` file.
pub fn write_notes(path: &Path, notes: &[Note], text_filter: Option<&str>) -> Result<(), ExportError> {
    let cleaned: Vec<Note> = notes.iter().map(|n| clean_note(n, text_filter)).collect();
    write_json(path, &cleaned)
}

/// Serializes a value as pretty JSON through a temp file and an atomic
/// rename, so a fatal condition never leaves a partial file behind.
pub fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<(), ExportError> {
    let json = serde_json::to_string_pretty(value)?;

    let dir = path.parent().filter(|p| !p.as_os_str().is_empty());
    let mut tmp = match dir {
        Some(dir) => NamedTempFile::new_in(dir),
        None => NamedTempFile::new_in("."),
    }
    .map_err(|source| ExportError::AtomicWrite {
        path: path.to_path_buf(),
        source,
    })?;

    tmp.write_all(json.as_bytes())
        .and_then(|_| tmp.write_all(b"\n"))
        .map_err(|source| ExportError::AtomicWrite {
            path: path.to_path_buf(),
            source,
        })?;

    tmp.persist(path)
        .map_err(|e| ExportError::AtomicWrite {
            path: path.to_path_buf(),
            source: e.error,
        })?;
    Ok(())
}

/// Writes the export, resolving the filename from the spec unless an
/// explicit override is supplied. Returns the path written.
///
/// Derived filenames land in `out_dir` when one is configured; an
/// explicit override is used verbatim and ignores `out_dir`.
pub fn export(
    notes: &[Note],
    spec: &FilterSpec,
    marked: bool,
    override_path: Option<&Path>,
    out_dir: Option<&Path>,
) -> Result<PathBuf, ExportError> {
    let path = match override_path {
        Some(p) => p.to_path_buf(),
        None => {
            let name = derive_filename(spec, marked);
            match out_dir {
                Some(dir) => dir.join(name),
                None => PathBuf::from(name),
            }
        }
    };
    write_notes(&path, notes, spec.text_filter())?;
    Ok(path)
}
